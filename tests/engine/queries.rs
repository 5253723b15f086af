//! Integration tests for named queries.

use std::sync::Arc;

use tinderbox_engine::{
    Condition, FieldConstraint, Pattern, Query, Rule, RuleBase, RuleBaseBuilder, Session,
};
use tinderbox_foundation::{ErrorKind, FieldId, TypeId, Value};
use tinderbox_storage::Fact;

fn query_base() -> (Arc<RuleBase>, TypeId, FieldId, FieldId) {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");
    let amount = builder.interner_mut().intern_field("amount");
    let member_id = builder.interner_mut().intern_field("member_id");

    builder.add_query(Query::new(
        "large-orders",
        &[],
        Condition::new().pattern(
            Pattern::new(order)
                .with_handle_var("$o")
                .bind("$amount", amount)
                .with_constraint(FieldConstraint::gt(amount, 50i64)),
        ),
    ));
    builder.add_query(Query::new(
        "orders-for-member",
        &["$who"],
        Condition::new().pattern(
            Pattern::new(order).with_constraint(FieldConstraint::join(member_id, "$who")),
        ),
    ));

    (Arc::new(builder.build().unwrap()), order, amount, member_id)
}

#[test]
fn query_rows_expose_handles_and_bindings() {
    let (base, order, amount, _) = query_base();
    let mut session = Session::new(base);
    let big = session.insert(Fact::new(order).with(amount, 90i64)).unwrap();
    session.insert(Fact::new(order).with(amount, 10i64)).unwrap();

    let results = session.query("large-orders", &[]).unwrap();
    assert_eq!(results.len(), 1);

    let row = &results.rows()[0];
    assert_eq!(row.handle(0), Some(big));
    assert_eq!(row.get("$amount"), Some(&Value::Int(90)));
    assert_eq!(row.get("$o"), Some(&Value::from(big)));
}

#[test]
fn parameterized_query_filters_by_argument() {
    let (base, order, _, member_id) = query_base();
    let mut session = Session::new(base);
    session
        .insert(Fact::new(order).with(member_id, "m-1"))
        .unwrap();
    session
        .insert(Fact::new(order).with(member_id, "m-2"))
        .unwrap();
    session
        .insert(Fact::new(order).with(member_id, "m-2"))
        .unwrap();

    let one = session
        .query("orders-for-member", &[Value::from("m-1")])
        .unwrap();
    let two = session
        .query("orders-for-member", &[Value::from("m-2")])
        .unwrap();
    let none = session
        .query("orders-for-member", &[Value::from("m-9")])
        .unwrap();

    assert_eq!(one.len(), 1);
    assert_eq!(two.len(), 2);
    assert!(none.is_empty());
}

#[test]
fn query_reflects_memory_at_call_time() {
    let (base, order, amount, _) = query_base();
    let mut session = Session::new(base);
    let h = session.insert(Fact::new(order).with(amount, 90i64)).unwrap();

    assert_eq!(session.query("large-orders", &[]).unwrap().len(), 1);

    session.update(h, |f| f.set(amount, 10i64)).unwrap();
    assert!(session.query("large-orders", &[]).unwrap().is_empty());

    session.retract(h).unwrap();
    assert!(session.query("large-orders", &[]).unwrap().is_empty());
}

#[test]
fn query_does_not_disturb_the_agenda() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(Rule::new(
        "any-order",
        Condition::new().pattern(Pattern::new(order)),
        Arc::new(|_, _| Ok(())),
    ));
    builder.add_query(Query::new(
        "all-orders",
        &[],
        Condition::new().pattern(Pattern::new(order)),
    ));
    let base = Arc::new(builder.build().unwrap());

    let mut session = Session::new(base);
    session.insert(Fact::new(order)).unwrap();
    let before = session.pending_count();

    session.query("all-orders", &[]).unwrap();
    assert_eq!(session.pending_count(), before);
    assert_eq!(session.fire_all_rules().unwrap(), 1);
}

#[test]
fn unknown_query_and_bad_arity_are_errors() {
    let (base, _, _, _) = query_base();
    let session = Session::new(base);

    let err = session.query("missing", &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownQuery(_)));

    let err = session.query("orders-for-member", &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Configuration(_)));
    assert!(format!("{err}").contains("expects 1 arguments"));
}
