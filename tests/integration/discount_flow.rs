//! End-to-end discount scenario.
//!
//! A rule grants a discount to orders above a threshold; the action
//! writes the discount back onto the matched order.

use std::sync::Arc;

use tinderbox::{
    AuditLog, Condition, Error, Fact, FieldConstraint, Pattern, Rule, RuleBase, RuleBaseBuilder,
    Session, SessionListener, Value,
};

fn discount_base() -> (
    Arc<RuleBase>,
    tinderbox::TypeId,
    tinderbox::FieldId,
    tinderbox::FieldId,
) {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");
    let amount = builder.interner_mut().intern_field("amount");
    let discount = builder.interner_mut().intern_field("discount");

    builder.add_rule(
        Rule::new(
            "discount-large-orders",
            Condition::new().pattern(
                Pattern::new(order)
                    .with_handle_var("$o")
                    .with_constraint(FieldConstraint::gt(amount, 50i64)),
            ),
            Arc::new(move |session, rule_match| {
                let h = rule_match
                    .get_handle("$o")
                    .ok_or_else(|| Error::configuration("missing $o binding"))?;
                session.update(h, |f| f.set(discount, 10i64))
            }),
        )
        .with_no_loop(true),
    );

    (Arc::new(builder.build().unwrap()), order, amount, discount)
}

#[test]
fn order_above_threshold_receives_discount() {
    let (base, order, amount, discount) = discount_base();
    let mut session = Session::new(base);

    let h = session.insert(Fact::new(order).with(amount, 60i64)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);

    assert_eq!(session.value(h, discount).unwrap(), Value::Int(10));
}

#[test]
fn order_at_threshold_is_untouched() {
    let (base, order, amount, discount) = discount_base();
    let mut session = Session::new(base);

    let h = session.insert(Fact::new(order).with(amount, 50i64)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 0);

    assert!(session.value(h, discount).is_err());
    assert!(!session.fact(h).unwrap().has(discount));
}

#[test]
fn growing_an_order_past_the_threshold_grants_the_discount() {
    let (base, order, amount, discount) = discount_base();
    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);

    let h = session.insert(Fact::new(order).with(amount, 20i64)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 0);

    session.update(h, |f| f.set(amount, 75i64)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(session.value(h, discount).unwrap(), Value::Int(10));
    assert_eq!(log.fired_rules().len(), 1);
}

#[test]
fn discount_fires_once_per_order() {
    let (base, order, amount, _) = discount_base();
    let mut session = Session::new(base);

    for raw in [60i64, 70, 80] {
        session.insert(Fact::new(order).with(amount, raw)).unwrap();
    }
    session.insert(Fact::new(order).with(amount, 5i64)).unwrap();

    assert_eq!(session.fire_all_rules().unwrap(), 3);
    assert_eq!(session.fire_all_rules().unwrap(), 0);
    assert_eq!(session.fact_count(), 4);
}
