//! Integration tests for fact payloads.

use tinderbox_foundation::{Interner, Value};
use tinderbox_storage::Fact;

#[test]
fn facts_are_structural_over_interned_fields() {
    let mut interner = Interner::new();
    let order = interner.intern_type("Order");
    let amount = interner.intern_field("amount");
    let member_id = interner.intern_field("member_id");

    let fact = Fact::new(order)
        .with(amount, 100i64)
        .with(member_id, "m-1");

    assert_eq!(fact.type_tag(), order);
    assert_eq!(fact.get(amount), Some(&Value::Int(100)));
    assert_eq!(fact.get(member_id), Some(&Value::from("m-1")));
    assert_eq!(fact.len(), 2);
}

#[test]
fn missing_field_reads_as_none() {
    let mut interner = Interner::new();
    let order = interner.intern_type("Order");
    let discount = interner.intern_field("discount");

    let fact = Fact::new(order);
    assert_eq!(fact.get(discount), None);
    assert!(!fact.has(discount));
}

#[test]
fn mutation_does_not_disturb_earlier_snapshots() {
    let mut interner = Interner::new();
    let order = interner.intern_type("Order");
    let amount = interner.intern_field("amount");

    let mut fact = Fact::new(order).with(amount, 1i64);
    let snapshot = fact.clone();
    fact.set(amount, 2i64);

    assert_eq!(snapshot.get(amount), Some(&Value::Int(1)));
    assert_eq!(fact.get(amount), Some(&Value::Int(2)));
}

#[test]
fn fields_of_mixed_kinds_coexist() {
    let mut interner = Interner::new();
    let order = interner.intern_type("Order");
    let amount = interner.intern_field("amount");
    let rate = interner.intern_field("rate");
    let open = interner.intern_field("open");

    let fact = Fact::new(order)
        .with(amount, 10i64)
        .with(rate, 0.25f64)
        .with(open, true);

    assert_eq!(fact.get(rate), Some(&Value::Float(0.25)));
    assert_eq!(fact.get(open), Some(&Value::Bool(true)));
    assert_eq!(fact.fields().count(), 3);
}
