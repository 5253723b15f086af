//! Integration tests for Value types
//!
//! Tests construction, accessors, equality, and cross-kind comparison.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use tinderbox_foundation::{FactHandle, Value};

// =============================================================================
// Construction and Accessors
// =============================================================================

#[test]
fn value_nil() {
    let v = Value::Nil;
    assert!(v.is_nil());
    assert_eq!(v.as_int(), None);
}

#[test]
fn value_int() {
    let v = Value::Int(42);
    assert_eq!(v.as_int(), Some(42));
    assert_eq!(v.as_float(), None);
    assert_eq!(v.as_number(), Some(42.0));
}

#[test]
fn value_float() {
    let v = Value::Float(2.5);
    assert_eq!(v.as_float(), Some(2.5));
    assert_eq!(v.as_int(), None);
    assert_eq!(v.as_number(), Some(2.5));
}

#[test]
fn value_string() {
    let v = Value::from("hello");
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v, Value::String(Arc::from("hello")));
}

#[test]
fn value_handle() {
    let h = FactHandle::new(7, 3);
    let v = Value::from(h);
    assert_eq!(v.as_handle(), Some(h));
    assert_eq!(v.as_str(), None);
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn equality_is_strict_by_kind() {
    assert_ne!(Value::Int(2), Value::Float(2.0));
    assert_ne!(Value::Bool(true), Value::Int(1));
    assert_eq!(Value::Int(2), Value::Int(2));
}

#[test]
fn float_equality_is_bitwise() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_ne!(Value::Float(0.0), Value::Float(-0.0));
}

#[test]
fn values_hash_consistently() {
    let mut set = HashSet::new();
    set.insert(Value::Int(1));
    set.insert(Value::Int(1));
    set.insert(Value::from("one"));
    assert_eq!(set.len(), 2);
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn compare_crosses_int_and_float() {
    assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
    assert_eq!(
        Value::Float(3.0).compare(&Value::Int(3)),
        Some(Ordering::Equal)
    );
}

#[test]
fn compare_strings_lexicographically() {
    assert_eq!(
        Value::from("apple").compare(&Value::from("banana")),
        Some(Ordering::Less)
    );
}

#[test]
fn incomparable_kinds_compare_to_none() {
    assert_eq!(Value::from("a").compare(&Value::Int(1)), None);
    assert_eq!(Value::Nil.compare(&Value::Nil), None);
    assert_eq!(
        Value::from(FactHandle::new(0, 1)).compare(&Value::Int(0)),
        None
    );
}
