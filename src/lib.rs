//! Tinderbox - Stateful forward-chaining rule engine
//!
//! This crate re-exports all layers of the Tinderbox system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: tinderbox_engine     — Rules, agenda, sessions, queries, listeners
//! Layer 1: tinderbox_storage    — Facts, working memory, handle store
//! Layer 0: tinderbox_foundation — Core types (Value, FactHandle, Error)
//! ```

pub use tinderbox_engine as engine;
pub use tinderbox_foundation as foundation;
pub use tinderbox_storage as storage;

pub use tinderbox_engine::{
    Action, AuditLog, Condition, EventKind, FieldConstraint, MAIN_GROUP, Pattern, Query,
    QueryResults, Rule, RuleBase, RuleBaseBuilder, RuleMatch, Session, SessionListener,
    SessionState, StatelessSession,
};
pub use tinderbox_foundation::{Error, ErrorKind, FactHandle, FieldId, Result, TypeId, Value};
pub use tinderbox_storage::{Fact, WorkingMemory};
