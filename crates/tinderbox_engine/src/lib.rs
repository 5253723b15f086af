//! Rule matching, agenda management, sessions, queries, and listeners
//! for Tinderbox.
//!
//! This crate provides:
//! - [`Pattern`] / [`Condition`] - Conditions as data with match-and-bind
//! - [`Rule`] / [`RuleBase`] - Rule definitions and the immutable rule base
//! - [`Agenda`] - Per-group priority queues and the focus stack
//! - [`Session`] - The stateful insert/update/retract/fire orchestrator
//! - [`StatelessSession`] - One-shot isolated execution
//! - [`SessionListener`] / [`AuditLog`] - The observable event surface

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod agenda;
pub mod event;
pub mod pattern;
pub mod query;
pub mod rule;
pub mod rulebase;
pub mod session;
pub mod stateless;

pub use agenda::{Activation, ActivationState, Agenda, MAIN_GROUP};
pub use event::{AuditLog, EventKind, ExecutionEvent, SessionListener};
pub use pattern::{Bindings, CompareOp, Condition, FieldConstraint, Pattern, PatternMatcher, TupleMatch};
pub use query::{QueryResults, QueryRow};
pub use rule::{Action, Rule, RuleMatch};
pub use rulebase::{Query, RuleBase, RuleBaseBuilder};
pub use session::{DEFAULT_MAX_ACTIVATIONS, Session, SessionState};
pub use stateless::{ExecutionResult, StatelessSession};
