//! The observable event surface: listeners and the audit log.
//!
//! Listeners are notified synchronously on the calling thread, in
//! registration order, from inside session operations. A listener must
//! not call back into the session that invoked it.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tinderbox_foundation::FactHandle;

use crate::rule::RuleMatch;

// =============================================================================
// Listeners
// =============================================================================

/// Observer of session lifecycle events.
///
/// Every method has a no-op default, so implementors override only the
/// events they care about. Listeners take `&self`; stateful listeners
/// use interior mutability.
pub trait SessionListener: Send + Sync {
    /// A new activation was placed on the agenda.
    fn match_created(&self, rule_match: &RuleMatch) {
        let _ = rule_match;
    }

    /// A pending activation was invalidated before firing.
    fn match_cancelled(&self, rule_match: &RuleMatch) {
        let _ = rule_match;
    }

    /// An activation is about to fire.
    fn before_fire(&self, rule_match: &RuleMatch) {
        let _ = rule_match;
    }

    /// An activation's action completed.
    fn after_fire(&self, rule_match: &RuleMatch) {
        let _ = rule_match;
    }

    /// A fact was inserted into working memory.
    fn object_inserted(&self, handle: FactHandle, type_name: &str) {
        let _ = (handle, type_name);
    }

    /// A fact was updated in place.
    fn object_updated(&self, handle: FactHandle, type_name: &str) {
        let _ = (handle, type_name);
    }

    /// A fact was retracted.
    fn object_deleted(&self, handle: FactHandle, type_name: &str) {
        let _ = (handle, type_name);
    }

    /// An agenda group was pushed onto the focus stack.
    fn agenda_group_pushed(&self, group: &str) {
        let _ = group;
    }

    /// An exhausted agenda group was popped off the focus stack.
    fn agenda_group_popped(&self, group: &str) {
        let _ = group;
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// What happened to an activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The activation was placed on the agenda.
    Matched,
    /// The activation was cancelled before firing.
    Cancelled,
    /// The activation fired.
    Fired,
}

/// One recorded activation event.
#[derive(Clone, Debug)]
pub struct ExecutionEvent {
    /// Name of the rule involved.
    pub rule: Arc<str>,
    /// What happened.
    pub kind: EventKind,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Description of the bound facts.
    pub facts: Arc<str>,
}

#[derive(Debug, Default)]
struct AuditInner {
    history: Vec<ExecutionEvent>,
    fired: Vec<Arc<str>>,
}

/// A listener that records activation events for later inspection.
///
/// Shared behind an `Arc` between the session and the caller; the inner
/// mutex makes recording and reading safe from either side.
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<AuditInner>,
}

impl AuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, rule: &Arc<str>, kind: EventKind, facts: &Arc<str>) {
        let mut inner = self.lock();
        if kind == EventKind::Fired {
            inner.fired.push(Arc::clone(rule));
        }
        inner.history.push(ExecutionEvent {
            rule: Arc::clone(rule),
            kind,
            at: Utc::now(),
            facts: Arc::clone(facts),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuditInner> {
        // A listener panic mid-record leaves nothing half-written worth
        // rejecting, so recover from poisoning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All recorded events, in order.
    #[must_use]
    pub fn history(&self) -> Vec<ExecutionEvent> {
        self.lock().history.clone()
    }

    /// Names of fired rules, in firing order.
    #[must_use]
    pub fn fired_rules(&self) -> Vec<Arc<str>> {
        self.lock().fired.clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().history.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().history.is_empty()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.history.clear();
        inner.fired.clear();
    }
}

impl SessionListener for AuditLog {
    fn match_created(&self, rule_match: &RuleMatch) {
        self.record(&rule_match.rule, EventKind::Matched, &rule_match.summary);
    }

    fn match_cancelled(&self, rule_match: &RuleMatch) {
        self.record(&rule_match.rule, EventKind::Cancelled, &rule_match.summary);
    }

    fn after_fire(&self, rule_match: &RuleMatch) {
        self.record(&rule_match.rule, EventKind::Fired, &rule_match.summary);
    }
}
