//! Agenda groups, conflict resolution, and the focus stack.
//!
//! Pending activations are partitioned by agenda group. Within a group,
//! conflict resolution is (salience desc, sequence asc): higher priority
//! first, then matches discovered earlier. Firing always pulls from the
//! group at the top of the focus stack; an exhausted non-`MAIN` group is
//! popped automatically. `MAIN` is the permanent bottom of the stack and
//! is never popped, so repeated fire calls keep working.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use tinderbox_foundation::FactHandle;

use crate::rule::RuleMatch;

/// The default agenda group.
pub const MAIN_GROUP: &str = "MAIN";

// =============================================================================
// Activations
// =============================================================================

/// Lifecycle state of an activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationState {
    /// Eligible to fire; its condition holds against current memory.
    Pending,
    /// Invalidated by a fact mutation before it could fire.
    Cancelled,
    /// Popped and executed. Never reused.
    Fired,
}

/// A (rule, bound fact tuple) match awaiting firing.
#[derive(Clone, Debug)]
pub struct Activation {
    /// Unique activation id.
    pub id: u64,
    /// Index of the rule in the rule base.
    pub rule_idx: usize,
    /// Identity key over (rule, tuple), for dedup and no-loop checks.
    pub key: u64,
    /// The bound match handed to the action and listeners.
    pub rule_match: RuleMatch,
    /// Rule salience at activation time.
    pub salience: i32,
    /// Global monotonic sequence number.
    pub seq: u64,
    /// Current lifecycle state.
    pub state: ActivationState,
}

impl Activation {
    /// The fact handles bound by this activation.
    #[must_use]
    pub fn handles(&self) -> &[FactHandle] {
        &self.rule_match.handles
    }
}

// =============================================================================
// Queues
// =============================================================================

#[derive(Debug)]
struct QueueEntry {
    salience: i32,
    seq: u64,
    id: u64,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher salience first, then lower sequence number
        self.salience
            .cmp(&other.salience)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

// =============================================================================
// Agenda
// =============================================================================

/// Per-group priority queues plus the focus stack.
///
/// Cancelled activations stay in their queue and are skipped lazily when
/// popped; the caller recognizes them by their missing activation record.
#[derive(Debug)]
pub struct Agenda {
    groups: HashMap<Arc<str>, BinaryHeap<QueueEntry>>,
    /// Permanent bottom of the focus stack.
    main: Arc<str>,
    /// Groups pushed above `MAIN`, bottom first.
    focus: Vec<Arc<str>>,
}

impl Default for Agenda {
    fn default() -> Self {
        Self::new()
    }
}

impl Agenda {
    /// Creates an agenda focused on `MAIN`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            main: Arc::from(MAIN_GROUP),
            focus: Vec::new(),
        }
    }

    /// The currently focused group.
    #[must_use]
    pub fn focus_top(&self) -> &Arc<str> {
        self.focus.last().unwrap_or(&self.main)
    }

    /// Depth of the focus stack, counting `MAIN`.
    #[must_use]
    pub fn focus_depth(&self) -> usize {
        self.focus.len() + 1
    }

    /// Pushes a group onto the focus stack.
    ///
    /// Returns false (no-op) if the group is already the top.
    pub fn set_focus(&mut self, group: &str) -> bool {
        if &**self.focus_top() == group {
            return false;
        }
        self.focus.push(Arc::from(group));
        true
    }

    /// Pops the focused group, returning its name.
    ///
    /// `MAIN` is the permanent bottom and is never popped.
    pub fn pop_focus(&mut self) -> Option<Arc<str>> {
        self.focus.pop()
    }

    /// Enqueues an activation into a group.
    pub fn push(&mut self, group: &Arc<str>, salience: i32, seq: u64, id: u64) {
        self.groups
            .entry(Arc::clone(group))
            .or_default()
            .push(QueueEntry { salience, seq, id });
    }

    /// Pops the highest-priority entry from a group.
    ///
    /// The returned id may refer to an already settled activation;
    /// callers skip those and pop again.
    pub fn pop(&mut self, group: &str) -> Option<u64> {
        self.groups
            .get_mut(group)
            .and_then(|queue| queue.pop())
            .map(|entry| entry.id)
    }

    /// Number of queued entries in a group, cancelled entries included.
    #[must_use]
    pub fn queued(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, BinaryHeap::len)
    }

    /// Drops all queued entries and resets focus to `MAIN`.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.focus.clear();
    }
}
