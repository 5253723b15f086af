//! Stateful sessions: working memory mutation, truth maintenance, and
//! the fire loop.
//!
//! A session owns a private working memory and agenda over a shared,
//! immutable rule base. Every insert, update, and retract re-derives the
//! affected matches immediately, so the agenda always reflects current
//! facts: activations whose tuples no longer hold are cancelled, newly
//! satisfied tuples are activated. Firing drains the agenda one
//! activation at a time, honoring the focus stack and conflict
//! resolution order.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tinderbox_foundation::{Error, FactHandle, FieldId, Interner, Result, TypeId, Value};
use tinderbox_storage::{Fact, WorkingMemory};

use crate::agenda::{Activation, ActivationState, Agenda, MAIN_GROUP};
use crate::event::SessionListener;
use crate::pattern::{Bindings, PatternMatcher, TupleMatch};
use crate::query::QueryResults;
use crate::rule::{Rule, RuleMatch};
use crate::rulebase::RuleBase;

/// Default activation-count kill switch per fire call.
pub const DEFAULT_MAX_ACTIVATIONS: usize = 10_000;

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created; no fire call has run yet.
    Created,
    /// A fire call is in progress.
    Running,
    /// The last fire call drained the agenda.
    FiredOut,
    /// The last fire call stopped early, at a halt request or an error.
    Halted,
    /// Disposed; every further operation fails.
    Disposed,
}

/// A stateful rule session.
///
/// Sessions are single-threaded and are not `Sync`; concurrency comes
/// from running independent sessions over the same shared rule base.
pub struct Session {
    rule_base: Arc<RuleBase>,
    memory: WorkingMemory,
    agenda: Agenda,
    /// Pending activation records. Fired and cancelled activations leave
    /// the map, so it never outgrows the agenda.
    activations: HashMap<u64, Activation>,
    /// Match key of each pending activation, for dedup.
    pending: HashMap<u64, u64>,
    /// Pending activation ids touching each live handle.
    by_handle: HashMap<FactHandle, HashSet<u64>>,
    listeners: Vec<Arc<dyn SessionListener>>,
    next_activation: u64,
    next_seq: u64,
    max_activations: usize,
    halt_requested: bool,
    state: SessionState,
    /// Match key of the activation currently firing, for no-loop.
    firing_key: Option<u64>,
}

impl Session {
    /// Creates a session over a shared rule base.
    ///
    /// The session's working memory is seeded with a clone of the rule
    /// base's interner, so rule-referenced names resolve to the same ids.
    #[must_use]
    pub fn new(rule_base: Arc<RuleBase>) -> Self {
        let memory = WorkingMemory::with_interner(rule_base.interner().clone());
        Self {
            rule_base,
            memory,
            agenda: Agenda::new(),
            activations: HashMap::new(),
            pending: HashMap::new(),
            by_handle: HashMap::new(),
            listeners: Vec::new(),
            next_activation: 0,
            next_seq: 0,
            max_activations: DEFAULT_MAX_ACTIVATIONS,
            halt_requested: false,
            state: SessionState::Created,
            firing_key: None,
        }
    }

    /// Sets the activation-count kill switch for each fire call.
    #[must_use]
    pub fn with_max_activations(mut self, limit: usize) -> Self {
        self.max_activations = limit;
        self
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    /// Removes a previously registered listener by identity.
    ///
    /// Returns true if the listener was registered.
    pub fn remove_listener(&mut self, listener: &Arc<dyn SessionListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        before != self.listeners.len()
    }

    fn notify(&self, event: impl Fn(&dyn SessionListener)) {
        for listener in &self.listeners {
            event(listener.as_ref());
        }
    }

    // =========================================================================
    // Working memory operations
    // =========================================================================

    /// Inserts a fact and derives any newly satisfied matches.
    ///
    /// # Errors
    /// `SessionDisposed` after [`Session::dispose`].
    pub fn insert(&mut self, fact: Fact) -> Result<FactHandle> {
        self.ensure_live()?;
        let type_tag = fact.type_tag();
        let handle = self.memory.insert(fact);

        let type_name = self.type_name(type_tag);
        self.notify(|l| l.object_inserted(handle, &type_name));

        self.refresh_matches(handle, type_tag);
        Ok(handle)
    }

    /// Applies a mutation to a fact and re-derives its matches.
    ///
    /// Pending activations whose tuples no longer hold are cancelled;
    /// tuples that still hold keep their existing activation and agenda
    /// position.
    ///
    /// # Errors
    /// `SessionDisposed`, `UnknownHandle`, or `StaleHandle`.
    pub fn update(&mut self, handle: FactHandle, mutate: impl FnOnce(&mut Fact)) -> Result<()> {
        self.ensure_live()?;
        self.memory.update(handle, mutate)?;
        let type_tag = self.memory.fact(handle)?.type_tag();

        let type_name = self.type_name(type_tag);
        self.notify(|l| l.object_updated(handle, &type_name));

        self.refresh_matches(handle, type_tag);
        Ok(())
    }

    /// Retracts a fact, cancelling every pending activation bound to it.
    ///
    /// # Errors
    /// `SessionDisposed`, `UnknownHandle`, or `StaleHandle`.
    pub fn retract(&mut self, handle: FactHandle) -> Result<Fact> {
        self.ensure_live()?;
        let fact = self.memory.retract(handle)?;

        let type_name = self.type_name(fact.type_tag());
        self.notify(|l| l.object_deleted(handle, &type_name));

        if let Some(ids) = self.by_handle.remove(&handle) {
            for id in ids {
                self.cancel(id);
            }
        }
        Ok(fact)
    }

    /// Returns a fact by handle.
    ///
    /// # Errors
    /// `SessionDisposed`, `UnknownHandle`, or `StaleHandle`.
    pub fn fact(&self, handle: FactHandle) -> Result<&Fact> {
        self.ensure_live()?;
        self.memory.fact(handle)
    }

    /// Reads a single field off a fact.
    ///
    /// # Errors
    /// Handle errors as for [`Session::fact`]; `UnknownField` if the fact
    /// lacks the field.
    pub fn value(&self, handle: FactHandle, field: FieldId) -> Result<Value> {
        self.ensure_live()?;
        self.memory.value(handle, field)
    }

    /// Returns true if the handle refers to a live fact.
    #[must_use]
    pub fn contains(&self, handle: FactHandle) -> bool {
        self.memory.contains(handle)
    }

    /// Read access to the working memory.
    #[must_use]
    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    /// Mutable access to the session's interner, for interning names at
    /// runtime.
    pub fn interner_mut(&mut self) -> &mut Interner {
        self.memory.interner_mut()
    }

    /// Number of live facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.memory.len()
    }

    /// Number of pending activations across all agenda groups.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The session's lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    // =========================================================================
    // Focus and firing
    // =========================================================================

    /// Pushes an agenda group onto the focus stack.
    ///
    /// A no-op if the group is already the top of the stack. `MAIN` is
    /// the permanent bottom and regains focus when pushed groups exhaust.
    ///
    /// # Errors
    /// `SessionDisposed` after [`Session::dispose`].
    pub fn set_focus(&mut self, group: &str) -> Result<()> {
        self.ensure_live()?;
        if self.agenda.set_focus(group) {
            self.notify(|l| l.agenda_group_pushed(group));
        }
        Ok(())
    }

    /// Requests that the current fire loop stop after the in-flight
    /// activation completes. Callable from rule actions.
    pub fn halt(&mut self) {
        self.halt_requested = true;
    }

    /// Fires activations until the agenda drains or a halt is requested.
    ///
    /// Activations are popped from the focused group in (salience desc,
    /// sequence asc) order; an exhausted non-`MAIN` group is popped off
    /// the focus stack and firing continues with the group beneath it.
    /// Returns the number of activations fired.
    ///
    /// # Errors
    /// `SessionDisposed`; `ActionFailed` when a rule action raises, with
    /// remaining pending activations left in place; `RunawayInference`
    /// when more than the configured limit fire in one call. Either
    /// error leaves the session `Halted`; firing may be resumed with
    /// another call.
    pub fn fire_all_rules(&mut self) -> Result<usize> {
        self.ensure_live()?;
        self.state = SessionState::Running;
        self.halt_requested = false;
        let mut fired = 0usize;

        loop {
            if self.halt_requested {
                self.state = SessionState::Halted;
                return Ok(fired);
            }

            let group = Arc::clone(self.agenda.focus_top());
            let Some(id) = self.agenda.pop(&group) else {
                if &*group == MAIN_GROUP {
                    self.state = SessionState::FiredOut;
                    return Ok(fired);
                }
                self.agenda.pop_focus();
                self.notify(|l| l.agenda_group_popped(&group));
                continue;
            };

            // Settled activations have no record; their leftover queue
            // entries are skipped here.
            let Some(activation) = self.activations.get(&id) else {
                continue;
            };
            if fired >= self.max_activations {
                // Re-queue the popped entry so the agenda stays
                // consistent with the pending books.
                let (salience, seq) = (activation.salience, activation.seq);
                self.agenda.push(&group, salience, seq, id);
                self.state = SessionState::Halted;
                return Err(Error::runaway_inference(self.max_activations));
            }

            let Some(mut activation) = self.activations.remove(&id) else {
                continue;
            };
            activation.state = ActivationState::Fired;
            let key = activation.key;
            let rule_idx = activation.rule_idx;
            let rule_match = activation.rule_match;
            self.forget_pending(id, key, &rule_match);

            self.notify(|l| l.before_fire(&rule_match));

            let rule_base = Arc::clone(&self.rule_base);
            let action = Arc::clone(&rule_base.rules()[rule_idx].action);
            self.firing_key = Some(key);
            let outcome = (action.as_ref())(self, &rule_match);
            self.firing_key = None;
            if let Err(err) = outcome {
                self.state = SessionState::Halted;
                return Err(Error::action_failed(rule_match.rule.to_string(), err));
            }

            self.notify(|l| l.after_fire(&rule_match));
            fired += 1;
        }
    }

    /// Disposes the session, dropping its agenda, facts, and listeners.
    ///
    /// Idempotent; every subsequent operation fails with
    /// `SessionDisposed`.
    pub fn dispose(&mut self) {
        self.state = SessionState::Disposed;
        self.agenda.clear();
        self.activations.clear();
        self.pending.clear();
        self.by_handle.clear();
        self.listeners.clear();
        self.memory = WorkingMemory::new();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Evaluates a named query against current working memory.
    ///
    /// Arguments bind positionally to the query's declared parameters.
    /// Queries never mutate facts or the agenda.
    ///
    /// # Errors
    /// `SessionDisposed`; `UnknownQuery` for an unregistered name;
    /// `Configuration` on an argument-count mismatch.
    pub fn query(&self, name: &str, args: &[Value]) -> Result<QueryResults> {
        self.ensure_live()?;
        let query = self
            .rule_base
            .query(name)
            .ok_or_else(|| Error::unknown_query(name))?;

        if args.len() != query.params.len() {
            return Err(Error::configuration(format!(
                "query '{name}' expects {} arguments, got {}",
                query.params.len(),
                args.len()
            )));
        }

        let mut seed = Bindings::new();
        for (param, arg) in query.params.iter().zip(args) {
            seed.set(Arc::clone(param), arg.clone());
        }

        let tuples = PatternMatcher::matches_seeded(&query.condition, &self.memory, &seed);
        Ok(QueryResults::from_tuples(tuples))
    }

    // =========================================================================
    // Truth maintenance
    // =========================================================================

    /// Re-derives matches for every rule referencing the mutated fact's
    /// type.
    fn refresh_matches(&mut self, handle: FactHandle, type_tag: TypeId) {
        let rule_base = Arc::clone(&self.rule_base);

        for &rule_idx in rule_base.rules_for_type(type_tag) {
            let rule = &rule_base.rules()[rule_idx];
            let tuples = PatternMatcher::matches(&rule.condition, &self.memory);

            let mut current: HashMap<u64, TupleMatch> = HashMap::new();
            for tuple in tuples {
                if tuple.handles.contains(&handle) {
                    current.insert(match_key(rule_idx, &tuple.handles), tuple);
                }
            }

            // Cancel pending activations of this rule involving the handle
            // whose tuples no longer hold.
            let involved: Vec<u64> = self
                .by_handle
                .get(&handle)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            for id in involved {
                let Some(activation) = self.activations.get(&id) else {
                    continue;
                };
                if activation.rule_idx != rule_idx {
                    continue;
                }
                if !current.contains_key(&activation.key) {
                    self.cancel(id);
                }
            }

            for (key, tuple) in current {
                if self.pending.contains_key(&key) {
                    continue;
                }
                if rule.no_loop && self.firing_key == Some(key) {
                    continue;
                }
                self.activate(rule_idx, rule, key, tuple);
            }
        }
    }

    fn activate(&mut self, rule_idx: usize, rule: &Rule, key: u64, tuple: TupleMatch) {
        let summary = self.tuple_summary(&tuple.handles);
        let rule_match = RuleMatch {
            rule: Arc::clone(&rule.name),
            handles: tuple.handles,
            bindings: tuple.bindings,
            summary,
        };

        let id = self.next_activation;
        self.next_activation += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        self.agenda.push(&rule.agenda_group, rule.salience, seq, id);
        self.pending.insert(key, id);
        for &h in &rule_match.handles {
            self.by_handle.entry(h).or_default().insert(id);
        }
        self.notify(|l| l.match_created(&rule_match));

        self.activations.insert(
            id,
            Activation {
                id,
                rule_idx,
                key,
                rule_match,
                salience: rule.salience,
                seq,
                state: ActivationState::Pending,
            },
        );
    }

    fn cancel(&mut self, id: u64) {
        let Some(mut activation) = self.activations.remove(&id) else {
            return;
        };
        activation.state = ActivationState::Cancelled;

        self.forget_pending(id, activation.key, &activation.rule_match);
        self.notify(|l| l.match_cancelled(&activation.rule_match));
    }

    /// Drops an activation's dedup and handle-index entries once it
    /// leaves the pending state.
    fn forget_pending(&mut self, id: u64, key: u64, rule_match: &RuleMatch) {
        if self.pending.get(&key) == Some(&id) {
            self.pending.remove(&key);
        }
        for &h in &rule_match.handles {
            if let Some(ids) = self.by_handle.get_mut(&h) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_handle.remove(&h);
                }
            }
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state == SessionState::Disposed {
            return Err(Error::session_disposed());
        }
        Ok(())
    }

    fn type_name(&self, type_tag: TypeId) -> Arc<str> {
        Arc::from(self.memory.interner().type_name(type_tag).unwrap_or("?"))
    }

    fn tuple_summary(&self, handles: &[FactHandle]) -> Arc<str> {
        let names: Vec<&str> = handles
            .iter()
            .map(|&h| {
                self.memory
                    .fact(h)
                    .ok()
                    .and_then(|fact| self.memory.interner().type_name(fact.type_tag()))
                    .unwrap_or("?")
            })
            .collect();
        Arc::from(names.join(", "))
    }
}

/// Identity of a (rule, fact tuple) pair.
///
/// Stable across updates to the bound facts, so a tuple that still holds
/// after an update keeps its pending activation.
fn match_key(rule_idx: usize, handles: &[FactHandle]) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    rule_idx.hash(&mut hasher);
    handles.hash(&mut hasher);
    hasher.finish()
}
