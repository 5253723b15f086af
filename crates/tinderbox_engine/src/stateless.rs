//! One-shot, isolated rule execution.
//!
//! A [`StatelessSession`] wraps a shared rule base and runs each call in
//! a private stateful session that is created, fired, and disposed
//! within the call. No state leaks between calls, so a single instance
//! may serve many threads concurrently.

use std::sync::Arc;

use tinderbox_foundation::Result;
use tinderbox_storage::Fact;

use crate::event::{AuditLog, SessionListener};
use crate::rulebase::RuleBase;
use crate::session::Session;

/// The outcome of one stateless execution.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    /// Facts surviving in working memory after firing, in handle order.
    pub facts: Vec<Fact>,
    /// Number of activations fired.
    pub rules_fired: usize,
    /// Names of fired rules, in firing order.
    pub fired_rules: Vec<Arc<str>>,
}

/// Executes rules against a batch of facts with no retained state.
#[derive(Clone)]
pub struct StatelessSession {
    rule_base: Arc<RuleBase>,
    /// Agenda groups focused and fired in order before the final `MAIN`
    /// pass. Empty means a single pass over `MAIN`.
    focus_passes: Vec<Arc<str>>,
    max_activations: Option<usize>,
}

impl StatelessSession {
    /// Creates a stateless executor over a shared rule base.
    #[must_use]
    pub fn new(rule_base: Arc<RuleBase>) -> Self {
        Self {
            rule_base,
            focus_passes: Vec::new(),
            max_activations: None,
        }
    }

    /// Runs each execution as a sequence of focused passes.
    ///
    /// Each named group gains focus and fires to exhaustion in turn;
    /// `MAIN` fires last. A pass that retracts the facts a later pass
    /// depends on ends the flow early.
    #[must_use]
    pub fn with_focus_passes(mut self, groups: &[&str]) -> Self {
        self.focus_passes = groups.iter().map(|g| Arc::from(*g)).collect();
        self
    }

    /// Overrides the per-call activation kill switch.
    #[must_use]
    pub fn with_max_activations(mut self, limit: usize) -> Self {
        self.max_activations = Some(limit);
        self
    }

    /// Inserts the given facts, fires to exhaustion, and returns the
    /// surviving facts.
    ///
    /// # Errors
    /// `ActionFailed` or `RunawayInference` from the underlying fire
    /// loop.
    pub fn execute(&self, facts: Vec<Fact>) -> Result<ExecutionResult> {
        let mut session = Session::new(Arc::clone(&self.rule_base));
        if let Some(limit) = self.max_activations {
            session = session.with_max_activations(limit);
        }

        let log = Arc::new(AuditLog::new());
        session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);

        for fact in facts {
            session.insert(fact)?;
        }

        // Focus is a stack, so the passes go on in reverse: the first
        // declared pass fires first, and `MAIN` fires only after every
        // pushed pass has exhausted and popped.
        for group in self.focus_passes.iter().rev() {
            session.set_focus(group)?;
        }
        let rules_fired = session.fire_all_rules()?;

        let mut surviving = Vec::with_capacity(session.fact_count());
        for handle in session.memory().handles() {
            surviving.push(session.memory().fact(handle)?.clone());
        }

        let fired_rules = log.fired_rules();
        session.dispose();

        Ok(ExecutionResult {
            facts: surviving,
            rules_fired,
            fired_rules,
        })
    }
}
