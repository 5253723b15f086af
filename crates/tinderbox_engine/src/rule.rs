//! Rule definitions and bound matches.

use std::fmt;
use std::sync::Arc;

use tinderbox_foundation::{FactHandle, Result, Value};

use crate::pattern::{Bindings, Condition};
use crate::session::Session;

/// A rule's right-hand side.
///
/// Actions run synchronously on the firing thread and may insert, update,
/// and retract facts through the session they receive.
pub type Action = Arc<dyn Fn(&mut Session, &RuleMatch) -> Result<()> + Send + Sync>;

/// A rule definition.
#[derive(Clone)]
pub struct Rule {
    /// Rule name, unique within a rule base.
    pub name: Arc<str>,
    /// Priority (higher fires first).
    pub salience: i32,
    /// Agenda group; only the focused group fires.
    pub agenda_group: Arc<str>,
    /// Suppress re-activation by updates from this rule's own action.
    pub no_loop: bool,
    /// Left-hand side: a conjunction of patterns.
    pub condition: Condition,
    /// Right-hand side.
    pub action: Action,
}

impl Rule {
    /// Creates a rule with default salience 0 in the `MAIN` agenda group.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, condition: Condition, action: Action) -> Self {
        Self {
            name: name.into(),
            salience: 0,
            agenda_group: Arc::from(crate::agenda::MAIN_GROUP),
            no_loop: false,
            condition,
            action,
        }
    }

    /// Sets the salience (priority).
    #[must_use]
    pub fn with_salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Sets the agenda group.
    #[must_use]
    pub fn with_agenda_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.agenda_group = group.into();
        self
    }

    /// Sets the no-loop flag.
    #[must_use]
    pub fn with_no_loop(mut self, no_loop: bool) -> Self {
        self.no_loop = no_loop;
        self
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("agenda_group", &self.agenda_group)
            .field("no_loop", &self.no_loop)
            .field("patterns", &self.condition.patterns.len())
            .finish_non_exhaustive()
    }
}

/// The bound fact tuple handed to actions and listeners.
///
/// Owned snapshot: it does not borrow from the session, so actions may
/// freely mutate working memory while holding it.
#[derive(Clone, Debug)]
pub struct RuleMatch {
    /// The matched rule's name.
    pub rule: Arc<str>,
    /// Bound fact handles in pattern declaration order.
    pub handles: Vec<FactHandle>,
    /// Variable bindings from the match.
    pub bindings: Bindings,
    /// Human-readable description of the bound facts.
    pub summary: Arc<str>,
}

impl RuleMatch {
    /// Handle bound by the pattern at `index`.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<FactHandle> {
        self.handles.get(index).copied()
    }

    /// Value bound to a variable.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Value> {
        self.bindings.get(var)
    }

    /// Handle bound to a variable.
    #[must_use]
    pub fn get_handle(&self, var: &str) -> Option<FactHandle> {
        self.bindings.get_handle(var)
    }
}
