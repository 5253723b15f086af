//! Conditions as data: patterns, field constraints, and match-and-bind.
//!
//! A rule condition is a conjunction of patterns. Each pattern constrains
//! one fact type and may bind variables from field values or join on
//! variables bound by earlier patterns. Match-and-bind returns bound
//! tuples or nothing; a non-match is never an error.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tinderbox_foundation::{FactHandle, FieldId, TypeId, Value};
use tinderbox_storage::{Fact, WorkingMemory};

// =============================================================================
// Field Constraints
// =============================================================================

/// Comparison operator for a field constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// Field equals a literal (strict by value kind).
    Eq,
    /// Field differs from a literal.
    Ne,
    /// Field is greater than a literal.
    Gt,
    /// Field is greater than or equal to a literal.
    Ge,
    /// Field is less than a literal.
    Lt,
    /// Field is less than or equal to a literal.
    Le,
}

impl CompareOp {
    /// Whether `actual op expected` holds.
    ///
    /// Relational operators use [`Value::compare`]; incomparable value
    /// kinds simply fail the constraint.
    #[must_use]
    pub fn holds(self, actual: &Value, expected: &Value) -> bool {
        match self {
            Self::Eq => actual == expected,
            Self::Ne => actual != expected,
            Self::Gt | Self::Ge | Self::Lt | Self::Le => {
                let Some(ord) = actual.compare(expected) else {
                    return false;
                };
                matches!(
                    (self, ord),
                    (Self::Gt, Ordering::Greater)
                        | (Self::Ge, Ordering::Greater | Ordering::Equal)
                        | (Self::Lt, Ordering::Less)
                        | (Self::Le, Ordering::Less | Ordering::Equal)
                )
            }
        }
    }
}

/// Opaque predicate over a whole fact.
#[derive(Clone)]
pub struct PredicateFn {
    /// Predicate name for debugging.
    pub name: Arc<str>,
    /// The predicate itself.
    pub func: Arc<dyn Fn(&Fact) -> bool + Send + Sync>,
}

impl fmt::Debug for PredicateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PredicateFn({})", self.name)
    }
}

/// A single constraint inside a pattern.
#[derive(Clone, Debug)]
pub enum FieldConstraint {
    /// Compare a field against a literal value.
    Compare {
        /// The constrained field.
        field: FieldId,
        /// The comparison operator.
        op: CompareOp,
        /// The literal to compare against.
        value: Value,
    },
    /// Join: the field must equal a variable bound by an earlier pattern.
    EqVar {
        /// The constrained field.
        field: FieldId,
        /// The previously bound variable.
        var: Arc<str>,
    },
    /// Opaque predicate over the candidate fact.
    Predicate(PredicateFn),
}

impl FieldConstraint {
    /// Field equals a literal.
    #[must_use]
    pub fn eq(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    /// Field differs from a literal.
    #[must_use]
    pub fn ne(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Ne,
            value: value.into(),
        }
    }

    /// Field is greater than a literal.
    #[must_use]
    pub fn gt(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Gt,
            value: value.into(),
        }
    }

    /// Field is greater than or equal to a literal.
    #[must_use]
    pub fn ge(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Ge,
            value: value.into(),
        }
    }

    /// Field is less than a literal.
    #[must_use]
    pub fn lt(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Lt,
            value: value.into(),
        }
    }

    /// Field is less than or equal to a literal.
    #[must_use]
    pub fn le(field: FieldId, value: impl Into<Value>) -> Self {
        Self::Compare {
            field,
            op: CompareOp::Le,
            value: value.into(),
        }
    }

    /// Join on a variable bound by an earlier pattern.
    #[must_use]
    pub fn join(field: FieldId, var: impl Into<Arc<str>>) -> Self {
        Self::EqVar {
            field,
            var: var.into(),
        }
    }

    /// Opaque predicate over the candidate fact.
    #[must_use]
    pub fn predicate(
        name: impl Into<Arc<str>>,
        func: impl Fn(&Fact) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Predicate(PredicateFn {
            name: name.into(),
            func: Arc::new(func),
        })
    }
}

// =============================================================================
// Patterns and Conditions
// =============================================================================

/// One pattern in a condition: constrains a single fact type.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// The fact type this pattern matches.
    pub fact_type: TypeId,
    /// Variable bound to the matched fact's handle, if any.
    pub handle_var: Option<Arc<str>>,
    /// Constraints the candidate fact must satisfy.
    pub constraints: Vec<FieldConstraint>,
    /// Variables bound from field values, applied after constraints.
    pub bindings: Vec<(Arc<str>, FieldId)>,
}

impl Pattern {
    /// Creates an unconstrained pattern over a fact type.
    #[must_use]
    pub fn new(fact_type: TypeId) -> Self {
        Self {
            fact_type,
            handle_var: None,
            constraints: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Binds the matched fact's handle to a variable.
    #[must_use]
    pub fn with_handle_var(mut self, var: impl Into<Arc<str>>) -> Self {
        self.handle_var = Some(var.into());
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: FieldConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Binds a field value to a variable.
    #[must_use]
    pub fn bind(mut self, var: impl Into<Arc<str>>, field: FieldId) -> Self {
        self.bindings.push((var.into(), field));
        self
    }
}

/// A conjunction of patterns forming a rule or query condition.
#[derive(Clone, Debug, Default)]
pub struct Condition {
    /// Patterns evaluated in declaration order.
    pub patterns: Vec<Pattern>,
}

impl Condition {
    /// Creates an empty condition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// All fact types this condition references.
    #[must_use]
    pub fn referenced_types(&self) -> HashSet<TypeId> {
        self.patterns.iter().map(|p| p.fact_type).collect()
    }

    /// Returns true if the condition has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// Variable bindings accumulated during matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<Arc<str>, Value>,
}

impl Bindings {
    /// Creates empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a binding by variable name.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Value> {
        self.values.get(var)
    }

    /// Sets a binding.
    pub fn set(&mut self, var: impl Into<Arc<str>>, value: Value) {
        self.values.insert(var.into(), value);
    }

    /// Gets the handle bound to a variable.
    #[must_use]
    pub fn get_handle(&self, var: &str) -> Option<FactHandle> {
        self.values.get(var).and_then(Value::as_handle)
    }

    /// Iterates all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.values.iter()
    }

    /// Bindings as (name, value) pairs in deterministic name order.
    #[must_use]
    pub fn sorted(&self) -> Vec<(Arc<str>, Value)> {
        let mut pairs: Vec<_> = self
            .values
            .iter()
            .map(|(k, v)| (Arc::clone(k), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Matching
// =============================================================================

/// A satisfying fact tuple with its variable bindings.
#[derive(Clone, Debug)]
pub struct TupleMatch {
    /// Bound fact handles, one per pattern, in declaration order.
    pub handles: Vec<FactHandle>,
    /// Variable bindings produced by the match.
    pub bindings: Bindings,
}

/// Evaluates conditions against a working memory.
///
/// Evaluation is a plain combinatorial enumeration of candidate tuples
/// in pattern declaration order; there is no incremental join network.
pub struct PatternMatcher;

impl PatternMatcher {
    /// Finds all satisfying tuples for a condition.
    #[must_use]
    pub fn matches(condition: &Condition, memory: &WorkingMemory) -> Vec<TupleMatch> {
        Self::matches_seeded(condition, memory, &Bindings::new())
    }

    /// Finds all satisfying tuples, starting from pre-bound variables.
    ///
    /// Parameterized queries seed their arguments this way.
    #[must_use]
    pub fn matches_seeded(
        condition: &Condition,
        memory: &WorkingMemory,
        seed: &Bindings,
    ) -> Vec<TupleMatch> {
        if condition.patterns.is_empty() {
            return Vec::new();
        }
        let mut results = Vec::new();
        let mut tuple = Vec::with_capacity(condition.patterns.len());
        Self::match_from(
            &condition.patterns,
            memory,
            seed.clone(),
            &mut tuple,
            &mut results,
        );
        results
    }

    fn match_from(
        patterns: &[Pattern],
        memory: &WorkingMemory,
        bindings: Bindings,
        tuple: &mut Vec<FactHandle>,
        out: &mut Vec<TupleMatch>,
    ) {
        let Some((first, rest)) = patterns.split_first() else {
            out.push(TupleMatch {
                handles: tuple.clone(),
                bindings,
            });
            return;
        };

        for &handle in memory.facts_of_type(first.fact_type) {
            let Ok(fact) = memory.fact(handle) else {
                continue;
            };
            if let Some(extended) = Self::try_bind(first, handle, fact, &bindings) {
                tuple.push(handle);
                Self::match_from(rest, memory, extended, tuple, out);
                tuple.pop();
            }
        }
    }

    /// Match-and-bind one pattern against one fact.
    ///
    /// Returns the extended bindings on success, `None` for a non-match.
    /// A missing field is a non-match, never an error.
    fn try_bind(
        pattern: &Pattern,
        handle: FactHandle,
        fact: &Fact,
        bindings: &Bindings,
    ) -> Option<Bindings> {
        for constraint in &pattern.constraints {
            match constraint {
                FieldConstraint::Compare { field, op, value } => {
                    let actual = fact.get(*field)?;
                    if !op.holds(actual, value) {
                        return None;
                    }
                }
                FieldConstraint::EqVar { field, var } => {
                    let actual = fact.get(*field)?;
                    let bound = bindings.get(var)?;
                    if actual != bound {
                        return None;
                    }
                }
                FieldConstraint::Predicate(predicate) => {
                    if !(predicate.func)(fact) {
                        return None;
                    }
                }
            }
        }

        let mut extended = bindings.clone();

        if let Some(var) = &pattern.handle_var {
            let value = Value::Handle(handle);
            match extended.get(var) {
                Some(existing) if existing != &value => return None,
                Some(_) => {}
                None => extended.set(Arc::clone(var), value),
            }
        }

        for (var, field) in &pattern.bindings {
            let value = fact.get(*field)?.clone();
            match extended.get(var) {
                // Unification: a rebind must agree with the existing value
                Some(existing) if existing != &value => return None,
                Some(_) => {}
                None => extended.set(Arc::clone(var), value),
            }
        }

        Some(extended)
    }
}

// =============================================================================
// Tests
// =============================================================================
