//! Rule base construction and validation.
//!
//! A [`RuleBase`] is built once, validated, and immutable afterwards. It
//! may be shared across sessions behind an `Arc`; the only mutable state
//! lives in each session's working memory and agenda.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tinderbox_foundation::{Error, Interner, Result, TypeId};

use crate::pattern::{Condition, FieldConstraint};
use crate::rule::Rule;

// =============================================================================
// Queries
// =============================================================================

/// A named, read-only condition with positional parameters.
#[derive(Clone, Debug)]
pub struct Query {
    /// Query name, unique within a rule base.
    pub name: Arc<str>,
    /// Parameter variable names, bound from call arguments.
    pub params: Vec<Arc<str>>,
    /// The condition to evaluate.
    pub condition: Condition,
}

impl Query {
    /// Creates a query.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, params: &[&str], condition: Condition) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| Arc::from(*p)).collect(),
            condition,
        }
    }
}

// =============================================================================
// Rule Base
// =============================================================================

/// An immutable, validated set of rules and queries.
#[derive(Debug)]
pub struct RuleBase {
    rules: Vec<Rule>,
    queries: HashMap<Arc<str>, Query>,
    by_type: HashMap<TypeId, Vec<usize>>,
    interner: Interner,
}

impl RuleBase {
    /// All rules in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a query by name.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&Query> {
        self.queries.get(name)
    }

    /// Indices of rules whose conditions reference the given fact type.
    #[must_use]
    pub fn rules_for_type(&self, type_tag: TypeId) -> &[usize] {
        self.by_type.get(&type_tag).map_or(&[], Vec::as_slice)
    }

    /// The interner holding every name the rules and queries reference.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the rule base holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates rule and query definitions, then validates them into a
/// [`RuleBase`].
#[derive(Default)]
pub struct RuleBaseBuilder {
    rules: Vec<Rule>,
    queries: Vec<Query>,
    interner: Interner,
}

impl RuleBaseBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the interner, for interning type tags and field
    /// names while authoring rules.
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    /// Adds a rule.
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Adds a query.
    pub fn add_query(&mut self, query: Query) -> &mut Self {
        self.queries.push(query);
        self
    }

    /// Validates the definitions and produces an immutable rule base.
    ///
    /// # Errors
    /// `Configuration` on duplicate rule or query names, empty
    /// conditions, or joins on variables not bound by an earlier pattern.
    pub fn build(self) -> Result<RuleBase> {
        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(Arc::clone(&rule.name)) {
                return Err(Error::configuration(format!(
                    "duplicate rule name '{}'",
                    rule.name
                )));
            }
            if rule.condition.is_empty() {
                return Err(Error::configuration(format!(
                    "rule '{}' has an empty condition",
                    rule.name
                )));
            }
            Self::validate_joins(&rule.condition, &[], &format!("rule '{}'", rule.name))?;
        }

        let mut queries = HashMap::new();
        for query in self.queries {
            if query.condition.is_empty() {
                return Err(Error::configuration(format!(
                    "query '{}' has an empty condition",
                    query.name
                )));
            }
            let mut params = HashSet::new();
            for param in &query.params {
                if !params.insert(Arc::clone(param)) {
                    return Err(Error::configuration(format!(
                        "query '{}' declares parameter '{param}' twice",
                        query.name
                    )));
                }
            }
            Self::validate_joins(
                &query.condition,
                &query.params,
                &format!("query '{}'", query.name),
            )?;
            if queries.contains_key(&query.name) {
                return Err(Error::configuration(format!(
                    "duplicate query name '{}'",
                    query.name
                )));
            }
            queries.insert(Arc::clone(&query.name), query);
        }

        let mut by_type: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            for type_tag in rule.condition.referenced_types() {
                by_type.entry(type_tag).or_default().push(idx);
            }
        }

        Ok(RuleBase {
            rules: self.rules,
            queries,
            by_type,
            interner: self.interner,
        })
    }

    /// Every join variable must be bound by an earlier pattern (or be a
    /// declared query parameter).
    fn validate_joins(condition: &Condition, pre_bound: &[Arc<str>], owner: &str) -> Result<()> {
        let mut bound: HashSet<Arc<str>> = pre_bound.iter().cloned().collect();

        for pattern in &condition.patterns {
            for constraint in &pattern.constraints {
                if let FieldConstraint::EqVar { var, .. } = constraint {
                    if !bound.contains(var) {
                        return Err(Error::configuration(format!(
                            "{owner} joins on variable '{var}' before it is bound"
                        )));
                    }
                }
            }
            if let Some(var) = &pattern.handle_var {
                bound.insert(Arc::clone(var));
            }
            for (var, _) in &pattern.bindings {
                bound.insert(Arc::clone(var));
            }
        }

        Ok(())
    }
}
