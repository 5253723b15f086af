//! Query results: read-only rows over current working memory.

use tinderbox_foundation::{FactHandle, Value};

use crate::pattern::{Bindings, TupleMatch};

/// One matching tuple from a query evaluation.
#[derive(Clone, Debug)]
pub struct QueryRow {
    handles: Vec<FactHandle>,
    bindings: Bindings,
}

impl QueryRow {
    pub(crate) fn from_tuple(tuple: TupleMatch) -> Self {
        Self {
            handles: tuple.handles,
            bindings: tuple.bindings,
        }
    }

    /// Value bound to a variable in this row.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Value> {
        self.bindings.get(var)
    }

    /// Handle bound by the pattern at `index`.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<FactHandle> {
        self.handles.get(index).copied()
    }

    /// All bound handles in pattern declaration order.
    #[must_use]
    pub fn handles(&self) -> &[FactHandle] {
        &self.handles
    }

    /// All variable bindings in this row.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// The full result set of a query evaluation.
///
/// A snapshot: rows reflect working memory at evaluation time and do not
/// track later mutations.
#[derive(Clone, Debug, Default)]
pub struct QueryResults {
    rows: Vec<QueryRow>,
}

impl QueryResults {
    pub(crate) fn from_tuples(tuples: Vec<TupleMatch>) -> Self {
        Self {
            rows: tuples.into_iter().map(QueryRow::from_tuple).collect(),
        }
    }

    /// All rows, in match enumeration order.
    #[must_use]
    pub fn rows(&self) -> &[QueryRow] {
        &self.rows
    }

    /// Number of matching rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the rows.
    pub fn iter(&self) -> impl Iterator<Item = &QueryRow> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResults {
    type Item = QueryRow;
    type IntoIter = std::vec::IntoIter<QueryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResults {
    type Item = &'a QueryRow;
    type IntoIter = std::slice::Iter<'a, QueryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
