//! Type-tagged fact payloads.
//!
//! A fact is an opaque payload with a type tag and structural field
//! access. Fields live in a persistent map, so snapshots handed to
//! listeners and query rows are O(1) clones.

use tinderbox_foundation::{FieldId, TypeId, Value};

/// Field storage for a fact.
pub type FieldMap = im::HashMap<FieldId, Value>;

/// A typed, mutable fact payload.
///
/// The type tag is fixed at construction; only fields mutate. Working
/// memory tracks a version counter per inserted fact, incremented on
/// every update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fact {
    type_tag: TypeId,
    fields: FieldMap,
}

impl Fact {
    /// Creates an empty fact of the given type.
    #[must_use]
    pub fn new(type_tag: TypeId) -> Self {
        Self {
            type_tag,
            fields: FieldMap::new(),
        }
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, field: FieldId, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Returns this fact's type tag.
    #[must_use]
    pub const fn type_tag(&self) -> TypeId {
        self.type_tag
    }

    /// Returns a field value, if present.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Sets a field value.
    pub fn set(&mut self, field: FieldId, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, field: FieldId) -> Option<Value> {
        self.fields.remove(&field)
    }

    /// Returns true if the fact has the given field.
    #[must_use]
    pub fn has(&self, field: FieldId) -> bool {
        self.fields.contains_key(&field)
    }

    /// Iterates over all fields.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldId, &Value)> {
        self.fields.iter()
    }

    /// Number of fields on this fact.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the fact has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
