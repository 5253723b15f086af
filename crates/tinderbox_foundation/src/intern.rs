//! Interning for fact type tags and field names.
//!
//! Type tags and field names are interned to enable fast equality
//! comparison in the matching hot path. The interner is clone-able: a
//! session's working memory starts from a clone of the rule base's
//! interner, so every name a rule references resolves to the same id in
//! both places.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned fact type tag.
///
/// Facts are polymorphic over a type identifier plus structural field
/// access, not over an inheritance hierarchy.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Returns the raw index of this type tag.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Interned field name.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldId(pub(crate) u32);

impl FieldId {
    /// Returns the raw index of this field name.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldId({})", self.0)
    }
}

/// Interner for fact type tags and field names.
///
/// Not thread-safe; use external synchronization if needed. Interning the
/// same string twice returns the same id, and ids survive cloning.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interner {
    /// Type tag storage.
    types: Vec<Arc<str>>,
    /// Map from type tag string to id.
    type_map: HashMap<Arc<str>, TypeId>,
    /// Field name storage.
    fields: Vec<Arc<str>>,
    /// Map from field name string to id.
    field_map: HashMap<Arc<str>, FieldId>,
}

impl Interner {
    /// Creates a new empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a fact type tag, returning its id.
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern_type(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.type_map.get(name) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.types.push(Arc::clone(&name));
        self.type_map.insert(name, id);
        id
    }

    /// Interns a field name, returning its id.
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern_field(&mut self, name: &str) -> FieldId {
        if let Some(id) = self.field_map.get(name) {
            return *id;
        }
        let id = FieldId(self.fields.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.fields.push(Arc::clone(&name));
        self.field_map.insert(name, id);
        id
    }

    /// Looks up a previously interned type tag.
    #[must_use]
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.type_map.get(name).copied()
    }

    /// Looks up a previously interned field name.
    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_map.get(name).copied()
    }

    /// Returns the string for a type id.
    #[must_use]
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.types.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the string for a field id.
    #[must_use]
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.fields.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Number of interned type tags.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of interned field names.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
