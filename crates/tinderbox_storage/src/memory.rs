//! The working memory: fact slots, versions, and the type index.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;

use tinderbox_foundation::{FactHandle, FieldId, Interner, Result, TypeId, Value};

use crate::fact::Fact;
use crate::handle_store::HandleStore;

/// One occupied slot in working memory.
#[derive(Clone, Debug)]
struct Slot {
    fact: Fact,
    version: u64,
}

/// The set of facts currently visible to the rule engine.
///
/// Facts are mutable in place; every update increments the fact's
/// version counter. A secondary index maps each type tag to the handles
/// of that type, maintained incrementally in insertion order.
///
/// The working memory owns an [`Interner`]; sessions seed it from the
/// rule base's interner so rule-referenced names resolve to the same
/// ids on both sides.
#[derive(Clone, Debug, Default)]
pub struct WorkingMemory {
    interner: Interner,
    handles: HandleStore,
    slots: Vec<Option<Slot>>,
    type_index: HashMap<TypeId, Vec<FactHandle>>,
}

impl WorkingMemory {
    /// Creates an empty working memory with a fresh interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty working memory seeded with an existing interner.
    #[must_use]
    pub fn with_interner(interner: Interner) -> Self {
        Self {
            interner,
            ..Self::default()
        }
    }

    /// Returns the interner.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns mutable access to the interner.
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    /// Inserts a fact, returning its handle. The fact starts at version 0.
    pub fn insert(&mut self, fact: Fact) -> FactHandle {
        let handle = self.handles.allocate();
        let idx = handle.index as usize;

        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }

        self.type_index
            .entry(fact.type_tag())
            .or_default()
            .push(handle);
        self.slots[idx] = Some(Slot { fact, version: 0 });

        handle
    }

    /// Applies a mutation to a fact and increments its version.
    ///
    /// # Errors
    /// `UnknownHandle` or `StaleHandle` if the handle is not live.
    pub fn update(&mut self, handle: FactHandle, mutate: impl FnOnce(&mut Fact)) -> Result<()> {
        self.handles.validate(handle)?;

        let slot = self.slots[handle.index as usize]
            .as_mut()
            .ok_or_else(|| tinderbox_foundation::Error::unknown_handle(handle))?;
        mutate(&mut slot.fact);
        slot.version += 1;

        Ok(())
    }

    /// Removes a fact from all indices, returning its final state.
    ///
    /// # Errors
    /// `UnknownHandle` or `StaleHandle` if the handle is not live.
    pub fn retract(&mut self, handle: FactHandle) -> Result<Fact> {
        self.handles.validate(handle)?;

        let slot = self.slots[handle.index as usize]
            .take()
            .ok_or_else(|| tinderbox_foundation::Error::unknown_handle(handle))?;

        if let Some(handles) = self.type_index.get_mut(&slot.fact.type_tag()) {
            handles.retain(|h| *h != handle);
        }
        self.handles.release(handle)?;

        Ok(slot.fact)
    }

    /// Returns a fact by handle.
    ///
    /// # Errors
    /// `UnknownHandle` or `StaleHandle` if the handle is not live.
    pub fn fact(&self, handle: FactHandle) -> Result<&Fact> {
        self.handles.validate(handle)?;
        self.slots[handle.index as usize]
            .as_ref()
            .map(|slot| &slot.fact)
            .ok_or_else(|| tinderbox_foundation::Error::unknown_handle(handle))
    }

    /// Returns a fact's version counter.
    ///
    /// # Errors
    /// `UnknownHandle` or `StaleHandle` if the handle is not live.
    pub fn version(&self, handle: FactHandle) -> Result<u64> {
        self.handles.validate(handle)?;
        self.slots[handle.index as usize]
            .as_ref()
            .map(|slot| slot.version)
            .ok_or_else(|| tinderbox_foundation::Error::unknown_handle(handle))
    }

    /// Reads a single field off a fact, cloning the value.
    ///
    /// # Errors
    /// Handle errors as for [`WorkingMemory::fact`]; `UnknownField` if the
    /// fact lacks the field.
    pub fn value(&self, handle: FactHandle, field: FieldId) -> Result<Value> {
        let fact = self.fact(handle)?;
        fact.get(field).cloned().ok_or_else(|| {
            let field_name = self.interner.field_name(field).unwrap_or("?").to_string();
            let type_name = self
                .interner
                .type_name(fact.type_tag())
                .unwrap_or("?")
                .to_string();
            tinderbox_foundation::Error::unknown_field(field_name, type_name)
        })
    }

    /// Returns true if the handle refers to a live fact.
    #[must_use]
    pub fn contains(&self, handle: FactHandle) -> bool {
        self.handles.exists(handle)
    }

    /// Handles of all live facts of the given type, in insertion order.
    #[must_use]
    pub fn facts_of_type(&self, type_tag: TypeId) -> &[FactHandle] {
        self.type_index
            .get(&type_tag)
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates over all live handles.
    pub fn handles(&self) -> impl Iterator<Item = FactHandle> + '_ {
        self.handles.iter()
    }

    /// Number of live facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no facts are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
