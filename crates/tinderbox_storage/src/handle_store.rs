//! Fact handle lifecycle management with generational indices.
//!
//! The `HandleStore` allocates fact handles and tracks generations to
//! detect stale references to retracted facts.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use tinderbox_foundation::{Error, FactHandle, Result};

/// Manages fact handle allocation and generation tracking.
///
/// Handles are allocated from a free list when available, otherwise new
/// indices are allocated. When a fact is retracted, its index is added to
/// the free list and its generation is incremented. Even generations are
/// free, odd generations are live.
#[derive(Debug, Clone, Default)]
pub struct HandleStore {
    /// Generation counter per slot index.
    generations: Vec<u32>,
    /// Free list of indices available for reuse.
    free_list: Vec<u64>,
    /// Count of live facts.
    live_count: usize,
}

impl HandleStore {
    /// Creates a new empty handle store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a handle for a newly inserted fact.
    pub fn allocate(&mut self) -> FactHandle {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            // Was even/free, now odd/live
            self.generations[idx] += 1;
            FactHandle::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u64;
            self.generations.push(1);
            FactHandle::new(index, 1)
        }
    }

    /// Releases a handle after its fact is retracted.
    ///
    /// # Errors
    /// Returns an error if the handle is stale or was never allocated.
    pub fn release(&mut self, handle: FactHandle) -> Result<()> {
        self.validate(handle)?;

        let idx = handle.index as usize;
        // Was odd/live, now even/free
        self.generations[idx] += 1;
        self.free_list.push(handle.index);
        self.live_count -= 1;

        Ok(())
    }

    /// Checks whether a handle refers to a live fact.
    #[must_use]
    pub fn exists(&self, handle: FactHandle) -> bool {
        let idx = handle.index as usize;
        if idx >= self.generations.len() {
            return false;
        }
        self.generations[idx] == handle.generation && handle.generation % 2 == 1
    }

    /// Validates that a handle is live.
    ///
    /// # Errors
    /// `UnknownHandle` if the slot was never allocated or is free,
    /// `StaleHandle` if the generation does not match.
    pub fn validate(&self, handle: FactHandle) -> Result<()> {
        let idx = handle.index as usize;

        if idx >= self.generations.len() {
            return Err(Error::unknown_handle(handle));
        }

        let current = self.generations[idx];

        if current != handle.generation {
            // Fact was retracted and the slot possibly reused
            return Err(Error::stale_handle(handle));
        }

        if current % 2 == 0 {
            return Err(Error::unknown_handle(handle));
        }

        Ok(())
    }

    /// Returns the number of live facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live handles.
    pub fn iter(&self) -> impl Iterator<Item = FactHandle> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, generation)| *generation % 2 == 1)
            .map(|(idx, generation)| FactHandle::new(idx as u64, *generation))
    }
}
