//! Generational fact handles.
//!
//! A [`FactHandle`] identifies a fact in working memory. Handles carry a
//! generation counter so that a handle kept after its fact was retracted
//! is detected as stale rather than silently resolving to a reused slot.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a fact in working memory.
///
/// Assigned on insertion and stable for the life of the fact. After the
/// fact is retracted, the handle becomes stale and all operations on it
/// fail with [`crate::ErrorKind::StaleHandle`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactHandle {
    /// Slot index in the working memory.
    pub index: u64,
    /// Generation at allocation time. Odd generations are live.
    pub generation: u32,
}

impl FactHandle {
    /// Creates a handle from raw parts.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Debug for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactHandle({}v{})", self.index, self.generation)
    }
}
