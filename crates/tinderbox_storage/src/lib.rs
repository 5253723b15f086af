//! Working memory (fact store) for Tinderbox.
//!
//! This crate provides:
//! - [`Fact`] - A type-tagged, structurally accessed payload
//! - [`HandleStore`] - Generational handle allocation
//! - [`WorkingMemory`] - The mutable fact store with a type index

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod fact;
mod handle_store;
mod memory;

pub use fact::Fact;
pub use handle_store::HandleStore;
pub use memory::WorkingMemory;
