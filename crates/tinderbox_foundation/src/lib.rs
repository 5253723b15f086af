//! Core types, values, and errors for Tinderbox.
//!
//! This crate provides:
//! - [`Value`] - The value type for fact fields and variable bindings
//! - [`FactHandle`] - Generational handles identifying facts in working memory
//! - [`Interner`] - Interning for fact type tags and field names
//! - [`Error`] - Rich error types for the whole engine

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod handle;
mod intern;
mod value;

pub use error::{Error, ErrorKind, Result};
pub use handle::FactHandle;
pub use intern::{FieldId, Interner, TypeId};
pub use value::Value;
