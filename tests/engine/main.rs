//! Integration tests for Layer 2: Engine
//!
//! Tests for rules, truth maintenance, the agenda, and queries.

mod agenda;
mod queries;
