//! Cross-layer integration tests for Tinderbox
//!
//! End-to-end scenarios exercising facts, rules, agenda groups, queries,
//! and stateless execution together.

mod discount_flow;
