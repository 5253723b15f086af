//! Integration tests for Layer 1: Storage
//!
//! Tests for facts, the handle store, and working memory.

mod facts;
