//! HIR tests
//!
//! Tests for:
//! - Java type cache memoization and invalidation
//! - Hierarchy loading and member shadowing
//! - Template validation

pub mod tests_cache;
pub mod tests_diagnostics;
