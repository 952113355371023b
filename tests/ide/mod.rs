//! IDE feature tests
//!
//! Tests for:
//! - Code completion
//! - Inlay hints
//! - Quick fixes
//! - Hover information
//! - Go to definition

pub mod tests_code_actions;
pub mod tests_completion;
pub mod tests_goto;
pub mod tests_hover;
pub mod tests_inlay_hints;
