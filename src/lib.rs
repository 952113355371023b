//! # qute-ls-core
//!
//! Language intelligence for Qute templates: completion, inlay hints,
//! quick fixes, hover, definition and diagnostics, resolved against the
//! Java data model of the host project.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → IDE features (completion, inlay hints, code actions, hover)
//!   ↓
//! hir     → Java data model, type cache, scope and type inference
//!   ↓
//! syntax  → Tolerant template parser producing the node arena
//!   ↓
//! base    → Primitives (TextRange, LineCol, edits, cancellation)
//! ```

/// Foundation types: TextRange, LineCol, edits, cancellation
pub mod base;

/// Java side of a template: type cache, accessibility, type inference
pub mod hir;

/// IDE features: completion, inlay hints, code actions, hover, goto-definition
pub mod ide;

/// Template parser and node model
pub mod syntax;

// Re-export new foundation types
pub use base::{CancellationToken, Cancelled, LineCol, LineColRange, LineIndex, TextRange, TextSize};
