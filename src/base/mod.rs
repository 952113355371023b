//! Foundation types for the Qute analysis engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Byte positions in a template
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`TextEdit`], [`WorkspaceEdit`] - Edits returned to the editor
//! - [`Cancelled`] - Cooperative cancellation
//!
//! This module has NO dependencies on other qute modules.

mod cancel;
mod edit;
mod span;

pub use cancel::{Cancelled, check_cancelled};
pub use edit::{DocumentEdit, TextEdit, WorkspaceEdit};
pub use span::{LineCol, LineColRange, LineIndex, TextRange, TextSize};

// Re-export so callers share one cancellation type
pub use tokio_util::sync::CancellationToken;
