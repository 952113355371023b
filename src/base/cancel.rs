//! Cooperative cancellation.
//!
//! Every traversal that may recurse through templates or type hierarchies
//! takes a `&CancellationToken` and calls [`check_cancelled`] on entry.
//! Cancellation travels as `Err(Cancelled)` through `?`, so a cancelled
//! request never publishes a partial result.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The request was cancelled by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("request cancelled")]
pub struct Cancelled;

/// Returns `Err(Cancelled)` once `token` has been cancelled.
#[inline]
pub fn check_cancelled(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}
