use thiserror::Error;

/// Errors raised by journey operations that can legitimately be refused.
///
/// Reward application, progress tracking and reconciliation are total and never return
/// these; only admin edits, imports and mode transitions do.
#[derive(Debug, Error)]
pub enum JourneyError {
    /// Returned when an edit targets a record id that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Admin-only operation attempted without an admin session or outside the admin surface.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Input rejected by an admin edit (empty title, out-of-range difficulty, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Mode transition not allowed from the current screen.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Wrapper around JSON errors from import/export bundles.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
