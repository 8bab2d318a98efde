use thiserror::Error;

/// Errors raised when the renderer is driven before its collaborators are in place.
///
/// These indicate a caller bug (wrong call order), not a runtime condition worth retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecyclerError {
    /// No layout manager was assigned before preparing the viewability tracker.
    #[error("layout manager is not set")]
    MissingLayoutManager,

    /// Viewport dimensions were not provided.
    #[error("viewport dimensions are not set")]
    MissingDimensions,

    /// Render stack params were not provided.
    #[error("render stack params are not set")]
    MissingParams,

    /// The viewability tracker does not exist yet; `init` has not run.
    #[error("renderer is not initialized")]
    NotInitialized,
}

/// Result type for renderer operations.
pub type Result<T> = core::result::Result<T, RecyclerError>;
