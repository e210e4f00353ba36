//! Resource viewer errors

/// Errors produced while building or caching resource graphs
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    #[error("No queryer set")]
    NoQueryerConfigured,

    #[error("Failed to fetch children of {key}: {source}")]
    ChildLookup {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Context cancelled")]
    Cancelled,

    #[error("Failed to resolve path for {key}: {source}")]
    ObjectPath {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStore(#[source] anyhow::Error),

    #[error("Visitor failed: {0}")]
    Visit(#[source] anyhow::Error),

    #[error("Resolution task ended without reporting a result")]
    ResolutionDropped,

    #[error("Resolution of {key} failed: {message}")]
    ResolutionFailed { key: String, message: String },

    #[error("Entry for {0} was invalidated during resolution")]
    Invalidated(String),
}

impl ViewerError {
    /// Whether this error came from cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ViewerError::Cancelled)
    }
}

/// Result type for resource viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
