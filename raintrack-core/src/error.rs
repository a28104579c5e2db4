use thiserror::Error;

/// Why a reading had to be synthesized instead of fetched.
///
/// The `Display` text is what the user sees as the non-fatal warning next to
/// the fallback values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackReason {
    #[error("API key not configured")]
    CredentialsMissing,

    #[error("API returned {0}. Using fallback data.")]
    UpstreamStatus(u16),

    #[error("transport exception: {0}")]
    Transport(String),

    #[error("response malformed: {0}")]
    Malformed(String),
}

/// Failure while reading or writing persisted tracker state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access state file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode rain-day state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
