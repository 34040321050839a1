use thiserror::Error;

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Errors that can occur while collecting node compliance data
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Version string has no `major.minor` prefix
    #[error("malformed version string: {0:?}")]
    MalformedVersion(String),

    /// Bundled spec assets for the platform are missing
    #[error("failed to load spec catalog for platform {platform:?}: {reason}")]
    CatalogLoad {
        /// Platform whose spec directory was requested
        platform: String,
        /// Why loading failed
        reason: String,
    },

    /// A spec document does not have the expected shape
    #[error("failed to parse spec {source_name:?}: {reason}")]
    SpecParse {
        /// File name of the offending document
        source_name: String,
        /// Parser message
        reason: String,
    },

    /// Parameter defaults, key mapping or version mapping is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// A host lookup failed while probing parameters
    #[error("probe failed: {0}")]
    ProbeFailure(String),

    /// A shell command could not be run or exited non-zero
    #[error("command {command:?} failed: {reason}")]
    Shell {
        /// The command line handed to the shell
        command: String,
        /// Exit status and stderr, or the spawn error
        reason: String,
    },

    /// An audit command of the selected spec failed
    #[error("audit {key:?} failed: {reason}")]
    AuditCommand {
        /// Collector key of the failing entry
        key: String,
        /// Underlying failure
        reason: String,
    },

    /// The node's live configuration could not be obtained
    #[error("live configuration unavailable: {0}")]
    LiveConfigUnavailable(String),

    /// The overall run exceeded its deadline
    #[error("collection did not finish within {0} seconds; increase --timeout")]
    DeadlineExceeded(u64),

    /// API server rejected the credentials
    #[error("authentication failed: API server rejected the credentials")]
    Unauthorized,

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CollectorError {
    /// Build an I/O error tagged with the path that caused it
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the run can continue after this error.
    ///
    /// Probe failures fall back to defaults and a missing live
    /// configuration leaves the probed values in place.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProbeFailure(_) | Self::LiveConfigUnavailable(_)
        )
    }
}
