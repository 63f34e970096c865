use torvault_core_types::RequestId;
use thiserror::Error;

/// Result type alias using RestoreError
pub type Result<T> = std::result::Result<T, RestoreError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (UI, CLI, tests) can
/// match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,
    InvalidTransition,
    /// Stored data contradicts itself (checksum mismatch, digest collision)
    ConstraintViolation,

    // Planning
    /// No manifest is recorded for the requested backup run
    SnapshotNotFound,
    /// The live client could not enumerate categories, tags or torrents
    LiveStateUnavailable,
    /// Manifest violates its own invariants (duplicate or empty hashes, bad JSON)
    InvalidManifest,
    /// A blob referenced by a stored manifest is absent from the blob store
    MissingBlob,

    // Execution
    /// A single mutation failed; recorded in the result, never raised
    OperationFailed,
    /// Cancelled before any work started
    Cancelled,
    Timeout,
    Concurrency,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidTransition => "ERR_INVALID_TRANSITION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::SnapshotNotFound => "ERR_SNAPSHOT_NOT_FOUND",
            ExErrorKind::LiveStateUnavailable => "ERR_LIVE_STATE_UNAVAILABLE",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::MissingBlob => "ERR_MISSING_BLOB",
            ExErrorKind::OperationFailed => "ERR_OPERATION_FAILED",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a caller may reasonably retry the failed request unchanged
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExErrorKind::LiveStateUnavailable | ExErrorKind::Timeout | ExErrorKind::Concurrency
        )
    }
}

/// Canonical structured error type
///
/// Classification fields support programmatic handling; the optional
/// context fields are for debugging and log correlation.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (run id, torrent hash, category or tag name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Typed failures raised by the pure restore core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RestoreError {
    /// Two manifest items share the same hash
    #[error("Manifest contains duplicate torrent hash: {hash}")]
    DuplicateHash { hash: String },

    /// A manifest item has an empty hash
    #[error("Manifest item '{name}' has an empty hash")]
    EmptyHash { name: String },

    /// A manifest category has an empty name
    #[error("Manifest contains a category with an empty name")]
    EmptyCategoryName,

    /// Restore session transition not permitted from the current state
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition { state: String, action: String },

    /// JSON encoding/decoding failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<RestoreError> for ExError {
    fn from(err: RestoreError) -> Self {
        match err {
            RestoreError::DuplicateHash { hash } => ExError::new(ExErrorKind::InvalidManifest)
                .with_entity_id(hash)
                .with_op("validate_manifest")
                .with_message("Manifest contains duplicate torrent hash"),

            RestoreError::EmptyHash { name } => ExError::new(ExErrorKind::InvalidManifest)
                .with_entity_id(name)
                .with_op("validate_manifest")
                .with_message("Manifest item has an empty hash"),

            RestoreError::EmptyCategoryName => ExError::new(ExErrorKind::InvalidManifest)
                .with_op("validate_manifest")
                .with_message("Manifest contains a category with an empty name"),

            RestoreError::InvalidTransition { state, action } => {
                ExError::new(ExErrorKind::InvalidTransition)
                    .with_op(action.clone())
                    .with_message(format!("Cannot {} while session is {}", action, state))
            }

            RestoreError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for RestoreError {
    fn from(err: serde_json::Error) -> Self {
        RestoreError::Serialization {
            message: err.to_string(),
        }
    }
}
