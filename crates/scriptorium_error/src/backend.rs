//! Generation backend error types.

/// Specific error conditions raised by generation backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum BackendErrorKind {
    /// The credential a backend needs is not configured
    #[display("Missing credentials for {}: set {}", backend, variable)]
    MissingCredentials {
        /// Backend discriminator (gpt, gemini, claude)
        backend: String,
        /// Environment variable that carries the credential
        variable: String,
    },
    /// The backend discriminator does not name a known backend
    #[display("Unsupported backend: {}", _0)]
    UnsupportedBackend(String),
    /// Transport-level failure talking to the provider
    #[display("Request failed: {}", _0)]
    Http(String),
    /// Provider answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or provider message
        message: String,
    },
    /// Provider response could not be decoded
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Provider answered but produced no usable text
    #[display("No text returned from {}", _0)]
    EmptyResponse(String),
    /// Request DTO could not be assembled
    #[display("Builder error: {}", _0)]
    Builder(String),
}

impl BackendErrorKind {
    /// Whether a caller could reasonably try the call again.
    ///
    /// Credential and selection problems never succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            BackendErrorKind::Http(_) => true,
            _ => false,
        }
    }
}

/// Backend error with location tracking.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{BackendError, BackendErrorKind};
///
/// let err = BackendError::new(BackendErrorKind::UnsupportedBackend("llama".into()));
/// assert!(format!("{}", err).contains("Unsupported backend: llama"));
/// assert!(!err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backend Error: {} at line {} in {}", kind, line, file)]
pub struct BackendError {
    /// The specific error condition
    pub kind: BackendErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
