//! Destination store error types.

/// Kinds of destination store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Reading the destination failed
    #[display("Failed to read destination: {}", _0)]
    Read(String),
    /// Writing the destination failed
    #[display("Failed to write destination: {}", _0)]
    Write(String),
    /// Store answered with a non-success status
    #[display("Store API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// The store has no credential configured
    #[display("Missing store credentials: set {}", _0)]
    MissingCredentials(String),
    /// Destination identifiers cannot be addressed
    #[display("Invalid destination: {}", _0)]
    InvalidDestination(String),
}

/// Store error with location tracking.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::Read("sheet not found".to_string()));
/// assert!(format!("{}", err).contains("sheet not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
