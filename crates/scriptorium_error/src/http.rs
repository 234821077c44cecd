//! Server transport failures.

/// The HTTP listener could not bind or stopped serving.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// Transport failure description
    pub message: String,
    /// Line number where the error was raised
    pub line: u32,
    /// File where the error was raised
    pub file: &'static str,
}

impl HttpError {
    /// Record a transport failure at the caller's location.
    ///
    /// ```
    /// use scriptorium_error::HttpError;
    ///
    /// let err = HttpError::new("Failed to bind 0.0.0.0:8080: address in use");
    /// assert!(err.message.contains("0.0.0.0:8080"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
