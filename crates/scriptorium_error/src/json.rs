//! Malformed request payloads.

/// A request body or CLI request file that is not the JSON a pipeline expects.
///
/// Raised before any generation call; the HTTP surface answers it with 400.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Malformed JSON: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// What was wrong with the payload
    pub message: String,
    /// Line number where the error was raised
    pub line: u32,
    /// File where the error was raised
    pub file: &'static str,
}

impl JsonError {
    /// Record a payload problem at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use scriptorium_error::JsonError;
    ///
    /// let err = JsonError::new("missing field `targetLanguages`");
    /// assert!(err.message.contains("targetLanguages"));
    /// assert!(format!("{}", err).starts_with("Malformed JSON"));
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
