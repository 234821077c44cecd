//! Request validation error types.

/// Specific reasons a request is rejected before any external call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A required field is absent
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// A required field is present but blank
    #[display("Field '{}' must not be empty", _0)]
    EmptyField(String),
    /// A required list has no usable entries
    #[display("Field '{}' must contain at least one entry", _0)]
    EmptyList(String),
    /// The row table has no data rows after the header
    #[display("Row table must contain a header row and at least one data row")]
    EmptyTable,
    /// A field holds a value outside its accepted domain
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidValue {
        /// The offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::EmptyField("destinationId".into()));
/// assert!(format!("{}", err).contains("destinationId"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The specific validation failure
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
