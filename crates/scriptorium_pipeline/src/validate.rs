//! Request checks that run before any external call.

use scriptorium_core::{BackendId, Destination, Table, is_plain_file_name, parse_table};
use scriptorium_error::{ValidationError, ValidationErrorKind};
use serde_json::Value as JsonValue;

pub(crate) fn require_table(raw: &JsonValue) -> Result<Table, ValidationError> {
    if raw.is_null() {
        return Err(ValidationError::new(ValidationErrorKind::MissingField(
            "data".to_string(),
        )));
    }
    let table = parse_table(raw);
    if table.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyTable));
    }
    Ok(table)
}

pub(crate) fn require_destination(
    destination_id: &str,
    collection_name: &str,
) -> Result<Destination, ValidationError> {
    if destination_id.trim().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyField(
            "sheetId".to_string(),
        )));
    }
    if collection_name.trim().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyField(
            "sheetName".to_string(),
        )));
    }
    Ok(Destination::new(destination_id.trim(), collection_name.trim()))
}

/// Trimmed, de-duplicated language codes in request order.
pub(crate) fn require_languages(languages: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut codes: Vec<String> = Vec::new();
    for code in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    if codes.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyList(
            "languages".to_string(),
        )));
    }
    Ok(codes)
}

pub(crate) fn backend_discriminator(
    discriminator: Option<&str>,
) -> Result<Option<BackendId>, ValidationError> {
    BackendId::parse_optional(discriminator).map_err(|e| {
        ValidationError::new(ValidationErrorKind::InvalidValue {
            field: "model".to_string(),
            reason: e.kind.to_string(),
        })
    })
}

/// Blank names are allowed unless `required`; anything else must be a plain file name.
pub(crate) fn prompt_file(name: &str, required: bool) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return if required {
            Err(ValidationError::new(ValidationErrorKind::EmptyField(
                "promptFile".to_string(),
            )))
        } else {
            Ok(())
        };
    }
    if !is_plain_file_name(name) {
        return Err(ValidationError::new(ValidationErrorKind::InvalidValue {
            field: "promptFile".to_string(),
            reason: format!("'{}' is not a plain file name", name),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_only_grid_is_empty_table() {
        let err = require_table(&json!([["key", "text"]])).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyTable);
        assert!(matches!(
            require_table(&JsonValue::Null).unwrap_err().kind,
            ValidationErrorKind::MissingField(_)
        ));
    }

    #[test]
    fn languages_are_trimmed_and_deduplicated() {
        let codes = require_languages(&[" fr".into(), "".into(), "fr".into(), "ja".into()]).unwrap();
        assert_eq!(codes, ["fr", "ja"]);
        assert!(require_languages(&["  ".into()]).is_err());
    }

    #[test]
    fn unknown_backend_is_a_validation_error() {
        assert_eq!(backend_discriminator(Some("GPT")).unwrap(), Some(BackendId::Gpt));
        assert_eq!(backend_discriminator(None).unwrap(), None);
        assert!(backend_discriminator(Some("llama")).is_err());
    }

    #[test]
    fn prompt_file_must_be_plain() {
        assert!(prompt_file("", false).is_ok());
        assert!(prompt_file("", true).is_err());
        assert!(prompt_file("../etc/passwd", false).is_err());
        assert!(prompt_file("translate.txt", true).is_ok());
    }
}
