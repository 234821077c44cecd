//! Backend text → structured result records.
//!
//! Parsing never fails on malformed model output: bad lines are skipped and
//! counted so the request can report them. Only single-line story output,
//! which must yield exactly one line, turns an empty answer into an error.

use derive_getters::Getters;
use regex::Regex;
use scriptorium_core::{ResultRecord, cell_to_string};
use scriptorium_error::{BackendError, BackendErrorKind, PipelineError, PipelineErrorKind};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Row type tags a model may echo back in front of a translation.
const TYPE_TAGS: [&str; 11] = [
    "label",
    "desc",
    "title",
    "radio",
    "checkbox",
    "btn",
    "toggle",
    "option",
    "dropdown",
    "etc",
    "characterDialog",
];

/// Records parsed from one backend response plus the lines that were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct ParsedOutput {
    /// Parsed records in response order
    records: Vec<ResultRecord>,
    /// Non-blank lines that could not be parsed
    skipped_lines: usize,
}

impl ParsedOutput {
    /// Consume into records and skipped-line count.
    pub fn into_parts(self) -> (Vec<ResultRecord>, usize) {
        (self.records, self.skipped_lines)
    }
}

/// Render a JSON payload as text before parsing it.
///
/// Strings pass through unchanged; objects and arrays use their JSON form.
pub fn coerce_payload(payload: &JsonValue) -> String {
    cell_to_string(payload)
}

/// Parser for `key, [type,] translation` lines.
///
/// # Examples
///
/// ```
/// use scriptorium_pipeline::TranslationParser;
///
/// let parser = TranslationParser::new().unwrap();
/// let output = parser.parse("k1, label, Bonjour\nnot a record\nk2, Au revoir, mes amis", "fr");
///
/// assert_eq!(output.records().len(), 2);
/// assert_eq!(output.records()[0].field("fr"), Some("Bonjour"));
/// assert_eq!(output.records()[1].field("fr"), Some("Au revoir, mes amis"));
/// assert_eq!(*output.skipped_lines(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TranslationParser {
    type_tag: Regex,
}

impl TranslationParser {
    /// Compile the type-tag pattern.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in pattern does not compile.
    pub fn new() -> Result<Self, PipelineError> {
        let pattern = format!(r"(?i)^(?:{})\b\s*,?\s*", TYPE_TAGS.join("|"));
        let type_tag = Regex::new(&pattern).map_err(|e| {
            PipelineError::new(PipelineErrorKind::Configuration(format!(
                "Invalid type tag pattern: {}",
                e
            )))
        })?;
        Ok(Self { type_tag })
    }

    /// Remove a leading type tag and the delimiter after it.
    ///
    /// Tags only match as whole words, so `"Labelled"` is left alone.
    pub fn strip_type_tag<'a>(&self, value: &'a str) -> &'a str {
        match self.type_tag.find(value) {
            Some(found) => &value[found.end()..],
            None => value,
        }
    }

    /// Parse a response into `{ <language>: text }` records.
    pub fn parse(&self, text: &str, language: &str) -> ParsedOutput {
        let mut output = ParsedOutput::default();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((key, rest)) = line.split_once(',') else {
                debug!(line, "Skipping translation line without delimiter");
                output.skipped_lines += 1;
                continue;
            };
            let key = key.trim();
            let value = self.strip_type_tag(rest.trim()).trim();

            if key.is_empty() || value.is_empty() {
                debug!(line, "Skipping translation line with empty key or value");
                output.skipped_lines += 1;
                continue;
            }
            output
                .records
                .push(ResultRecord::new(key).with_field(language, value));
        }

        output
    }

    /// Parse a JSON payload, coercing it to text first.
    pub fn parse_value(&self, payload: &JsonValue, language: &str) -> ParsedOutput {
        self.parse(&coerce_payload(payload), language)
    }
}

/// Parse a multi-line script into `sceneId, seq, speaker, emotion, text` records.
///
/// Each line is split on `delimiter` into at most five fields. Lines with
/// fewer than five fields, or no content, are skipped. Content keeps any
/// further delimiters. A blank scene falls back to `fallback_scene`.
///
/// # Examples
///
/// ```
/// use scriptorium_pipeline::parse_script;
///
/// let output = parse_script("s1, 1, iroha, smile, Hi, there\n, b, mio, calm, Yo\nbroken, line", "s9", ',');
/// let records = output.records();
///
/// assert_eq!(records[0].key(), "s1_001");
/// assert_eq!(records[0].field("text"), Some("Hi, there"));
/// assert_eq!(records[1].key(), "s9_b");
/// assert_eq!(*output.skipped_lines(), 1);
/// ```
pub fn parse_script(text: &str, fallback_scene: &str, delimiter: char) -> ParsedOutput {
    let mut output = ParsedOutput::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.splitn(5, delimiter).map(str::trim).collect();
        let [scene, seq, speaker, emotion, content] = fields.as_slice() else {
            debug!(line, "Skipping script line with fewer than five fields");
            output.skipped_lines += 1;
            continue;
        };
        if content.is_empty() {
            debug!(line, "Skipping script line without content");
            output.skipped_lines += 1;
            continue;
        }

        let scene = if scene.is_empty() {
            fallback_scene.trim()
        } else {
            *scene
        };
        let key = match seq.parse::<u64>() {
            Ok(number) => format!("{}_{:03}", scene, number),
            Err(_) => format!("{}_{}", scene, seq),
        };

        output.records.push(
            ResultRecord::new(key)
                .with_field("sceneId", scene)
                .with_field("seq", *seq)
                .with_field("speaker", *speaker)
                .with_field("emotion", *emotion)
                .with_field("text", *content),
        );
    }

    output
}

/// Parse a single-line answer for the row `key`.
///
/// A leading `key,` echoed by the model is removed.
///
/// # Errors
///
/// Fails when nothing is left after trimming.
///
/// # Examples
///
/// ```
/// use scriptorium_pipeline::parse_single_line;
///
/// assert_eq!(parse_single_line("s1_001, Hello, you", "s1_001").unwrap(), "Hello, you");
/// assert_eq!(parse_single_line("Well, hello", "s1_001").unwrap(), "Well, hello");
/// assert!(parse_single_line("  \n", "s1_001").is_err());
/// ```
pub fn parse_single_line(text: &str, key: &str) -> Result<String, BackendError> {
    let text = text.trim();
    let key = key.trim();
    let line = match text.split_once(',') {
        Some((first, rest)) if !key.is_empty() && first.trim() == key => rest.trim(),
        _ => text,
    };
    if line.is_empty() {
        return Err(BackendError::new(BackendErrorKind::Parse(format!(
            "empty single-line output for key '{}'",
            key
        ))));
    }
    Ok(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags_match_whole_words_only() {
        let parser = TranslationParser::new().unwrap();
        assert_eq!(parser.strip_type_tag("BTN, OK"), "OK");
        assert_eq!(parser.strip_type_tag("characterDialog , Salut"), "Salut");
        assert_eq!(parser.strip_type_tag("Labelled box"), "Labelled box");
        assert_eq!(parser.strip_type_tag("option Oui"), "Oui");
    }

    #[test]
    fn key_without_value_is_skipped() {
        let parser = TranslationParser::new().unwrap();
        let output = parser.parse("k1, label\n\n , label, Bonjour\nk3, title, Titre", "fr");
        assert_eq!(output.records().len(), 1);
        assert_eq!(output.records()[0].key(), "k3");
        assert_eq!(*output.skipped_lines(), 2);
    }

    #[test]
    fn json_payload_is_coerced() {
        let parser = TranslationParser::new().unwrap();
        let output = parser.parse_value(&json!("k1, btn, OK"), "fr");
        assert_eq!(output.records()[0].field("fr"), Some("OK"));

        let output = parser.parse_value(&json!({"k1": "OK"}), "fr");
        assert!(output.records().is_empty());
        assert_eq!(*output.skipped_lines(), 1);
    }

    #[test]
    fn pipe_delimited_script_lines() {
        let output = parse_script("s2 | 12 | mio | angry | No, way | really", "", '|');
        let record = &output.records()[0];
        assert_eq!(record.key(), "s2_012");
        assert_eq!(record.field("speaker"), Some("mio"));
        assert_eq!(record.field("text"), Some("No, way | really"));
    }

    #[test]
    fn comma_script_keeps_pipes_in_content() {
        let output = parse_script("s1, 1, iroha, smile, Hi | there", "s1", ',');
        assert_eq!(*output.skipped_lines(), 0);
        assert_eq!(output.records()[0].key(), "s1_001");
        assert_eq!(output.records()[0].field("text"), Some("Hi | there"));
    }

    #[test]
    fn script_line_without_content_is_skipped() {
        let output = parse_script("s1, 1, iroha, smile, ", "s1", ',');
        assert!(output.records().is_empty());
        assert_eq!(*output.skipped_lines(), 1);
    }
}
