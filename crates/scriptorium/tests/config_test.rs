//! Configuration layering tests.

use scriptorium::{BackendId, ScriptoriumConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn bundled_defaults_match_code_defaults() {
    let bundled = ScriptoriumConfig::defaults().unwrap();
    assert_eq!(bundled, ScriptoriumConfig::default());
}

#[test]
fn file_overrides_only_what_it_names() {
    let file = toml_file(
        r#"
[server]
bind = "127.0.0.1:9000"

[pipeline]
batch_size = 50
default_backend = "claude"

[models.claude]
model = "claude-sonnet-4-5"
"#,
    );

    let config = ScriptoriumConfig::from_file(file.path()).unwrap();

    assert_eq!(config.server().bind(), "127.0.0.1:9000");
    assert_eq!(config.pipeline().batch_size().get(), 50);
    assert_eq!(*config.pipeline().default_backend(), BackendId::Claude);
    assert_eq!(*config.pipeline().max_concurrency(), 4);
    assert_eq!(config.models().claude().model(), "claude-sonnet-4-5");
    assert_eq!(*config.models().claude().max_tokens(), 4096);
    assert_eq!(config.models().gemini().model(), "gemini-2.5-flash");
}

#[test]
fn zero_batch_size_is_rejected() {
    let file = toml_file("[pipeline]\nbatch_size = 0\n");
    let err = ScriptoriumConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse configuration"), "{}", err);
}

#[test]
fn zero_concurrency_is_rejected() {
    let file = toml_file("[pipeline]\nmax_concurrency = 0\n");
    let err = ScriptoriumConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("max_concurrency"), "{}", err);
}

#[test]
fn missing_file_is_an_error() {
    assert!(ScriptoriumConfig::from_file("/nonexistent/scriptorium.toml").is_err());
}
