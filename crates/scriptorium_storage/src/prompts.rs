//! Prompt templates on disk.

use async_trait::async_trait;
use derive_getters::Getters;
use scriptorium_core::is_plain_file_name;
use scriptorium_interface::PromptTemplateLoader;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Loads prompt templates by plain file name from one directory.
///
/// Names that are not plain file names (path separators, `..`) never
/// resolve, so a request cannot read outside the prompt directory.
#[derive(Debug, Clone, Getters)]
pub struct FilePromptLoader {
    directory: PathBuf,
}

impl FilePromptLoader {
    /// Loader rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    async fn read(&self, name: &str) -> Option<String> {
        if !is_plain_file_name(name) {
            warn!(name, "Refusing prompt name that is not a plain file name");
            return None;
        }
        let path = self.directory.join(name.trim());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                debug!(path = %path.display(), "Loaded prompt template");
                Some(content)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Prompt template not readable");
                None
            }
        }
    }
}

#[async_trait]
impl PromptTemplateLoader for FilePromptLoader {
    async fn load(&self, name: &str, fallback: Option<&str>) -> String {
        let mut content = self.read(name).await;
        if content.is_none() {
            if let Some(fallback) = fallback {
                content = self.read(fallback).await;
            }
        }
        content.unwrap_or_else(|| {
            warn!(name, ?fallback, "No prompt template found");
            String::new()
        })
    }
}
