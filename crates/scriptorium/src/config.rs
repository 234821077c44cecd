//! Layered application configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`scriptorium.toml` shipped with the crate)
//! 2. `~/.config/scriptorium/scriptorium.toml`
//! 3. `./scriptorium.toml`
//! 4. Environment variables `SCRIPTORIUM__<SECTION>__<KEY>`, e.g.
//!    `SCRIPTORIUM__PIPELINE__BATCH_SIZE=50`
//!
//! Credentials are not configuration: backends and the Sheets store read
//! theirs from the environment.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use derive_builder::Builder;
use derive_getters::Getters;
use scriptorium_error::{ConfigError, ScriptoriumError, ScriptoriumResult};
use scriptorium_models::ModelsConfig;
use scriptorium_pipeline::PipelineConfig;
use scriptorium_storage::SheetsSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../scriptorium.toml");

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_prompt_directory() -> PathBuf {
    PathBuf::from("prompts")
}

/// `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to
    #[serde(default = "default_bind")]
    bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl ServerSettings {
    /// Settings binding to `bind`.
    pub fn new(bind: impl Into<String>) -> Self {
        Self { bind: bind.into() }
    }
}

/// `[prompts]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PromptSettings {
    /// Directory prompt templates are loaded from
    #[serde(default = "default_prompt_directory")]
    directory: PathBuf,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            directory: default_prompt_directory(),
        }
    }
}

impl PromptSettings {
    /// Settings reading templates from `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// Complete application configuration.
///
/// # Examples
///
/// ```
/// use scriptorium::{PromptSettings, ScriptoriumConfig};
///
/// let config = ScriptoriumConfig::builder()
///     .prompts(PromptSettings::new("/srv/prompts"))
///     .build()
///     .unwrap();
/// assert_eq!(config.server().bind(), "0.0.0.0:8080");
/// assert_eq!(config.pipeline().batch_size().get(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters, Builder)]
#[builder(default, setter(into))]
pub struct ScriptoriumConfig {
    /// HTTP server settings
    #[serde(default)]
    server: ServerSettings,
    /// Prompt template settings
    #[serde(default)]
    prompts: PromptSettings,
    /// Pipeline tuning
    #[serde(default)]
    pipeline: PipelineConfig,
    /// Per-backend model settings
    #[serde(default)]
    models: ModelsConfig,
    /// Google Sheets endpoint
    #[serde(default)]
    sheets: SheetsSettings,
}

impl ScriptoriumConfig {
    /// Builder with every section at its default.
    pub fn builder() -> ScriptoriumConfigBuilder {
        ScriptoriumConfigBuilder::default()
    }

    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled file is invalid.
    pub fn defaults() -> ScriptoriumResult<Self> {
        Self::finish(Self::bundled())
    }

    /// Bundled defaults overridden by one file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, malformed or holds invalid values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ScriptoriumResult<Self> {
        debug!("Loading configuration from file");
        Self::finish(Self::bundled().add_source(File::from(path.as_ref())))
    }

    /// Load with the full precedence chain.
    ///
    /// User files are optional and skipped when absent.
    ///
    /// # Errors
    ///
    /// Fails if any present source is malformed or the result holds invalid values.
    #[instrument]
    pub fn load() -> ScriptoriumResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        let mut builder = Self::bundled();
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/scriptorium/scriptorium.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }
        builder = builder
            .add_source(File::with_name("scriptorium").required(false))
            .add_source(
                Environment::with_prefix("SCRIPTORIUM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    fn bundled() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> ScriptoriumResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                ScriptoriumError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ScriptoriumError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.pipeline.validate()?;
        Ok(config)
    }
}
