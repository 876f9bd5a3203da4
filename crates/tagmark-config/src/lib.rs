//! Configuration management for tagmark.
//!
//! Parses `tagmark.toml` files with serde and auto-discovers them in the
//! current directory and its parents.
//!
//! ```toml
//! [markdown]
//! tables = true
//! footnotes = true
//!
//! [context]
//! file = "data/site.json"
//! values = { site = { name = "Docs" } }
//!
//! [components.Note]
//! element = "aside"
//! class = "note"
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagmark.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the context JSON file.
    pub context_file: Option<PathBuf>,
    /// Override markdown conversion (`false` writes text unchanged).
    pub markdown_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Markdown engine settings.
    pub markdown: MarkdownConfig,
    /// Render context sources.
    context: ContextConfigRaw,
    /// Alias components keyed by tag name.
    pub components: BTreeMap<String, AliasConfig>,

    /// Context file resolved against the config directory (set after loading).
    #[serde(skip)]
    pub context_file: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown engine settings.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Convert text nodes as `CommonMark`; `false` writes them unchanged.
    pub enabled: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tables: true,
            strikethrough: true,
            footnotes: false,
            tasklists: false,
            smart_punctuation: false,
        }
    }
}

/// Raw context configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContextConfigRaw {
    file: Option<String>,
    values: Map<String, Value>,
}

/// Component that renders a tag as another element.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasConfig {
    /// Element name to emit.
    pub element: String,
    /// Class added to the emitted element.
    #[serde(default)]
    pub class: Option<String>,
    /// Copy the tag's attributes onto the emitted element.
    #[serde(default = "default_forward_attributes")]
    pub forward_attributes: bool,
}

fn default_forward_attributes() -> bool {
    true
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Context file is not valid JSON.
    #[error("Context JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `tagmark.toml` in the current directory and parents, falling back
    /// to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or parsing or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Relative paths are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.context_file = config.context.file.as_deref().map(|f| base_dir.join(f));
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(context_file) = &settings.context_file {
            self.context_file = Some(context_file.clone());
        }
        if let Some(enabled) = settings.markdown_enabled {
            self.markdown.enabled = enabled;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an alias component has no element
    /// name or an element name with whitespace or markup characters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (tag, alias) in &self.components {
            let field = format!("components.{tag}.element");
            if alias.element.is_empty() {
                return Err(ConfigError::Validation(format!("{field} cannot be empty")));
            }
            if alias
                .element
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
            {
                return Err(ConfigError::Validation(format!(
                    "{field} is not a valid element name: {:?}",
                    alias.element
                )));
            }
        }
        Ok(())
    }

    /// Build the render context.
    ///
    /// Reads the context file (if any) and merges the inline `[context.values]`
    /// table over its top-level keys. Returns an empty object when neither is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns error if the context file cannot be read or is not valid JSON.
    pub fn load_context(&self) -> Result<Value, ConfigError> {
        let mut context = match &self.context_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                    path: path.clone(),
                    source,
                })?
            }
            None => Value::Object(Map::new()),
        };

        if !self.context.values.is_empty() {
            match &mut context {
                Value::Object(map) => {
                    for (key, value) in &self.context.values {
                        map.insert(key.clone(), value.clone());
                    }
                }
                _ => {
                    return Err(ConfigError::Validation(
                        "context.values requires the context file to hold a JSON object"
                            .to_owned(),
                    ));
                }
            }
        }

        Ok(context)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        Self::discover_from(&mut current)
    }

    fn discover_from(current: &mut PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}
