use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use treetype_engine::io::{DEFAULT_MIN_LINES, DEFAULT_OUTPUT_ROOT, DEFAULT_WARN_LINES};
use treetype_engine::lines::DEFAULT_INDENT_WIDTH;
use treetype_engine::{EncodeOptions, ProcessOptions, SourceLimits, SyntaxErrorPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value in config file at {config_path}: {message}")]
    InvalidValue {
        config_path: PathBuf,
        message: String,
    },
}

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documents go to `<output_root>/<language>/<file_stem>.json`.
    pub output_root: PathBuf,
    /// Files with fewer lines are rejected.
    pub min_lines: usize,
    /// Files with more lines are encoded with a warning.
    pub warn_lines: usize,
    pub indent_width: usize,
    /// Fail files that contain syntax errors instead of encoding them.
    pub reject_syntax_errors: bool,
    pub split_markup_text: bool,
    pub fill_whitespace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            min_lines: DEFAULT_MIN_LINES,
            warn_lines: DEFAULT_WARN_LINES,
            indent_width: DEFAULT_INDENT_WIDTH,
            reject_syntax_errors: false,
            split_markup_text: true,
            fill_whitespace: true,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.indent_width == 0 {
            return Err(ConfigError::InvalidValue {
                config_path: config_path.to_path_buf(),
                message: "indent_width must be at least 1".to_string(),
            });
        }

        // Expand shell variables and tilde in the output root
        config.output_root = Self::expand_path(&config.output_root).unwrap_or(config.output_root);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads `config_path`, or the default location when `None`, falling back
    /// to defaults when the file does not exist.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Ok(loaded.unwrap_or_default())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/treetype");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    pub fn encode_options(&self, verify: bool) -> EncodeOptions {
        EncodeOptions {
            indent_width: self.indent_width,
            syntax_errors: if self.reject_syntax_errors {
                SyntaxErrorPolicy::Reject
            } else {
                SyntaxErrorPolicy::Tolerate
            },
            split_markup_text: self.split_markup_text,
            fill_whitespace: self.fill_whitespace,
            verify,
        }
    }

    pub fn source_limits(&self) -> SourceLimits {
        SourceLimits {
            min_lines: self.min_lines,
            warn_lines: self.warn_lines,
        }
    }

    pub fn process_options(&self, verify: bool) -> ProcessOptions {
        ProcessOptions {
            encode: self.encode_options(verify),
            limits: self.source_limits(),
            output_root: self.output_root.clone(),
        }
    }
}
