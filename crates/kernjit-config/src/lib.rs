//! Configuration system for kernjit.
//!
//! Load code generation settings from TOML or YAML so optimisation level,
//! verification and symbol naming can change without code changes.
//!
//! # Examples
//!
//! ```
//! use kernjit_config::{JitConfig, OptLevel};
//!
//! let config = JitConfig::from_toml_str(r#"
//!     opt_level = "speed_and_size"
//!     symbol_prefix = "blend"
//!     capture_ir = true
//! "#).unwrap();
//!
//! assert_eq!(config.opt_level, OptLevel::SpeedAndSize);
//! assert_eq!(config.symbol_prefix, "blend");
//! assert!(config.enable_verifier);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use kernjit_config::JitConfig;
//!
//! let config = JitConfig::load("kernjit.toml").unwrap_or_default();
//! assert_eq!(config.symbol_prefix, "kernel");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix used for generated symbol names when none is configured.
pub const DEFAULT_SYMBOL_PREFIX: &str = "kernel";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Code generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JitConfig {
    /// Cranelift optimisation level.
    #[serde(default)]
    pub opt_level: OptLevel,

    /// Run the IR verifier on every compiled function.
    #[serde(default = "default_true")]
    pub enable_verifier: bool,

    /// Prefix for generated symbol names (`<prefix>_<n>`).
    #[serde(default = "default_symbol_prefix")]
    pub symbol_prefix: String,

    /// Keep the textual IR of each function for diagnostics.
    #[serde(default)]
    pub capture_ir: bool,
}

fn default_true() -> bool {
    true
}

fn default_symbol_prefix() -> String {
    DEFAULT_SYMBOL_PREFIX.to_string()
}

impl Default for JitConfig {
    fn default() -> Self {
        Self {
            opt_level: OptLevel::default(),
            enable_verifier: true,
            symbol_prefix: default_symbol_prefix(),
            capture_ir: false,
        }
    }
}

impl JitConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the optimisation level.
    pub fn with_opt_level(mut self, opt_level: OptLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    /// Enables or disables the IR verifier.
    pub fn with_verifier(mut self, enabled: bool) -> Self {
        self.enable_verifier = enabled;
        self
    }

    /// Sets the symbol prefix.
    pub fn with_symbol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.symbol_prefix = prefix.into();
        self
    }

    /// Enables or disables IR capture.
    pub fn with_capture_ir(mut self, enabled: bool) -> Self {
        self.capture_ir = enabled;
        self
    }

    /// Checks that the symbol prefix is a usable identifier.
    ///
    /// The prefix must be non-empty, start with an ASCII letter or `_`, and
    /// contain only ASCII alphanumerics and `_`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.symbol_prefix.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid(format!(
                "symbol_prefix {:?} is not an identifier",
                self.symbol_prefix
            )));
        }
        Ok(())
    }
}

/// Cranelift optimisation level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptLevel {
    /// No optimisation.
    None,

    /// Optimise for execution speed.
    #[default]
    Speed,

    /// Optimise for speed and code size.
    SpeedAndSize,
}

impl OptLevel {
    /// Value of the Cranelift `opt_level` setting.
    pub fn as_setting(self) -> &'static str {
        match self {
            OptLevel::None => "none",
            OptLevel::Speed => "speed",
            OptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}
