//! Configuration structures for the model registry and the serializer.
//!
//! - [`RegistryConfig`] - How strictly type declarations are checked
//! - [`WireConfig`] - What the serializer emits and how documents are printed
//! - [`Config`] - Root configuration combining both
//!
//! Every struct is `#[serde(default)]`, so a configuration file only needs
//! the keys it changes.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the model-type registry.
///
/// # Examples
///
/// ```
/// use mg_core::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert!(config.strict_abstract);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject abstract types declared below a concrete parent.
    ///
    /// When `false`, such declarations are accepted and logged as warnings.
    pub strict_abstract: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_abstract: true,
        }
    }
}

/// Configuration for the wire serializer.
///
/// # Examples
///
/// ```
/// use mg_core::WireConfig;
///
/// let config = WireConfig::default();
/// assert!(!config.include_defaults);
/// assert!(config.pretty);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Also emit stored properties that resolve to a default.
    ///
    /// Generated defaults are materialized into the instance, exactly as a
    /// read would.
    pub include_defaults: bool,

    /// Pretty-print JSON documents.
    pub pretty: bool,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            include_defaults: false,
            pretty: true,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use mg_core::Config;
///
/// let config = Config::from_json_str(r#"{"wire": {"include_defaults": true}}"#).unwrap();
/// assert!(config.wire.include_defaults);
/// assert!(config.registry.strict_abstract);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry configuration.
    pub registry: RegistryConfig,

    /// Serializer configuration.
    pub wire: WireConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if `path` does not exist,
    /// [`ConfigError::Io`] if it cannot be read, and [`ConfigError::Parse`]
    /// if it is not valid configuration JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_owned()));
        }
        let contents = std::fs::read_to_string(path.as_std_path())?;
        Self::from_json_str(&contents)
    }
}
