//! Model configuration

use crate::error::{Error, Result};
use crate::kind::{DateFormat, DEFAULT_SHORT_TEXT_MAX_LEN};
use crate::names::{DisplayName, InternalName};
use crate::property::PropertySchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults applied when building schemas through the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Maximum length of short-text properties
    #[serde(default = "default_short_text_max_len")]
    pub short_text_max_len: usize,

    /// Display format of date-time properties
    #[serde(default)]
    pub date_format: DateFormat,

    /// Require identifier-style internal names
    #[serde(default)]
    pub require_identifier_names: bool,
}

fn default_short_text_max_len() -> usize {
    DEFAULT_SHORT_TEXT_MAX_LEN
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            short_text_max_len: default_short_text_max_len(),
            date_format: DateFormat::default(),
            require_identifier_names: false,
        }
    }
}

impl ModelConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded model config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Short-text property using the configured maximum length
    pub fn short_text(&self, name: impl Into<String>) -> Result<PropertySchema> {
        PropertySchema::short_text_with_max_len(name, self.short_text_max_len)
    }

    /// Date-time property using the configured display format
    pub fn date_time(&self, name: impl Into<String>) -> Result<PropertySchema> {
        PropertySchema::date_time(name, self.date_format)
    }

    /// Build an internal name, enforcing identifier style when configured
    pub fn internal_name(&self, raw: impl Into<String>) -> Result<InternalName> {
        let name = InternalName::new(raw)?;
        if self.require_identifier_names && !name.is_identifier() {
            return Err(Error::InvalidArgument(format!(
                "internal name '{}' is not an identifier",
                name
            )));
        }
        Ok(name)
    }

    /// Derive the internal name from a display name
    pub fn derive_internal_name(&self, display: &DisplayName) -> Result<InternalName> {
        let derived = InternalName::derive_from(display)?;
        self.internal_name(String::from(derived))
    }
}
