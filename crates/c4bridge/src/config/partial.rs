use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::diagnostics::ConfigError;
use super::diagnostics::SourceInfo;
use super::LogLevel;
use crate::integrations::control4::PartialControl4Config;

/// Config file as written, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub logging: Option<PartialLoggingConfig>,
    pub api: Option<PartialApiConfig>,
    pub integrations: Option<PartialIntegrationsConfig>,

    /// Source information for error reporting (not serialized)
    #[serde(skip)]
    pub source: Option<SourceInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialLoggingConfig {
    pub level: Option<toml::Spanned<LogLevel>>,
    pub overrides: Option<HashMap<String, toml::Spanned<LogLevel>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialApiConfig {
    pub listen: Option<toml::Spanned<String>>,
    pub port: Option<toml::Spanned<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialIntegrationsConfig {
    pub control4: Option<PartialControl4Config>,
}

impl PartialConfig {
    /// Load a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, content)
    }

    /// Parse config text, remembering where it came from for diagnostics
    pub fn parse(path: &Path, content: String) -> Result<Self, ConfigError> {
        let mut config: PartialConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.source = Some(SourceInfo {
            file_path: path.to_path_buf(),
            content,
        });

        Ok(config)
    }

    /// True when the file sets nothing at all
    pub fn is_empty(&self) -> bool {
        self.logging.is_none() && self.api.is_none() && self.integrations.is_none()
    }
}
