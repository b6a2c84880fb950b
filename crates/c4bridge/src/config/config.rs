use std::collections::HashMap;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;

use super::diagnostics::ConfigError;
use super::diagnostics::Diagnostic;
use super::diagnostics::SourceInfo;
use super::diagnostics::ValidationError;
use super::diagnostics::Warning;
use super::partial::PartialApiConfig;
use super::partial::PartialConfig;
use super::partial::PartialLoggingConfig;
use crate::integrations::control4::Control4Config;

pub const DEFAULT_API_PORT: u16 = 8565;

#[derive(Debug, Default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub integrations: IntegrationsConfig,
}

// LogLevel needs Deserialize because it's used in PartialLoggingConfig with toml::Spanned
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: LogLevel,

    /// Per-target levels, keyed by module path
    pub overrides: HashMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Build a subscriber filter from the default level and overrides
    pub fn filter(&self) -> Targets {
        Targets::new()
            .with_default(LevelFilter::from(self.level))
            .with_targets(
                self.overrides
                    .iter()
                    .map(|(target, level)| (target.clone(), LevelFilter::from(*level))),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub listen: IpAddr,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_API_PORT,
        }
    }
}

#[derive(Debug, Default)]
pub struct IntegrationsConfig {
    pub control4: Option<Control4Config>,
}

impl Config {
    /// Load and validate a TOML config file
    ///
    /// Returns the config along with any warnings. Every validation error in
    /// the file is reported together in `ConfigError::Invalid`.
    pub fn from_file(path: &Path) -> Result<(Self, Vec<Diagnostic>), ConfigError> {
        let partial = PartialConfig::from_file(path)?;
        Self::from_partial(partial)
    }

    /// Convert a PartialConfig to a Config, validating all fields
    pub fn from_partial(partial: PartialConfig) -> Result<(Self, Vec<Diagnostic>), ConfigError> {
        let mut diagnostics = Vec::new();
        let source = partial.source.as_ref();

        if partial.is_empty() {
            if let Some(source) = source {
                diagnostics.push(Diagnostic::Warning(Warning::EmptyConfig {
                    file_path: source.file_path.clone(),
                }));
            }
        }

        let logging = partial
            .logging
            .map(convert_logging)
            .unwrap_or_default();

        let api = match partial.api {
            Some(api) => match convert_api(api, source) {
                Ok(api) => api,
                Err(errors) => {
                    diagnostics.extend(errors.into_iter().map(Diagnostic::from));
                    ApiConfig::default()
                }
            },
            None => ApiConfig::default(),
        };

        let mut integrations = IntegrationsConfig::default();
        if let Some(control4) = partial.integrations.and_then(|i| i.control4) {
            match Control4Config::from_partial(control4, source) {
                Ok(control4) => {
                    if control4.entities.is_empty() {
                        diagnostics.push(Diagnostic::Warning(Warning::NoEntities {
                            field_path: "integrations.control4".to_string(),
                        }));
                    }
                    integrations.control4 = Some(control4);
                }
                Err(errors) => diagnostics.extend(errors.into_iter().map(Diagnostic::from)),
            }
        }

        if diagnostics.iter().any(|d| d.is_error()) {
            return Err(ConfigError::Invalid(diagnostics));
        }

        Ok((
            Config {
                logging,
                api,
                integrations,
            },
            diagnostics,
        ))
    }
}

fn convert_logging(partial: PartialLoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: partial.level.map(|s| *s.get_ref()).unwrap_or_default(),
        overrides: partial
            .overrides
            .map(|hm| hm.into_iter().map(|(k, v)| (k, *v.get_ref())).collect())
            .unwrap_or_default(),
    }
}

fn convert_api(
    partial: PartialApiConfig,
    source: Option<&SourceInfo>,
) -> Result<ApiConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let defaults = ApiConfig::default();

    let listen = match partial.listen {
        Some(listen) => match listen.get_ref().parse::<IpAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                errors.push(
                    ValidationError::new("api.listen", "listen must be an IP address")
                        .at(listen.span(), source),
                );
                defaults.listen
            }
        },
        None => defaults.listen,
    };

    let port = match partial.port {
        Some(port) => match u16::try_from(*port.get_ref()) {
            Ok(p) if p > 0 => p,
            _ => {
                errors.push(
                    ValidationError::new("api.port", "port must be between 1 and 65535")
                        .at(port.span(), source),
                );
                defaults.port
            }
        },
        None => defaults.port,
    };

    if errors.is_empty() {
        Ok(ApiConfig { listen, port })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::diagnostics::Error;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
[logging]
level = "warn"

[logging.overrides]
"c4bridge::integrations" = "debug"

[api]
listen = "0.0.0.0"
port = 9000

[integrations.control4]
scan_interval = 15

[[integrations.control4.lights]]
name = "Kitchen"
base_url = "http://10.0.0.5:9000/api"
proxy_id = 42
"#,
        );

        let (config, diagnostics) = Config::from_file(file.path()).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(
            config.logging.overrides.get("c4bridge::integrations"),
            Some(&LogLevel::Debug)
        );
        assert_eq!(config.api.listen, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.api.port, 9000);

        let control4 = config.integrations.control4.unwrap();
        assert_eq!(control4.scan_interval, Duration::from_secs(15));
        assert_eq!(control4.entities[0].id, "light.kitchen");
    }

    #[test]
    fn test_empty_config_warns() {
        let file = write_config("");
        let (config, diagnostics) = Config::from_file(file.path()).unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.api, ApiConfig::default());
        assert!(config.integrations.control4.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::Warning(Warning::EmptyConfig { .. })
        ));
    }

    #[test]
    fn test_control4_without_entities_warns() {
        let file = write_config("[integrations.control4]\n");
        let (config, diagnostics) = Config::from_file(file.path()).unwrap();

        assert!(config.integrations.control4.is_some());
        assert!(matches!(
            diagnostics[0],
            Diagnostic::Warning(Warning::NoEntities { .. })
        ));
    }

    #[test]
    fn test_errors_across_sections_reported_together() {
        let file = write_config(
            r#"
[api]
port = 70000

[[integrations.control4.climates]]
base_url = "http://c4/api"
proxy_id = 0
"#,
        );

        let err = Config::from_file(file.path()).unwrap_err();
        let ConfigError::Invalid(diagnostics) = &err else {
            panic!("expected validation failure, got {err:?}");
        };

        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::Error(Error::Validation(e)) => Some(e.field_path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            paths,
            ["api.port", "integrations.control4.climates[0].proxy_id"]
        );

        let rendered = err.to_string();
        assert!(rendered.contains("port must be between 1 and 65535"), "{rendered}");
        assert!(rendered.contains("proxy_id must be a positive integer"), "{rendered}");
    }

    #[test]
    fn test_bad_listen_address() {
        let file = write_config("[api]\nlisten = \"localhost\"\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("listen must be an IP address"));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[logging]\nlevel = \"loud\"\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn test_logging_filter() {
        let mut logging = LoggingConfig {
            level: LogLevel::Warn,
            overrides: HashMap::new(),
        };
        logging
            .overrides
            .insert("c4bridge::api".to_string(), LogLevel::Trace);

        let filter = logging.filter();
        assert!(filter.would_enable("c4bridge::api", &tracing::Level::TRACE));
        assert!(filter.would_enable("c4bridge::engine", &tracing::Level::WARN));
        assert!(!filter.would_enable("c4bridge::engine", &tracing::Level::INFO));
    }
}
