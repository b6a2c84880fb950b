use std::collections::HashSet;
use std::num::NonZeroU32;
use std::time::Duration;

use c4bridge_client::Endpoint;
use c4bridge_client::DEFAULT_TIMEOUT;
use serde::Deserialize;
use url::Url;

use crate::config::SourceInfo;
use crate::config::ValidationError;

/// Poll period when `scan_interval` is not set
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// `[integrations.control4]` as written
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialControl4Config {
    pub scan_interval: Option<toml::Spanned<i64>>,
    #[serde(default)]
    pub lights: Vec<PartialEntityConfig>,
    #[serde(default)]
    pub climates: Vec<PartialEntityConfig>,
    #[serde(default)]
    pub alarm_panels: Vec<PartialEntityConfig>,
    #[serde(default)]
    pub media_players: Vec<PartialEntityConfig>,
}

/// One `[[integrations.control4.<kind>]]` entry as written
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialEntityConfig {
    pub name: Option<toml::Spanned<String>>,
    pub base_url: Option<toml::Spanned<String>>,
    pub proxy_id: Option<toml::Spanned<i64>>,
    pub timeout: Option<toml::Spanned<i64>>,
    /// Alarm panels only
    pub schema: Option<toml::Spanned<AlarmSchema>>,
    /// Media players only
    pub output_zone: Option<toml::Spanned<i64>>,
}

/// How an alarm panel exposes its arming state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSchema {
    /// One "1"/"0" variable per arming state
    #[default]
    Flags,
    /// A single variable holding the mode name
    Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Light,
    Climate,
    AlarmControlPanel,
    MediaPlayer,
}

impl Platform {
    /// Prefix of entity IDs on this platform
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Climate => "climate",
            Self::AlarmControlPanel => "alarm_control_panel",
            Self::MediaPlayer => "media_player",
        }
    }

    fn default_name(self) -> &'static str {
        match self {
            Self::Light => "Control4 Light",
            Self::Climate => "Control4 Climate",
            Self::AlarmControlPanel => "Control4 Alarm",
            Self::MediaPlayer => "Control4 Media",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Light,
    Climate,
    AlarmPanel { schema: AlarmSchema },
    MediaPlayer { output_zone: Option<NonZeroU32> },
}

/// A validated Control4 entity
#[derive(Debug, Clone)]
pub struct EntityConfig {
    pub id: String,
    pub name: String,
    pub endpoint: Endpoint,
    pub kind: EntityKind,
}

/// Validated `[integrations.control4]`
#[derive(Debug, Clone)]
pub struct Control4Config {
    pub scan_interval: Duration,
    pub entities: Vec<EntityConfig>,
}

const PREFIX: &str = "integrations.control4";

impl Control4Config {
    /// Validate every entity, collecting all problems rather than stopping at
    /// the first.
    pub fn from_partial(
        partial: PartialControl4Config,
        source: Option<&SourceInfo>,
    ) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let scan_interval = match &partial.scan_interval {
            Some(value) => match positive(value, &format!("{PREFIX}.scan_interval"), source) {
                Ok(secs) => Duration::from_secs(secs.get().into()),
                Err(e) => {
                    errors.push(e);
                    DEFAULT_SCAN_INTERVAL
                }
            },
            None => DEFAULT_SCAN_INTERVAL,
        };

        let sections = [
            ("lights", Platform::Light, partial.lights),
            ("climates", Platform::Climate, partial.climates),
            ("alarm_panels", Platform::AlarmControlPanel, partial.alarm_panels),
            ("media_players", Platform::MediaPlayer, partial.media_players),
        ];

        let mut entities = Vec::new();
        let mut seen = HashSet::new();
        for (section, platform, entries) in sections {
            for (index, entry) in entries.into_iter().enumerate() {
                let field_path = format!("{PREFIX}.{section}[{index}]");
                let name_span = entry.name.as_ref().map(|n| n.span());
                match validate_entity(&field_path, platform, entry, source) {
                    Ok(entity) => {
                        if !seen.insert(entity.id.clone()) {
                            let mut e = ValidationError::new(
                                format!("{field_path}.name"),
                                format!("duplicate entity ID '{}'", entity.id),
                            );
                            if let Some(span) = name_span {
                                e = e.at(span, source);
                            }
                            errors.push(e);
                        } else {
                            entities.push(entity);
                        }
                    }
                    Err(e) => errors.extend(e),
                }
            }
        }

        if errors.is_empty() {
            Ok(Self {
                scan_interval,
                entities,
            })
        } else {
            Err(errors)
        }
    }
}

fn validate_entity(
    field_path: &str,
    platform: Platform,
    partial: PartialEntityConfig,
    source: Option<&SourceInfo>,
) -> Result<EntityConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = partial
        .name
        .as_ref()
        .map(|n| n.get_ref().clone())
        .unwrap_or_else(|| platform.default_name().to_string());
    let slug = slugify(&name);
    if slug.is_empty() {
        let mut e = ValidationError::new(
            format!("{field_path}.name"),
            "name must contain at least one letter or digit",
        );
        if let Some(n) = &partial.name {
            e = e.at(n.span(), source);
        }
        errors.push(e);
    }

    let base_url = match &partial.base_url {
        Some(value) => match Url::parse(value.get_ref()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
            Ok(url) => {
                errors.push(
                    ValidationError::new(
                        format!("{field_path}.base_url"),
                        format!("unsupported URL scheme '{}'", url.scheme()),
                    )
                    .at(value.span(), source),
                );
                None
            }
            Err(err) => {
                errors.push(
                    ValidationError::new(
                        format!("{field_path}.base_url"),
                        format!("invalid URL: {err}"),
                    )
                    .at(value.span(), source),
                );
                None
            }
        },
        None => {
            errors.push(ValidationError::new(
                format!("{field_path}.base_url"),
                "base_url is required",
            ));
            None
        }
    };

    let proxy_id = match &partial.proxy_id {
        Some(value) => positive(value, &format!("{field_path}.proxy_id"), source)
            .map_err(|e| errors.push(e))
            .ok(),
        None => {
            errors.push(ValidationError::new(
                format!("{field_path}.proxy_id"),
                "proxy_id is required",
            ));
            None
        }
    };

    let timeout = match &partial.timeout {
        Some(value) => positive(value, &format!("{field_path}.timeout"), source)
            .map(|secs| Duration::from_secs(secs.get().into()))
            .map_err(|e| errors.push(e))
            .ok(),
        None => Some(DEFAULT_TIMEOUT),
    };

    if let Some(schema) = &partial.schema {
        if platform != Platform::AlarmControlPanel {
            errors.push(
                ValidationError::new(
                    format!("{field_path}.schema"),
                    "schema only applies to alarm panels",
                )
                .at(schema.span(), source),
            );
        }
    }

    let output_zone = match &partial.output_zone {
        Some(value) if platform != Platform::MediaPlayer => {
            errors.push(
                ValidationError::new(
                    format!("{field_path}.output_zone"),
                    "output_zone only applies to media players",
                )
                .at(value.span(), source),
            );
            None
        }
        Some(value) => positive(value, &format!("{field_path}.output_zone"), source)
            .map_err(|e| errors.push(e))
            .ok(),
        None => None,
    };

    let kind = match platform {
        Platform::Light => EntityKind::Light,
        Platform::Climate => EntityKind::Climate,
        Platform::AlarmControlPanel => EntityKind::AlarmPanel {
            schema: partial
                .schema
                .as_ref()
                .map(|s| *s.get_ref())
                .unwrap_or_default(),
        },
        Platform::MediaPlayer => EntityKind::MediaPlayer { output_zone },
    };

    match (base_url, proxy_id, timeout) {
        (Some(base_url), Some(proxy_id), Some(timeout)) if errors.is_empty() => {
            let endpoint = Endpoint::new(base_url, proxy_id.get(), timeout).map_err(|e| {
                vec![ValidationError::new(field_path.to_string(), e.to_string())]
            })?;
            Ok(EntityConfig {
                id: format!("{}.{}", platform.as_str(), slug),
                name,
                endpoint,
                kind,
            })
        }
        _ => Err(errors),
    }
}

/// Accept integers in `1..=u32::MAX`
fn positive(
    value: &toml::Spanned<i64>,
    field_path: &str,
    source: Option<&SourceInfo>,
) -> Result<NonZeroU32, ValidationError> {
    u32::try_from(*value.get_ref())
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            let field = field_path.rsplit('.').next().unwrap_or(field_path);
            ValidationError::new(field_path, format!("{field} must be a positive integer"))
                .at(value.span(), source)
        })
}

/// Lowercase `name`, collapsing every run of other characters into `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
