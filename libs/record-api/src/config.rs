use std::path::Path;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::Schema;

/// Largest accepted fixed offset, exclusive (one day).
const MAX_OFFSET_SECONDS: i32 = 86_400;

// ═══════════════════════════════════════════════════════════════
//  Time zone
// ═══════════════════════════════════════════════════════════════

/// Zone in which epoch seconds are rendered for date/time columns.
///
/// TOML: `time_zone = "local"`, `time_zone = "utc"` or
/// `time_zone = { offset_seconds = 3600 }`. The tagged form
/// `{ fixed = { offset_seconds = 3600 } }` is read as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TimeZoneRepr", into = "TimeZoneRepr")]
pub enum TimeZoneSetting {
    /// The process's local zone (`TZ`).
    #[default]
    Local,
    Utc,
    /// East of UTC, in seconds.
    Fixed { offset_seconds: i32 },
}

impl TimeZoneSetting {
    /// Offset in effect at the given instant.
    pub fn offset_at(&self, instant: &DateTime<Utc>) -> FixedOffset {
        match self {
            TimeZoneSetting::Local => Local.offset_from_utc_datetime(&instant.naive_utc()).fix(),
            TimeZoneSetting::Utc => Utc.fix(),
            TimeZoneSetting::Fixed { offset_seconds } => {
                FixedOffset::east_opt(*offset_seconds).unwrap_or_else(|| Utc.fix())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            TimeZoneSetting::Fixed { offset_seconds }
                if offset_seconds.abs() >= MAX_OFFSET_SECONDS =>
            {
                Err(ConfigError::Invalid(format!(
                    "time_zone offset {offset_seconds}s out of range (must be within ±{MAX_OFFSET_SECONDS}s)"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TimeZoneRepr {
    Named(NamedZone),
    Offset { offset_seconds: i32 },
    Tagged { fixed: FixedRepr },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NamedZone {
    Local,
    Utc,
}

#[derive(Serialize, Deserialize)]
struct FixedRepr {
    offset_seconds: i32,
}

impl From<TimeZoneRepr> for TimeZoneSetting {
    fn from(repr: TimeZoneRepr) -> Self {
        match repr {
            TimeZoneRepr::Named(NamedZone::Local) => TimeZoneSetting::Local,
            TimeZoneRepr::Named(NamedZone::Utc) => TimeZoneSetting::Utc,
            TimeZoneRepr::Offset { offset_seconds }
            | TimeZoneRepr::Tagged {
                fixed: FixedRepr { offset_seconds },
            } => TimeZoneSetting::Fixed { offset_seconds },
        }
    }
}

impl From<TimeZoneSetting> for TimeZoneRepr {
    fn from(zone: TimeZoneSetting) -> Self {
        match zone {
            TimeZoneSetting::Local => TimeZoneRepr::Named(NamedZone::Local),
            TimeZoneSetting::Utc => TimeZoneRepr::Named(NamedZone::Utc),
            TimeZoneSetting::Fixed { offset_seconds } => TimeZoneRepr::Offset { offset_seconds },
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Mapper Config
// ═══════════════════════════════════════════════════════════════

/// Per-record-type mapper settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub time_zone: TimeZoneSetting,
}

impl MapperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.time_zone.validate()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Record Config
// ═══════════════════════════════════════════════════════════════

/// Full record-type configuration file.
///
/// ```toml
/// [mapper]
/// time_zone = "utc"
///
/// [[schema.fields]]
/// name = "born_on"
/// field_type = { name = "date" }
///
/// [[schema.fields]]
/// name = "password"
/// field_type = { name = "string" }
/// props = { virtual = true }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub mapper: MapperConfig,
    pub schema: Schema,
}

impl RecordConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RecordConfig = toml::from_str(s)?;
        config.mapper.validate().map_err(|e| e.with_context("mapper"))?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|e| e.with_context(path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_zone() {
        let config = RecordConfig::from_toml_str("").unwrap();
        assert_eq!(config.mapper.time_zone, TimeZoneSetting::Local);
        assert!(config.schema.fields.is_empty());
    }

    #[test]
    fn parses_schema_and_zone() {
        let config = RecordConfig::from_toml_str(
            r#"
            [mapper]
            time_zone = { offset_seconds = -18000 }

            [[schema.fields]]
            name = "created_at"
            field_type = { name = "datetime" }

            [[schema.fields]]
            name = "password"
            field_type = { name = "string" }
            props = { virtual = true }
            "#,
        )
        .unwrap();

        assert_eq!(
            config.mapper.time_zone,
            TimeZoneSetting::Fixed { offset_seconds: -18000 }
        );
        assert_eq!(config.schema.fields.len(), 2);
        assert_eq!(config.schema.fields[0].field_type.name, "datetime");
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let err = RecordConfig::from_toml_str(
            r#"
            [mapper]
            time_zone = { offset_seconds = 90000 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.starts_with("mapper:")));
    }

    #[test]
    fn utc_string_form() {
        let config = RecordConfig::from_toml_str("[mapper]\ntime_zone = \"utc\"\n").unwrap();
        assert_eq!(config.mapper.time_zone, TimeZoneSetting::Utc);
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(config.mapper.time_zone.offset_at(&epoch).local_minus_utc(), 0);
    }

    #[test]
    fn tagged_fixed_offset_form() {
        let config = RecordConfig::from_toml_str(
            "[mapper]\ntime_zone = { fixed = { offset_seconds = 3600 } }\n",
        )
        .unwrap();
        assert_eq!(config.mapper.time_zone, TimeZoneSetting::Fixed { offset_seconds: 3600 });

        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(config.mapper.time_zone.offset_at(&epoch).local_minus_utc(), 3600);
    }

    #[test]
    fn rejects_unknown_zone_name() {
        assert!(matches!(
            RecordConfig::from_toml_str("[mapper]\ntime_zone = \"mars\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RecordConfig::from_path("/nonexistent/record.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.ends_with("record.toml")));
    }
}
