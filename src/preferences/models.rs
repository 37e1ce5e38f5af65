use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::PreferenceError;
use crate::units::TemperatureUnit;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl FromStr for Theme {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(PreferenceError::UnknownTheme(other.to_owned())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

/// User display and refresh settings, persisted as one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Seconds between live snapshot regenerations.
    pub refresh_interval: u64,
    pub temperature_unit: TemperatureUnit,
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL_SECS,
            temperature_unit: TemperatureUnit::Celsius,
            theme: Theme::Light,
            notifications: true,
        }
    }
}

impl Preferences {
    /// Rebuild preferences from a persisted record, field by field.
    ///
    /// Each recognised field overrides its default only when it holds a
    /// usable value. Unknown fields are ignored and a record that is not a
    /// JSON object yields the defaults. Unknown unit strings resolve to
    /// Celsius.
    pub fn from_stored(value: &Value) -> Self {
        let mut prefs = Self::default();
        let Some(record) = value.as_object() else {
            return prefs;
        };

        if let Some(secs) = record.get("refreshInterval").and_then(parse_interval) {
            prefs.refresh_interval = secs;
        }
        if let Some(unit) = record.get("temperatureUnit").and_then(Value::as_str) {
            prefs.temperature_unit = TemperatureUnit::from_stored(unit);
        }
        if let Some(theme) = record
            .get("theme")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
        {
            prefs.theme = theme;
        }
        if let Some(enabled) = record.get("notifications").and_then(Value::as_bool) {
            prefs.notifications = enabled;
        }

        prefs
    }

    /// Interval between regenerations, falling back to the default when the
    /// stored value is zero.
    pub fn refresh_period(&self) -> Duration {
        effective_refresh_interval(self.refresh_interval)
    }
}

/// Accept a positive integer number of seconds, or a string holding one.
fn parse_interval(value: &Value) -> Option<u64> {
    let secs = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (secs > 0).then_some(secs)
}

pub fn effective_refresh_interval(secs: u64) -> Duration {
    if secs == 0 {
        Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS)
    } else {
        Duration::from_secs(secs)
    }
}

/// Check an interval supplied by a user before it reaches the store.
pub fn validate_refresh_interval(secs: i64) -> Result<u64, PreferenceError> {
    u64::try_from(secs)
        .ok()
        .filter(|&s| s > 0)
        .ok_or(PreferenceError::InvalidRefreshInterval(secs))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let p = Preferences::default();
        assert_eq!(p.refresh_interval, 10);
        assert_eq!(p.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(p.theme, Theme::Light);
        assert!(p.notifications);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "refreshInterval": 10,
                "temperatureUnit": "celsius",
                "theme": "light",
                "notifications": true,
            })
        );
    }

    #[test]
    fn stored_record_round_trips() {
        let prefs = Preferences {
            refresh_interval: 60,
            temperature_unit: TemperatureUnit::Fahrenheit,
            theme: Theme::Dark,
            notifications: false,
        };
        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(Preferences::from_stored(&value), prefs);
    }

    #[test]
    fn partial_record_merges_over_defaults() {
        let p = Preferences::from_stored(&json!({ "theme": "dark", "legacyField": 1 }));
        assert_eq!(p.theme, Theme::Dark);
        assert_eq!(p.refresh_interval, 10);
        assert!(p.notifications);
    }

    #[test]
    fn invalid_fields_keep_defaults() {
        let p = Preferences::from_stored(&json!({
            "refreshInterval": -5,
            "theme": "neon",
            "notifications": "yes",
            "temperatureUnit": 3,
        }));
        assert_eq!(p, Preferences::default());

        let p = Preferences::from_stored(&json!({ "refreshInterval": 0 }));
        assert_eq!(p.refresh_interval, 10);
    }

    #[test]
    fn string_interval_is_accepted() {
        let p = Preferences::from_stored(&json!({ "refreshInterval": "30" }));
        assert_eq!(p.refresh_interval, 30);
    }

    #[test]
    fn unknown_unit_falls_back_to_celsius() {
        let p = Preferences::from_stored(&json!({ "temperatureUnit": "kelvin" }));
        assert_eq!(p.temperature_unit, TemperatureUnit::Celsius);
    }

    #[test]
    fn non_object_record_yields_defaults() {
        assert_eq!(Preferences::from_stored(&json!([1, 2])), Preferences::default());
        assert_eq!(Preferences::from_stored(&Value::Null), Preferences::default());
    }

    #[test]
    fn zero_interval_falls_back_to_default_period() {
        assert_eq!(effective_refresh_interval(0), Duration::from_secs(10));
        assert_eq!(effective_refresh_interval(30), Duration::from_secs(30));
    }

    #[test]
    fn validate_refresh_interval_rejects_non_positive() {
        assert_eq!(validate_refresh_interval(5).unwrap(), 5);
        assert!(matches!(
            validate_refresh_interval(0),
            Err(PreferenceError::InvalidRefreshInterval(0))
        ));
        assert!(validate_refresh_interval(-10).is_err());
    }

    #[test]
    fn theme_parses_strictly() {
        assert_eq!("system".parse::<Theme>().unwrap(), Theme::System);
        assert!("neon".parse::<Theme>().is_err());
    }
}
