use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_DECIMALS: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Resolve a persisted unit string.
    ///
    /// Anything other than `"fahrenheit"` displays as Celsius. Celsius is the
    /// unit readings are kept in, so an unrecognised value never alters the
    /// number shown, only the suffix.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Celsius)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "celsius" => Ok(Self::Celsius),
            "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(UnknownUnit(other.to_owned())),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown temperature unit: {0:?}")]
pub struct UnknownUnit(pub String);

/// Convert a Celsius value into `unit`.
pub fn convert(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Render a Celsius value in `unit` with one decimal, e.g. `"72.3°F"`.
pub fn to_display(celsius: f64, unit: TemperatureUnit) -> String {
    format_temperature(celsius, unit, DEFAULT_DECIMALS)
}

pub fn format_temperature(celsius: f64, unit: TemperatureUnit, decimals: usize) -> String {
    format!("{:.*}{}", decimals, convert(celsius, unit), unit.symbol())
}
