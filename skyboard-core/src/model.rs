use serde::{Deserialize, Serialize};
use std::fmt;

/// A named place used as a weather query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub name: String,
    /// ISO 3166 alpha-2 hint; only used for the record id, never sent to the provider.
    pub country: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), country: None }
    }

    pub fn with_country(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: Some(country.into()) }
    }

    /// Stable identity of any record fetched for this location.
    pub fn id(&self) -> String {
        match &self.country {
            Some(country) => format!("{}-{}", self.name, country),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}, {}", self.name, country),
            None => f.write_str(&self.name),
        }
    }
}

/// Current conditions for one successfully fetched location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub id: String,
    pub name: String,
    pub country_code: String,
    pub temperature_celsius: i32,
    pub condition_description: String,
    pub icon_id: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub utc_offset_seconds: i64,
}

impl WeatherRecord {
    pub fn icon_glyph(&self) -> &'static str {
        icon_glyph(&self.icon_id)
    }
}

/// Rounds a provider temperature half-up: 21.5 -> 22, -2.5 -> -2.
pub fn round_temperature(raw_celsius: f64) -> i32 {
    (raw_celsius + 0.5).floor() as i32
}

/// Language used for provider descriptions and user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Es,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Es => "es",
            Lang::En => "en",
        }
    }

    pub const fn all() -> &'static [Lang] {
        &[Lang::Es, Lang::En]
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Lang {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "es" => Ok(Lang::Es),
            "en" => Ok(Lang::En),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported languages: es, en.")),
        }
    }
}

/// Terminal glyph for an OpenWeather icon code such as `01d` or `10n`.
pub fn icon_glyph(icon_id: &str) -> &'static str {
    let night = icon_id.ends_with('n');
    match icon_id.get(..2) {
        Some("01") if night => "🌙",
        Some("01") => "☀️",
        Some("02") => "⛅",
        Some("03") | Some("04") => "☁️",
        Some("09") => "🌧️",
        Some("10") => "🌦️",
        Some("11") => "⛈️",
        Some("13") => "❄️",
        Some("50") => "🌫️",
        _ => "❔",
    }
}
