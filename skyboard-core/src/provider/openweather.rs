use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::WeatherError,
    model::{Lang, Location, WeatherRecord, round_temperature},
};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Real offsets stay within -12h..+14h; anything past 26h is a broken payload.
const MAX_UTC_OFFSET_SECONDS: i64 = 26 * 3600;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    lang: Lang,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            api_key: config.api_key().ok().map(str::to_owned),
            base_url: config.base_url().trim_end_matches('/').to_owned(),
            lang: config.lang,
            http,
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::Credential)
    }

    async fn fetch_current(&self, location: &Location) -> Result<WeatherRecord, WeatherError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        debug!(location = %location, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location.name.as_str()),
                ("appid", api_key),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(classify_failure(location, status, &body));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherError::Transport(format!("Failed to parse OpenWeather current JSON: {e}"))
        })?;

        parsed.into_record(location)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    timezone: i64,
}

impl OwCurrentResponse {
    fn into_record(self, location: &Location) -> Result<WeatherRecord, WeatherError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Transport(format!(
                "OpenWeather response for '{}' contained no weather data",
                location.name
            ))
        })?;

        if !(-MAX_UTC_OFFSET_SECONDS..=MAX_UTC_OFFSET_SECONDS).contains(&self.timezone) {
            return Err(WeatherError::Transport(format!(
                "OpenWeather response for '{}' has out-of-range timezone offset {}",
                location.name, self.timezone
            )));
        }

        Ok(WeatherRecord {
            id: location.id(),
            name: self.name,
            country_code: self.sys.country.unwrap_or_default(),
            temperature_celsius: round_temperature(self.main.temp),
            condition_description: condition.description,
            icon_id: condition.icon,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            utc_offset_seconds: self.timezone,
        })
    }
}

/// Error body OpenWeather sends with non-2xx responses. `cod` is a string or a number.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    cod: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
}

fn classify_failure(location: &Location, status: StatusCode, body: &str) -> WeatherError {
    let error_body = serde_json::from_str::<OwErrorBody>(body).ok();

    let cod_is_404 = error_body.as_ref().is_some_and(|b| match &b.cod {
        serde_json::Value::String(s) => s == "404",
        serde_json::Value::Number(n) => n.as_u64() == Some(404),
        _ => false,
    });

    if status == StatusCode::NOT_FOUND || cod_is_404 {
        return WeatherError::NotFound(location.name.clone());
    }

    let detail = error_body
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate_body(body));

    WeatherError::Transport(format!(
        "OpenWeather current request failed with status {status}: {detail}"
    ))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn check_credentials(&self) -> Result<(), WeatherError> {
        self.api_key().map(|_| ())
    }

    async fn fetch_one(&self, location: &Location) -> Result<WeatherRecord, WeatherError> {
        self.fetch_current(location).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
