use crate::{Config, Location, WeatherError, WeatherRecord, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// A source of current conditions for a single location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Precondition check that needs no network access.
    fn check_credentials(&self) -> Result<(), WeatherError>;

    async fn fetch_one(&self, location: &Location) -> Result<WeatherRecord, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here; it surfaces as
/// [`WeatherError::Credential`] on the first fetch.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}
