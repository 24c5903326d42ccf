//! Fan-out lookup of many locations with per-location failure isolation.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::WeatherError,
    model::{Location, WeatherRecord},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherAggregator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Fetch every location concurrently and keep the successes.
    ///
    /// Individual failures are logged and dropped. The call itself only fails
    /// when the provider cannot issue any request at all (missing credential),
    /// in which case nothing is sent.
    pub async fn fetch_all(&self, locations: &[Location]) -> Result<Vec<WeatherRecord>, WeatherError> {
        self.provider.check_credentials()?;

        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let fetches = locations.iter().map(|location| async move {
            match self.provider.fetch_one(location).await {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(location = %location, error = %err, "dropping location from results");
                    None
                }
            }
        });

        let records: Vec<WeatherRecord> = join_all(fetches).await.into_iter().flatten().collect();

        info!(requested = locations.len(), loaded = records.len(), "aggregate weather fetch finished");

        Ok(records)
    }
}
