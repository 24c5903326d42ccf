//! Core library for the `skyboard` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The weather provider abstraction and its OpenWeather implementation
//! - Concurrent multi-city lookup with per-city failure isolation
//! - Live local-clock derivation from UTC offsets
//!
//! It is used by `skyboard-cli`, but can also be reused by other front-ends.

pub mod aggregator;
pub mod cities;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod state;

pub use aggregator::WeatherAggregator;
pub use clock::{
    Clock, ClockEntry, LiveClock, LocalClockState, Precision, SystemClock, format_local_time,
    format_local_time_with_seconds,
};
pub use config::Config;
pub use error::{FailureScope, WeatherError};
pub use model::{Lang, Location, WeatherRecord};
pub use provider::{WeatherProvider, provider_from_config};
pub use state::LoadState;
