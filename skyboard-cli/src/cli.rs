use std::io::{self, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use skyboard_core::{
    Config, Lang, LiveClock, LoadState, LocalClockState, Location, WeatherAggregator,
    cities::{popular_cities, suggest},
    clock::{Precision, clock_entries},
    config::API_KEY_ENV,
    provider_from_config,
};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyboard", version, about = "City weather dashboard")]
pub struct Cli {
    /// Language for descriptions and messages ("es" or "en"); overrides the config file.
    #[arg(long, global = true)]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred language.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Buenos Aires".
        city: String,

        /// Keep the local clock ticking until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Show current weather for the popular cities.
    Popular {
        #[arg(long)]
        watch: bool,
    },

    /// Searched city plus the popular-cities panel.
    Dashboard {
        #[arg(long, default_value = "Madrid")]
        city: String,

        #[arg(long)]
        watch: bool,
    },

    /// List known city names containing QUERY.
    Suggest {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?.with_api_key_override(std::env::var(API_KEY_ENV).ok());
        if let Some(lang) = self.lang.as_deref() {
            config.lang = Lang::try_from(lang)?;
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, watch } => show(&config, city, watch).await,
            Command::Popular { watch } => popular(&config, watch).await,
            Command::Dashboard { city, watch } => dashboard(&config, city, watch).await,
            Command::Suggest { query, limit } => {
                print!("{}", render::suggestions(&suggest(&query, limit), config.lang));
                Ok(())
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let lang = Select::new("Language:", Lang::all().to_vec())
        .prompt()
        .context("Failed to read language")?;

    config.set_api_key(api_key.trim().to_string());
    config.lang = lang;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, city: String, watch: bool) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let lang = config.lang;

    let state = LoadState::from_single(provider.fetch_one(&Location::new(city)).await, lang);
    let clock = match &state {
        LoadState::Loaded(record) => LiveClock::for_records(std::slice::from_ref(record), Precision::Seconds),
        _ => LiveClock::idle(),
    };

    let draw = |times: &LocalClockState| render::single(&state, times, lang);
    present(clock, watch, draw).await
}

async fn popular(config: &Config, watch: bool) -> anyhow::Result<()> {
    let aggregator = WeatherAggregator::new(provider_from_config(config)?);
    let lang = config.lang;

    let state = LoadState::from_aggregate(aggregator.fetch_all(&popular_cities()).await, lang);
    let clock = match &state {
        LoadState::Loaded(records) => LiveClock::for_records(records, Precision::Minutes),
        _ => LiveClock::idle(),
    };

    let draw = |times: &LocalClockState| render::panel(&state, times, lang);
    present(clock, watch, draw).await
}

async fn dashboard(config: &Config, city: String, watch: bool) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let aggregator = WeatherAggregator::new(provider.clone());
    let lang = config.lang;

    let location = Location::new(city);
    let cities = popular_cities();
    let (single, panel) = tokio::join!(provider.fetch_one(&location), aggregator.fetch_all(&cities));

    let single = LoadState::from_single(single, lang);
    let panel = LoadState::from_aggregate(panel, lang);

    let mut entries = Vec::new();
    if let LoadState::Loaded(record) = &single {
        entries.extend(clock_entries(std::slice::from_ref(record), Precision::Seconds));
    }
    if let LoadState::Loaded(records) = &panel {
        entries.extend(clock_entries(records, Precision::Minutes));
    }
    let clock = LiveClock::start(entries, skyboard_core::SystemClock, skyboard_core::clock::DEFAULT_REFRESH);

    let draw = |times: &LocalClockState| {
        format!("{}\n{}", render::single(&single, times, lang), render::panel(&panel, times, lang))
    };
    present(clock, watch, draw).await
}

/// Print one frame, or with `watch` redraw whenever the clocks change until Ctrl-C.
async fn present<F>(mut clock: LiveClock, watch: bool, draw: F) -> anyhow::Result<()>
where
    F: Fn(&LocalClockState) -> String,
{
    let mut last = draw(&clock.snapshot());

    if !watch || !clock.is_running() {
        print!("{last}");
        clock.cancel();
        return Ok(());
    }

    let mut stdout = io::stdout();
    write!(stdout, "\x1b[2J\x1b[H{last}")?;
    stdout.flush()?;

    let mut updates = clock.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = draw(&updates.borrow_and_update());
                if frame != last {
                    write!(stdout, "\x1b[2J\x1b[H{frame}")?;
                    stdout.flush()?;
                    last = frame;
                }
            }
        }
    }

    if clock.cancel() {
        info!("stopped live clock refresh");
    }
    Ok(())
}
