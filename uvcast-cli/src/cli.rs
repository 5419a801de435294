use anyhow::{Context, anyhow, bail};
use chrono::{Local, Timelike};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Password, Select, Text};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uvcast_core::{
    Config, Coordinate, LocationQuery, SavedPlace, SearchController, Selection, ThemeHandle,
    WeatherError, WeatherSession,
    location::ConfiguredLocation,
    provider::client_from_config,
    reminder::{ReminderKind, plan_reminder},
    session::{SearchOutcome, Snapshot},
    store::{FileStore, FirstLaunch, SavedPlaces},
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "uvcast", version, about = "Weather and UV index companion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, language and fallback location.
    Configure,

    /// Show current conditions and UV summary.
    Show {
        #[command(flatten)]
        target: Target,
    },

    /// Show the 5-day forecast.
    Forecast {
        #[command(flatten)]
        target: Target,
    },

    /// Look up places by name.
    Search {
        /// Place name, at least 2 characters.
        query: String,
    },

    /// Manage saved places.
    Places {
        #[command(subcommand)]
        action: PlacesAction,
    },

    /// Keep refreshing the weather until interrupted.
    Watch {
        #[command(flatten)]
        target: Target,

        /// Refresh interval; defaults to the configured one.
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Plan a skincare reminder for now.
    Remind {
        #[arg(value_enum)]
        kind: ReminderArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlacesAction {
    /// List saved places.
    List,

    /// Search for a place and save one of the results.
    Add {
        query: String,

        /// Position in the search results (starting at 1); prompts if absent.
        #[arg(long)]
        index: Option<usize>,
    },

    /// Remove a saved place by id.
    Remove { id: String },
}

/// Where to show weather for. Defaults to the current location.
#[derive(Debug, Args)]
pub struct Target {
    /// Free-text place name.
    #[arg(long, conflicts_with_all = ["lat", "saved"])]
    place: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Id of a saved place.
    #[arg(long, conflicts_with_all = ["place", "lat"])]
    saved: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReminderArg {
    Sunscreen,
    Moisturizer,
}

impl From<ReminderArg> for ReminderKind {
    fn from(arg: ReminderArg) -> Self {
        match arg {
            ReminderArg::Sunscreen => ReminderKind::Sunscreen,
            ReminderArg::Moisturizer => ReminderKind::Moisturizer,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let storage = FileStore::new(Config::data_file_path()?);
        greet_on_first_launch(&storage)?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { target } => {
                let snapshot = fetch_once(&config, &storage, target).await?;
                output::print_current(&snapshot);
                Ok(())
            }
            Command::Forecast { target } => {
                let snapshot = fetch_once(&config, &storage, target).await?;
                output::print_forecast(&snapshot);
                Ok(())
            }
            Command::Search { query } => {
                let results = search(&config, &query).await?;
                output::print_search_results(&results);
                Ok(())
            }
            Command::Places { action } => places(&config, &storage, action).await,
            Command::Watch { target, interval_secs } => {
                let every = interval_secs
                    .map(|s| std::time::Duration::from_secs(s.max(1)))
                    .unwrap_or_else(|| config.refresh_interval());
                watch(&config, &storage, target, every).await
            }
            Command::Remind { kind } => {
                let now = Local::now();
                let plan = plan_reminder(kind.into(), now.hour());
                output::print_reminder(&plan, plan.trigger_at(now));
                Ok(())
            }
        }
    }
}

fn greet_on_first_launch(storage: &FileStore) -> anyhow::Result<()> {
    let flag = FirstLaunch::new(storage);
    if flag.is_first_launch().map_err(user_facing)? {
        println!("Welcome to uvcast! Run `uvcast configure` to set your API key.\n");
        flag.mark_launched().map_err(user_facing)?;
    }
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("weatherapi.com API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.api_key = Some(api_key.trim().to_string());

    let lang = Text::new("Condition language:")
        .with_default(&config.lang)
        .prompt()
        .context("Failed to read language")?;
    config.lang = lang;

    let wants_fallback = Confirm::new("Set a fallback location for `current location`?")
        .with_default(config.fallback_location.is_none())
        .prompt()?;

    if wants_fallback {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        config.fallback_location = Some(Coordinate::new(latitude, longitude));
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn new_session(config: &Config) -> anyhow::Result<WeatherSession> {
    Ok(WeatherSession::new(
        Arc::new(client_from_config(config)?),
        Arc::new(ConfiguredLocation::new(config.fallback_location)),
        ThemeHandle::default(),
    ))
}

fn resolve_selection(storage: &FileStore, target: Target) -> anyhow::Result<Selection> {
    if let Some(place) = target.place {
        return Ok(Selection::Query(LocationQuery::Place(place)));
    }

    if let (Some(lat), Some(lon)) = (target.lat, target.lon) {
        return Ok(Selection::Query(LocationQuery::Coordinate(Coordinate::new(lat, lon))));
    }

    if let Some(id) = target.saved {
        let place = SavedPlaces::new(storage)
            .find(&id)
            .map_err(user_facing)?
            .ok_or_else(|| anyhow!("No saved place with id '{id}'. See `uvcast places list`."))?;
        return Ok(Selection::Saved(place));
    }

    Ok(Selection::CurrentLocation)
}

async fn fetch_once(
    config: &Config,
    storage: &FileStore,
    target: Target,
) -> anyhow::Result<Arc<Snapshot>> {
    let session = new_session(config)?;
    session.select(resolve_selection(storage, target)?).await;

    session
        .refresh()
        .await
        .map_err(user_facing)?
        .ok_or_else(|| anyhow!("Refresh did not complete"))
}

async fn search(config: &Config, query: &str) -> anyhow::Result<Vec<uvcast_core::SearchResult>> {
    let controller = SearchController::new(Arc::new(client_from_config(config)?));

    match controller.search(query).await.map_err(user_facing)? {
        SearchOutcome::Results(results) => Ok(results),
        SearchOutcome::Superseded => Ok(Vec::new()),
    }
}

async fn places(config: &Config, storage: &FileStore, action: PlacesAction) -> anyhow::Result<()> {
    let places = SavedPlaces::new(storage);

    match action {
        PlacesAction::List => {
            output::print_saved_places(&places.load().map_err(user_facing)?);
            println!("\nStored in {}", storage.path().display());
        }
        PlacesAction::Add { query, index } => {
            let results = search(config, &query).await?;
            if results.is_empty() {
                bail!("No places found for '{query}'");
            }

            let chosen = match index {
                Some(i) => results
                    .get(i.wrapping_sub(1))
                    .ok_or_else(|| anyhow!("Index {i} is out of range (1..={})", results.len()))?,
                None => {
                    let labels: Vec<String> = results.iter().map(|r| r.display_name.clone()).collect();
                    let picked = Select::new("Save which place?", labels).raw_prompt()?;
                    &results[picked.index]
                }
            };

            let place = SavedPlace::from_search_result(chosen);
            let id = place.id.clone();
            places.add(place).map_err(user_facing)?;
            println!("Saved {} ({id})", chosen.display_name);
        }
        PlacesAction::Remove { id } => {
            let before = places.load().map_err(user_facing)?.len();
            let left = places.remove(&id).map_err(user_facing)?;
            if left.len() == before {
                println!("No saved place with id '{id}'");
            } else {
                println!("Removed {id}");
            }
        }
    }

    Ok(())
}

async fn watch(
    config: &Config,
    storage: &FileStore,
    target: Target,
    every: std::time::Duration,
) -> anyhow::Result<()> {
    let session = new_session(config)?;
    session.select(resolve_selection(storage, target)?).await;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    tracing::info!(interval_secs = every.as_secs(), "watching weather, press Ctrl-C to stop");

    session
        .run_periodic(every, cancel, |res| match res {
            Ok(snapshot) => output::print_current(&snapshot),
            Err(err) => eprintln!("{}", err.user_message()),
        })
        .await;

    Ok(())
}

fn user_facing(err: WeatherError) -> anyhow::Error {
    let msg = err.user_message();
    anyhow::Error::new(err).context(msg)
}
