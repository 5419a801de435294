//! Core library for the `uvcast` weather and UV companion.
//!
//! This crate defines:
//! - Configuration handling
//! - The weatherapi.com client (forecast and place search)
//! - Forecast derivation (UV samples, daily max, theme)
//! - Location acquisition, saved places and session state
//!
//! It is used by `uvcast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod derive;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod reminder;
pub mod search;
pub mod session;
pub mod store;

pub use config::Config;
pub use derive::{DerivedMetrics, Theme, UvLevel, UvSample};
pub use error::{Result, WeatherError};
pub use model::{Coordinate, ForecastPayload, LocationQuery, SavedPlace, SearchResult};
pub use provider::{PlaceSearch, WeatherProvider, weatherapi::WeatherApiClient};
pub use session::{SearchController, Selection, ThemeHandle, WeatherSession};
