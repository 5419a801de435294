use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::Result,
    model::{ForecastPayload, LocationQuery, PlaceCandidate},
    provider::weatherapi::WeatherApiClient,
};

pub mod weatherapi;

/// Number of forecast days requested on every fetch.
pub const FORECAST_DAYS: u8 = 5;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the raw forecast for `query`. Every call hits the network.
    async fn fetch_forecast(&self, query: &LocationQuery, days: u8) -> Result<ForecastPayload>;
}

#[async_trait]
pub trait PlaceSearch: Send + Sync + Debug {
    /// Raw place candidates in the endpoint's order.
    async fn lookup(&self, query: &str) -> Result<Vec<PlaceCandidate>>;
}

/// Construct the weatherapi.com client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<WeatherApiClient> {
    let api_key = config.api_key()?;

    Ok(WeatherApiClient::new(api_key)
        .with_lang(config.lang.clone())
        .with_base_url(config.base_url.clone()))
}
