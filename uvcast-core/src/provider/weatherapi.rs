use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_LANG},
    error::{Result, WeatherError},
    model::{ForecastPayload, LocationQuery, PlaceCandidate},
};

use super::{PlaceSearch, WeatherProvider};

/// Client for the weatherapi.com forecast and search endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    lang: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            lang: DEFAULT_LANG.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, "sending request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("lang", self.lang.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<WaErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate_body(&body));

            tracing::warn!(status = status.as_u16(), %message, "{endpoint} request failed");
            return Err(WeatherError::ServerError { status: status.as_u16(), message });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Other(format!("Failed to parse {endpoint} JSON: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn fetch_forecast(&self, query: &LocationQuery, days: u8) -> Result<ForecastPayload> {
        let q = query.as_param();
        let days = days.to_string();

        let payload: ForecastPayload = self
            .get_json("forecast.json", &[("q", q.as_str()), ("days", days.as_str()), ("aqi", "no")])
            .await?;

        tracing::info!(query = %q, days = payload.days().len(), "forecast fetched");
        Ok(payload)
    }
}

#[async_trait]
impl PlaceSearch for WeatherApiClient {
    async fn lookup(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let places: Vec<PlaceCandidate> = self.get_json("search.json", &[("q", query)]).await?;
        tracing::debug!(query, hits = places.len(), "place lookup finished");
        Ok(places)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
