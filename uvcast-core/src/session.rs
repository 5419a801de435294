//! Session scope: the shared theme, the refresh loop and search requests.

use chrono::{DateTime, Local, Timelike};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::{Mutex, RwLock, watch},
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{
    derive::{DerivedMetrics, Theme, derive},
    error::Result,
    location::{LocationSource, acquire_current_location},
    model::{ForecastPayload, LocationQuery, SavedPlace, SearchResult},
    provider::{FORECAST_DAYS, PlaceSearch, WeatherProvider},
    search,
};

/// Read/write handle to the session theme. Clones share the same value.
#[derive(Debug, Clone)]
pub struct ThemeHandle {
    tx: Arc<watch::Sender<Theme>>,
}

impl ThemeHandle {
    pub fn new(initial: Theme) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> Theme {
        *self.tx.borrow()
    }

    pub fn set(&self, theme: Theme) {
        self.tx.send_replace(theme);
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }
}

impl Default for ThemeHandle {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

/// Which place the session shows weather for.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    CurrentLocation,
    Saved(SavedPlace),
    Query(LocationQuery),
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub query: LocationQuery,
    pub payload: ForecastPayload,
    pub metrics: DerivedMetrics,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug)]
pub struct WeatherSession {
    provider: Arc<dyn WeatherProvider>,
    location: Arc<dyn LocationSource>,
    theme: ThemeHandle,
    selection: RwLock<Selection>,
    selection_epoch: AtomicU64,
    latest: RwLock<Option<Arc<Snapshot>>>,
    in_flight: Mutex<()>,
}

impl WeatherSession {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        location: Arc<dyn LocationSource>,
        theme: ThemeHandle,
    ) -> Self {
        Self {
            provider,
            location,
            theme,
            selection: RwLock::new(Selection::default()),
            selection_epoch: AtomicU64::new(0),
            latest: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    pub fn theme(&self) -> &ThemeHandle {
        &self.theme
    }

    pub async fn select(&self, selection: Selection) {
        *self.selection.write().await = selection;
        self.selection_epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn selection(&self) -> Selection {
        self.selection.read().await.clone()
    }

    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.read().await.clone()
    }

    /// Fetch and derive for the current selection.
    ///
    /// Returns `Ok(None)` when another refresh is already running. That refresh
    /// starts over if the selection changes while its request is in flight, so
    /// the newest selection is always the one published.
    pub async fn refresh(&self) -> Result<Option<Arc<Snapshot>>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("refresh already in flight, skipping");
            return Ok(None);
        };

        loop {
            let epoch = self.selection_epoch.load(Ordering::SeqCst);
            let res = self.fetch_selected().await;

            if self.selection_epoch.load(Ordering::SeqCst) != epoch {
                tracing::debug!("selection changed during refresh, fetching again");
                continue;
            }
            let (query, payload) = res?;

            let fetched_at = Local::now();
            let metrics = derive(&payload, fetched_at.hour());
            self.theme.set(metrics.theme);

            let snapshot = Arc::new(Snapshot { query, payload, metrics, fetched_at });
            *self.latest.write().await = Some(Arc::clone(&snapshot));

            tracing::info!(theme = %snapshot.metrics.theme, "weather refreshed");
            return Ok(Some(snapshot));
        }
    }

    async fn fetch_selected(&self) -> Result<(LocationQuery, ForecastPayload)> {
        let query = match self.selection().await {
            Selection::CurrentLocation => {
                LocationQuery::from(acquire_current_location(self.location.as_ref()).await?)
            }
            Selection::Saved(place) => LocationQuery::from(place.coordinate()),
            Selection::Query(query) => query,
        };

        let payload = self.provider.fetch_forecast(&query, FORECAST_DAYS).await?;
        Ok((query, payload))
    }

    /// Refresh now and then every `every` until `cancel` fires.
    ///
    /// Failed refreshes are reported to `on_update` and the loop keeps going.
    pub async fn run_periodic<F>(&self, every: Duration, cancel: CancellationToken, mut on_update: F)
    where
        F: FnMut(Result<Arc<Snapshot>>),
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.refresh() => match res {
                    Ok(Some(snapshot)) => on_update(Ok(snapshot)),
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!("periodic refresh failed: {err}");
                        on_update(Err(err));
                    }
                },
            }
        }

        tracing::info!("refresh loop stopped");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<SearchResult>),
    /// A newer query was issued before this one resolved.
    Superseded,
}

/// Issues place searches where only the newest query may deliver results.
#[derive(Debug)]
pub struct SearchController {
    client: Arc<dyn PlaceSearch>,
    generation: AtomicU64,
    pending: Mutex<CancellationToken>,
}

impl SearchController {
    pub fn new(client: Arc<dyn PlaceSearch>) -> Self {
        Self { client, generation: AtomicU64::new(0), pending: Mutex::new(CancellationToken::new()) }
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().await;
            pending.cancel();
            *pending = token.clone();
        }

        let res = tokio::select! {
            _ = token.cancelled() => return Ok(SearchOutcome::Superseded),
            res = search::search(self.client.as_ref(), query) => res,
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(res?))
    }
}
