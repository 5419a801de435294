//! Device position acquisition with a single last-known fallback.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{Remediation, Result, WeatherError},
    model::Coordinate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Platform location service.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn services_enabled(&self) -> bool;

    async fn permission_status(&self) -> PermissionStatus;

    /// May show a permission dialog and wait for the user's answer.
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> Result<Coordinate>;

    async fn last_known_position(&self) -> Result<Option<Coordinate>>;
}

pub async fn acquire_current_location(source: &dyn LocationSource) -> Result<Coordinate> {
    if !source.services_enabled().await {
        return Err(WeatherError::LocationServiceDisabled);
    }

    let mut status = source.permission_status().await;
    if status != PermissionStatus::Granted {
        tracing::debug!(?status, "requesting location permission");
        status = source.request_permission().await;
    }
    if status != PermissionStatus::Granted {
        return Err(WeatherError::LocationPermissionDenied);
    }

    let err = match source.current_position().await {
        Ok(position) => return Ok(position),
        Err(err) => err,
    };

    tracing::warn!("current position failed, trying last known: {err}");

    match source.last_known_position().await {
        Ok(Some(position)) => Ok(position),
        Ok(None) => Err(unavailable()),
        Err(fallback_err) => {
            tracing::warn!("last known position failed: {fallback_err}");
            Err(unavailable())
        }
    }
}

fn unavailable() -> WeatherError {
    WeatherError::LocationUnavailable { remediation: Remediation::OpenSettings }
}

/// Location source backed by a coordinate from the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    position: Option<Coordinate>,
}

impl ConfiguredLocation {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocation {
    async fn services_enabled(&self) -> bool {
        self.position.is_some()
    }

    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Coordinate> {
        self.position.ok_or_else(unavailable)
    }

    async fn last_known_position(&self) -> Result<Option<Coordinate>> {
        Ok(None)
    }
}
