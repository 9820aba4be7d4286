use std::fmt::{self, Debug};

use async_trait::async_trait;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::{
    config::StationConfig,
    error::TempestError,
    history::{Resolution, TimeWindow},
    http::HttpClient,
    model::{Forecast, Observation, Station},
    source::{cloud::CloudSource, daemon::DaemonSource},
    units::UnitSystem,
};

pub mod cloud;
pub mod daemon;

/// Where observations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The WeatherFlow cloud REST API; always answers in metric.
    Cloud,
    /// A local `tempestd` caching daemon; converts units itself.
    Daemon,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Cloud => "cloud",
            SourceKind::Daemon => "tempestd",
        }
    }

    /// Whether observations from this source already arrive in the
    /// requested unit system.
    pub fn converts_units(&self) -> bool {
        matches!(self, SourceKind::Daemon)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a source needs to answer a history request.
#[derive(Debug, Clone, Copy)]
pub struct ObservationQuery<'a> {
    pub station: &'a StationConfig,
    pub window: TimeWindow,
    pub units: UnitSystem,
    pub resolution: Resolution,
}

#[async_trait]
pub trait ObservationSource: Send + Sync + Debug {
    fn kind(&self) -> SourceKind;

    /// Observations for the query window, in ascending timestamp order.
    async fn observations(
        &self,
        query: &ObservationQuery<'_>,
    ) -> Result<Vec<Observation>, TempestError>;

    /// Daily forecast for the station, temperatures in °C.
    async fn forecast(&self, station: &StationConfig) -> Result<Forecast, TempestError>;

    /// Latest observation. Only sources that convert units honour `units`;
    /// the others answer in metric.
    async fn current(
        &self,
        station: &StationConfig,
        units: UnitSystem,
    ) -> Result<Observation, TempestError>;

    /// Station metadata.
    async fn station(&self, station: &StationConfig) -> Result<Station, TempestError>;

    /// Every station the source can list in one call. Empty when it has no
    /// such endpoint.
    async fn known_stations(&self) -> Result<Vec<Station>, TempestError> {
        Ok(Vec::new())
    }
}

/// Awaits `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, TempestError>
where
    F: Future<Output = Result<T, TempestError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TempestError::Cancelled),
        result = fut => result,
    }
}

/// Picks the daemon when a server URL is configured, the cloud otherwise.
pub fn source_for(
    server_url: Option<&Url>,
    http: HttpClient,
) -> Result<Box<dyn ObservationSource>, TempestError> {
    let boxed: Box<dyn ObservationSource> = match server_url {
        Some(url) => Box::new(DaemonSource::new(http, url.clone())),
        None => Box::new(CloudSource::new(http)?),
    };
    Ok(boxed)
}
