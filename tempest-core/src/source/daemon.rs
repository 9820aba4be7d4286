use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::StationConfig,
    error::TempestError,
    http::HttpClient,
    model::{Forecast, Observation, Station},
    units::UnitSystem,
};

use super::{ObservationQuery, ObservationSource, SourceKind};

/// Service name used in errors raised by this source.
pub const TARGET: &str = "tempestd";

/// A local `tempestd` daemon. It converts units and applies the requested
/// resolution on its side.
#[derive(Debug, Clone)]
pub struct DaemonSource {
    http: HttpClient,
    base: Url,
}

impl DaemonSource {
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }
}

/// Formats an instant the way the daemon expects it on the wire.
pub fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ObservationsPayload {
    Wrapped { observations: Vec<Observation> },
    Bare(Vec<Observation>),
}

impl ObservationsPayload {
    fn into_observations(self) -> Vec<Observation> {
        match self {
            ObservationsPayload::Wrapped { observations } => observations,
            ObservationsPayload::Bare(observations) => observations,
        }
    }
}

#[async_trait]
impl ObservationSource for DaemonSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Daemon
    }

    async fn observations(
        &self,
        query: &ObservationQuery<'_>,
    ) -> Result<Vec<Observation>, TempestError> {
        let path = format!("/api/v1/stations/{}/observations", query.station.station_id);
        let params = [
            ("start", rfc3339(query.window.start())),
            ("end", rfc3339(query.window.end())),
            ("units", query.units.as_str().to_string()),
            ("resolution", query.resolution.label()),
        ];

        let payload: ObservationsPayload = self
            .http
            .get_json(TARGET, &self.base, &path, &params, None)
            .await?;

        let observations = payload.into_observations();
        debug!(
            station_id = query.station.station_id,
            count = observations.len(),
            "fetched observations from tempestd"
        );
        Ok(observations)
    }

    async fn forecast(&self, station: &StationConfig) -> Result<Forecast, TempestError> {
        let path = format!("/api/v1/stations/{}/forecast", station.station_id);
        self.http
            .get_json(TARGET, &self.base, &path, &[], None)
            .await
    }

    async fn current(
        &self,
        station: &StationConfig,
        units: UnitSystem,
    ) -> Result<Observation, TempestError> {
        let path = format!("/api/v1/stations/{}/current", station.station_id);
        let params = [("units", units.as_str().to_string())];
        self.http
            .get_json(TARGET, &self.base, &path, &params, None)
            .await
    }

    async fn station(&self, station: &StationConfig) -> Result<Station, TempestError> {
        let path = format!("/api/v1/stations/{}", station.station_id);
        self.http
            .get_json(TARGET, &self.base, &path, &[], None)
            .await
    }

    async fn known_stations(&self) -> Result<Vec<Station>, TempestError> {
        self.http
            .get_json(TARGET, &self.base, "/api/v1/stations", &[], None)
            .await
    }
}
