//! Current conditions for one station.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::StationConfig,
    error::TempestError,
    model::{Observation, Station},
    source::{ObservationSource, SourceKind, cancellable},
    units::UnitSystem,
};

/// Latest observation in `units`, plus what the source knows about the station.
#[derive(Debug, Clone)]
pub struct Current {
    pub station: Station,
    pub observation: Observation,
    pub units: UnitSystem,
    pub source: SourceKind,
}

impl Current {
    /// Name reported by the source, else the configured one.
    pub fn station_name(&self, configured: &StationConfig) -> String {
        if self.station.name.is_empty() {
            configured.display_name()
        } else {
            self.station.name.clone()
        }
    }
}

/// Fetches the latest observation and station metadata from one source.
///
/// Like history, conversion happens here only for sources that do not
/// convert units themselves.
pub async fn fetch_current(
    source: &dyn ObservationSource,
    station: &StationConfig,
    units: UnitSystem,
    cancel: &CancellationToken,
) -> Result<Current, TempestError> {
    let kind = source.kind();
    debug!(source = %kind, station_id = station.station_id, "fetching current conditions");

    let observation = cancellable(cancel, source.current(station, units)).await?;
    let meta = cancellable(cancel, source.station(station)).await?;

    let observation = if !kind.converts_units() && units != UnitSystem::Metric {
        observation.converted(units)
    } else {
        observation
    };

    Ok(Current {
        station: meta,
        observation,
        units,
        source: kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        model::Forecast,
        source::ObservationQuery,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    #[derive(Debug)]
    struct Fixed {
        kind: SourceKind,
        name: &'static str,
    }

    #[async_trait]
    impl ObservationSource for Fixed {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn observations(
            &self,
            _query: &ObservationQuery<'_>,
        ) -> Result<Vec<Observation>, TempestError> {
            Ok(Vec::new())
        }

        async fn forecast(&self, _station: &StationConfig) -> Result<Forecast, TempestError> {
            Ok(Forecast { daily: Vec::new() })
        }

        async fn current(
            &self,
            _station: &StationConfig,
            _units: UnitSystem,
        ) -> Result<Observation, TempestError> {
            let mut obs = Observation::at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
            obs.air_temperature = 20.0;
            Ok(obs)
        }

        async fn station(&self, station: &StationConfig) -> Result<Station, TempestError> {
            Ok(Station {
                station_id: station.station_id,
                name: self.name.to_string(),
                ..Station::default()
            })
        }
    }

    fn configured() -> StationConfig {
        StationConfig {
            token: "t".into(),
            station_id: 1001,
            device_id: 2002,
            name: "Home".into(),
        }
    }

    #[tokio::test]
    async fn cloud_readings_are_converted() {
        let source = Fixed {
            kind: SourceKind::Cloud,
            name: "Backyard",
        };

        let current = fetch_current(
            &source,
            &configured(),
            UnitSystem::Imperial,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!((current.observation.air_temperature - 68.0).abs() < 1e-9);
        assert_eq!(current.station_name(&configured()), "Backyard");
    }

    #[tokio::test]
    async fn daemon_readings_are_left_alone() {
        let source = Fixed {
            kind: SourceKind::Daemon,
            name: "",
        };

        let current = fetch_current(
            &source,
            &configured(),
            UnitSystem::Imperial,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(current.observation.air_temperature, 20.0);
        assert_eq!(current.station_name(&configured()), "Home");
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let source = Fixed {
            kind: SourceKind::Cloud,
            name: "x",
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch_current(&source, &configured(), UnitSystem::Metric, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
