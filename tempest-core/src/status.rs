//! Online/offline status for every configured station.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::Config,
    error::TempestError,
    model::Station,
    source::{ObservationSource, cancellable},
    units::UnitSystem,
};

/// A station counts as online if it reported within this many minutes.
pub const ONLINE_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct StationStatus {
    /// Key under `[stations]` in the config file.
    pub key: String,
    pub name: String,
    pub station_id: u64,
    pub device_id: u64,
    pub is_default: bool,
    pub online: bool,
    pub last_observed: Option<DateTime<Utc>>,
}

/// Checks each configured station against `source`.
///
/// Failures for a single station mark it offline; only cancellation aborts
/// the whole listing. Sources that can list stations are asked once up
/// front and per-station lookups are skipped for the ones found there.
pub async fn station_statuses(
    source: &dyn ObservationSource,
    config: &Config,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Vec<StationStatus>, TempestError> {
    let index: HashMap<u64, Station> =
        tolerate(cancellable(cancel, source.known_stations()).await)?
            .unwrap_or_default()
            .into_iter()
            .map(|s| (s.station_id, s))
            .collect();

    let mut statuses = Vec::with_capacity(config.stations.len());
    for (key, sc) in &config.stations {
        let station = match index.get(&sc.station_id) {
            Some(known) => Some(known.clone()),
            None => tolerate(cancellable(cancel, source.station(sc)).await)?,
        };

        let last_observed = match &station {
            Some(_) => {
                tolerate(cancellable(cancel, source.current(sc, UnitSystem::Metric)).await)?
                    .map(|obs| obs.timestamp)
            }
            None => None,
        };

        let name = station
            .map(|s| s.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| sc.name.clone());

        let window = Duration::minutes(ONLINE_WINDOW_MINUTES);
        statuses.push(StationStatus {
            key: key.clone(),
            name,
            station_id: sc.station_id,
            device_id: sc.device_id,
            is_default: config.default_station.as_deref() == Some(key.as_str()),
            online: last_observed.is_some_and(|ts| now - ts < window),
            last_observed,
        });
    }
    Ok(statuses)
}

/// Turns any error except cancellation into "no answer".
fn tolerate<T>(result: Result<T, TempestError>) -> Result<Option<T>, TempestError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TempestError::Cancelled) => Err(TempestError::Cancelled),
        Err(err) => {
            debug!(error = %err, "station lookup failed");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StationConfig,
        model::{Forecast, Observation},
        source::{ObservationQuery, SourceKind},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    /// Knows station 1001 (fresh) and 1002 (stale); 1003 does not exist.
    #[derive(Debug, Default)]
    struct Network {
        listed: Vec<Station>,
        station_lookups: AtomicUsize,
    }

    fn missing() -> TempestError {
        TempestError::UpstreamStatus {
            target: "test".into(),
            status: StatusCode::NOT_FOUND,
            path: "/stations".into(),
        }
    }

    #[async_trait]
    impl ObservationSource for Network {
        fn kind(&self) -> SourceKind {
            SourceKind::Daemon
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
            station: &StationConfig,
            _units: UnitSystem,
        ) -> Result<Observation, TempestError> {
            match station.station_id {
                1001 => Ok(Observation::at(now() - Duration::minutes(5))),
                1002 => Ok(Observation::at(now() - Duration::hours(2))),
                _ => Err(missing()),
            }
        }

        async fn station(&self, station: &StationConfig) -> Result<Station, TempestError> {
            self.station_lookups.fetch_add(1, Ordering::SeqCst);
            match station.station_id {
                1001 | 1002 => Ok(Station {
                    station_id: station.station_id,
                    name: format!("Remote {}", station.station_id),
                    ..Station::default()
                }),
                _ => Err(missing()),
            }
        }

        async fn known_stations(&self) -> Result<Vec<Station>, TempestError> {
            Ok(self.listed.clone())
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        for (key, id) in [("home", 1001), ("cabin", 1002), ("gone", 1003)] {
            config.upsert_station(
                key.into(),
                StationConfig {
                    token: "t".into(),
                    station_id: id,
                    device_id: id + 1000,
                    name: key.to_uppercase(),
                },
            );
        }
        config
    }

    #[tokio::test]
    async fn reports_online_offline_and_unknown() {
        let source = Network::default();
        let statuses = station_statuses(&source, &config(), now(), &CancellationToken::new())
            .await
            .unwrap();

        // BTreeMap order: cabin, gone, home.
        let keys: Vec<&str> = statuses.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["cabin", "gone", "home"]);

        let cabin = &statuses[0];
        assert_eq!(cabin.name, "Remote 1002");
        assert!(!cabin.online);
        assert!(cabin.last_observed.is_some());

        let gone = &statuses[1];
        assert_eq!(gone.name, "GONE");
        assert!(!gone.online);
        assert_eq!(gone.last_observed, None);

        let home = &statuses[2];
        assert!(home.online);
        assert!(home.is_default);
        assert_eq!(home.device_id, 2001);
    }

    #[tokio::test]
    async fn listed_stations_skip_per_station_lookups() {
        let source = Network {
            listed: vec![Station {
                station_id: 1001,
                name: "Listed".into(),
                ..Station::default()
            }],
            ..Network::default()
        };

        let statuses = station_statuses(&source, &config(), now(), &CancellationToken::new())
            .await
            .unwrap();

        let home = statuses.iter().find(|s| s.key == "home").unwrap();
        assert_eq!(home.name, "Listed");
        assert_eq!(source.station_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancellation_aborts_the_listing() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = station_statuses(&Network::default(), &config(), now(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TempestError::Cancelled));
    }
}
