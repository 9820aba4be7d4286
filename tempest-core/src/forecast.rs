use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::StationConfig, error::TempestError, model::Forecast, source::ObservationSource,
};

/// Most days a forecast can show.
pub const MAX_FORECAST_DAYS: usize = 10;

/// Clamps a requested day count into `1..=MAX_FORECAST_DAYS`.
pub fn clamp_days(days: i64) -> usize {
    days.clamp(1, MAX_FORECAST_DAYS as i64) as usize
}

/// Fetches a forecast from `primary`, retrying once against `fallback` when
/// the primary fails. Daemons may not cache forecasts, so this is the one
/// flow that crosses sources. Cancellation is never retried.
pub async fn fetch_forecast(
    primary: &dyn ObservationSource,
    fallback: Option<&dyn ObservationSource>,
    station: &StationConfig,
    cancel: &CancellationToken,
) -> Result<Forecast, TempestError> {
    let first = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TempestError::Cancelled),
        result = primary.forecast(station) => result,
    };

    match (first, fallback) {
        (Ok(forecast), _) => Ok(forecast),
        (Err(err), Some(fallback)) => {
            debug!(
                source = %primary.kind(),
                error = %err,
                "forecast failed, falling back to {}",
                fallback.kind()
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TempestError::Cancelled),
                result = fallback.forecast(station) => result,
            }
        }
        (Err(err), None) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        model::{ForecastDay, Observation, Station},
        source::{ObservationQuery, SourceKind},
        units::UnitSystem,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Canned {
        kind: SourceKind,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(kind: SourceKind, fail: bool) -> Self {
            Self {
                kind,
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObservationSource for Canned {
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
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TempestError::UpstreamStatus {
                    target: self.kind.to_string(),
                    status: StatusCode::NOT_FOUND,
                    path: "/forecast".into(),
                });
            }
            Ok(Forecast {
                daily: vec![ForecastDay {
                    date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                    high_temp: 25.0,
                    low_temp: 15.0,
                    conditions: self.kind.to_string(),
                    icon: String::new(),
                    precip_chance: 0,
                    precip_type: None,
                    sunrise: None,
                    sunset: None,
                }],
            })
        }

        async fn current(
            &self,
            _station: &StationConfig,
            _units: UnitSystem,
        ) -> Result<Observation, TempestError> {
            Err(TempestError::Cancelled)
        }

        async fn station(&self, _station: &StationConfig) -> Result<Station, TempestError> {
            Ok(Station::default())
        }
    }

    #[test]
    fn days_are_clamped() {
        assert_eq!(clamp_days(0), 1);
        assert_eq!(clamp_days(-3), 1);
        assert_eq!(clamp_days(5), 5);
        assert_eq!(clamp_days(42), 10);
    }

    #[tokio::test]
    async fn daemon_success_skips_cloud() {
        let daemon = Canned::new(SourceKind::Daemon, false);
        let cloud = Canned::new(SourceKind::Cloud, false);

        let forecast = fetch_forecast(
            &daemon,
            Some(&cloud as &dyn ObservationSource),
            &StationConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(forecast.daily[0].conditions, "tempestd");
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn daemon_failure_falls_back_to_cloud() {
        let daemon = Canned::new(SourceKind::Daemon, true);
        let cloud = Canned::new(SourceKind::Cloud, false);

        let forecast = fetch_forecast(
            &daemon,
            Some(&cloud as &dyn ObservationSource),
            &StationConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(forecast.daily[0].conditions, "cloud");
        assert_eq!(daemon.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn without_fallback_the_error_surfaces() {
        let cloud = Canned::new(SourceKind::Cloud, true);

        let err = fetch_forecast(
            &cloud,
            None,
            &StationConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamStatus);
    }

    #[tokio::test]
    async fn cancellation_is_not_retried() {
        let daemon = Canned::new(SourceKind::Daemon, false);
        let cloud = Canned::new(SourceKind::Cloud, false);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch_forecast(
            &daemon,
            Some(&cloud as &dyn ObservationSource),
            &StationConfig::default(),
            &cancel,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 0);
    }
}
