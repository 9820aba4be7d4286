use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::StationConfig,
    error::TempestError,
    http::HttpClient,
    model::{Forecast, ForecastDay, Observation, Station},
    units::{UnitSystem, feels_like},
};

use super::{ObservationQuery, ObservationSource, SourceKind};

pub const CLOUD_BASE_URL: &str = "https://swd.weatherflow.com/swd/rest/";

const TARGET: &str = "WeatherFlow API";

/// Direct access to the WeatherFlow REST API using the station's token.
#[derive(Debug, Clone)]
pub struct CloudSource {
    http: HttpClient,
    base: Url,
}

impl CloudSource {
    pub fn new(http: HttpClient) -> Result<Self, TempestError> {
        let base = Url::parse(CLOUD_BASE_URL).map_err(|e| TempestError::InvalidServerUrl {
            url: CLOUD_BASE_URL.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_base_url(http, base))
    }

    pub fn with_base_url(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    async fn device_observations(
        &self,
        station: &StationConfig,
        device_id: u64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, TempestError> {
        let path = format!("observations/device/{device_id}");
        let query = [
            ("time_start", start.timestamp().to_string()),
            ("time_end", end.timestamp().to_string()),
        ];

        let parsed: DeviceObservationsResponse = self
            .http
            .get_json(TARGET, &self.base, &path, &query, Some(station.token.as_str()))
            .await?;

        let mut observations: Vec<Observation> = parsed
            .obs
            .unwrap_or_default()
            .iter()
            .filter_map(|row| observation_from_row(row, station.station_id))
            .collect();
        observations.sort_by_key(|o| o.timestamp);

        debug!(
            device_id,
            count = observations.len(),
            "fetched device observations"
        );
        Ok(observations)
    }
}

// Column layout of Tempest `obs_st` rows.
const EPOCH: usize = 0;
const WIND_LULL: usize = 1;
const WIND_AVG: usize = 2;
const WIND_GUST: usize = 3;
const WIND_DIRECTION: usize = 4;
const STATION_PRESSURE: usize = 6;
const AIR_TEMPERATURE: usize = 7;
const RELATIVE_HUMIDITY: usize = 8;
const UV: usize = 10;
const SOLAR_RADIATION: usize = 11;
const RAIN_ACCUMULATION: usize = 12;
const LIGHTNING_AVG_DISTANCE: usize = 14;
const LIGHTNING_COUNT: usize = 15;
const BATTERY: usize = 16;

#[derive(Debug, Deserialize)]
struct DeviceObservationsResponse {
    #[serde(default)]
    obs: Option<Vec<Vec<Option<f64>>>>,
}

fn observation_from_row(row: &[Option<f64>], station_id: u64) -> Option<Observation> {
    let field = |i: usize| row.get(i).copied().flatten().unwrap_or(0.0);

    let epoch = row.get(EPOCH).copied().flatten()?;
    let timestamp = DateTime::from_timestamp(epoch as i64, 0)?;

    let mut obs = Observation::at(timestamp);
    obs.wind_lull = field(WIND_LULL);
    obs.wind_avg = field(WIND_AVG);
    obs.wind_gust = field(WIND_GUST);
    obs.wind_direction = field(WIND_DIRECTION);
    obs.station_pressure = field(STATION_PRESSURE);
    obs.air_temperature = field(AIR_TEMPERATURE);
    obs.relative_humidity = field(RELATIVE_HUMIDITY);
    obs.uv_index = field(UV);
    obs.solar_radiation = field(SOLAR_RADIATION);
    obs.rain_accumulation = field(RAIN_ACCUMULATION);
    obs.lightning_avg_distance = field(LIGHTNING_AVG_DISTANCE);
    obs.lightning_strike_count = field(LIGHTNING_COUNT).max(0.0) as u32;
    obs.battery = field(BATTERY);
    obs.feels_like = feels_like(obs.air_temperature, obs.relative_humidity, obs.wind_avg);
    obs.station_id = (station_id > 0).then_some(station_id);
    Some(obs)
}

#[derive(Debug, Deserialize)]
struct BetterForecastResponse {
    #[serde(default)]
    timezone_offset_minutes: i64,
    forecast: Option<BetterForecast>,
}

#[derive(Debug, Deserialize)]
struct BetterForecast {
    #[serde(default)]
    daily: Vec<BetterForecastDay>,
}

#[derive(Debug, Deserialize)]
struct BetterForecastDay {
    day_start_local: i64,
    air_temp_high: f64,
    air_temp_low: f64,
    #[serde(default)]
    conditions: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    precip_probability: u8,
    precip_type: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

impl BetterForecastResponse {
    fn into_forecast(self) -> Forecast {
        let offset = Duration::minutes(self.timezone_offset_minutes);
        let daily = self
            .forecast
            .map(|f| f.daily)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| {
                let start = DateTime::from_timestamp(d.day_start_local, 0)?;
                Some(ForecastDay {
                    date: (start + offset).date_naive(),
                    high_temp: d.air_temp_high,
                    low_temp: d.air_temp_low,
                    conditions: d.conditions,
                    icon: d.icon,
                    precip_chance: d.precip_probability,
                    precip_type: d.precip_type.filter(|t| !t.is_empty()),
                    sunrise: d.sunrise.and_then(|ts| DateTime::from_timestamp(ts, 0)),
                    sunset: d.sunset.and_then(|ts| DateTime::from_timestamp(ts, 0)),
                })
            })
            .collect();
        Forecast { daily }
    }
}

/// Latest readings from `observations/station/{id}`. Field names follow
/// the API; everything is metric.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StationObservation {
    timestamp: Option<i64>,
    air_temperature: f64,
    feels_like: f64,
    dew_point: f64,
    relative_humidity: f64,
    wind_avg: f64,
    wind_gust: f64,
    wind_lull: f64,
    wind_direction: f64,
    station_pressure: f64,
    sea_level_pressure: Option<f64>,
    pressure_trend: Option<String>,
    uv: f64,
    solar_radiation: f64,
    precip_accum_local_day: f64,
    lightning_strike_count_last_3hr: u32,
    lightning_strike_last_distance: f64,
}

#[derive(Debug, Deserialize)]
struct StationObservationResponse {
    #[serde(default)]
    obs: Vec<StationObservation>,
}

impl StationObservation {
    fn into_observation(self, station_id: u64) -> Option<Observation> {
        let timestamp = DateTime::from_timestamp(self.timestamp?, 0)?;
        let mut obs = Observation::at(timestamp);
        obs.air_temperature = self.air_temperature;
        obs.feels_like = self.feels_like;
        obs.dew_point = self.dew_point;
        obs.relative_humidity = self.relative_humidity;
        obs.wind_avg = self.wind_avg;
        obs.wind_gust = self.wind_gust;
        obs.wind_lull = self.wind_lull;
        obs.wind_direction = self.wind_direction;
        obs.station_pressure = self.station_pressure;
        obs.sea_level_pressure = self.sea_level_pressure;
        obs.pressure_trend = self.pressure_trend.filter(|t| !t.is_empty());
        obs.uv_index = self.uv;
        obs.solar_radiation = self.solar_radiation;
        obs.rain_accumulation = self.precip_accum_local_day;
        obs.lightning_strike_count = self.lightning_strike_count_last_3hr;
        obs.lightning_avg_distance = self.lightning_strike_last_distance;
        obs.station_id = Some(station_id);
        Some(obs)
    }
}

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Vec<Station>,
}

#[async_trait]
impl ObservationSource for CloudSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Cloud
    }

    async fn observations(
        &self,
        query: &ObservationQuery<'_>,
    ) -> Result<Vec<Observation>, TempestError> {
        // History is indexed by device; a station id alone cannot be queried.
        let device_id = query
            .station
            .device_id()
            .ok_or_else(|| TempestError::MissingDeviceId {
                station: query.station.display_name(),
            })?;

        self.device_observations(
            query.station,
            device_id,
            query.window.start(),
            query.window.end(),
        )
        .await
    }

    async fn forecast(&self, station: &StationConfig) -> Result<Forecast, TempestError> {
        let query = [
            ("station_id", station.station_id.to_string()),
            ("units_temp", "c".to_string()),
            ("units_wind", "mps".to_string()),
            ("units_pressure", "mb".to_string()),
            ("units_precip", "mm".to_string()),
            ("units_distance", "km".to_string()),
        ];

        let parsed: BetterForecastResponse = self
            .http
            .get_json(TARGET, &self.base, "better_forecast", &query, Some(station.token.as_str()))
            .await?;

        Ok(parsed.into_forecast())
    }

    async fn current(
        &self,
        station: &StationConfig,
        _units: UnitSystem,
    ) -> Result<Observation, TempestError> {
        let path = format!("observations/station/{}", station.station_id);
        let parsed: StationObservationResponse = self
            .http
            .get_json(TARGET, &self.base, &path, &[], Some(station.token.as_str()))
            .await?;

        parsed
            .obs
            .into_iter()
            .next()
            .and_then(|o| o.into_observation(station.station_id))
            .ok_or(TempestError::EmptyResponse { path })
    }

    async fn station(&self, station: &StationConfig) -> Result<Station, TempestError> {
        let path = format!("stations/{}", station.station_id);
        let parsed: StationsResponse = self
            .http
            .get_json(TARGET, &self.base, &path, &[], Some(station.token.as_str()))
            .await?;

        parsed
            .stations
            .into_iter()
            .next()
            .ok_or(TempestError::EmptyResponse { path })
    }
}
