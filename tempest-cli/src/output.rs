//! JSON documents printed by `--json`.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tempest_core::{
    Current, Forecast, History, Observation, StationConfig, StationStatus, UnitSystem,
    units::wind_direction_to_compass,
};

use crate::display::display_temp;

#[derive(Debug, Serialize)]
pub struct StationInfo {
    pub name: String,
    pub station_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u64>,
}

impl From<&StationConfig> for StationInfo {
    fn from(station: &StationConfig) -> Self {
        Self {
            name: station.display_name(),
            station_id: station.station_id,
            device_id: station.device_id(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryDocument {
    pub station: StationInfo,
    pub units: UnitSystem,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub resolution: String,
    pub source: &'static str,
    pub observations: Vec<HistoryRow>,
}

#[derive(Debug, Serialize)]
pub struct HistoryRow {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_direction: f64,
    pub wind_direction_cardinal: &'static str,
    pub pressure: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sea_level_pressure: Option<f64>,
    pub rain: f64,
    pub uv_index: f64,
    pub solar_radiation: f64,
    pub lightning_strike_count: u32,
}

impl From<&Observation> for HistoryRow {
    fn from(obs: &Observation) -> Self {
        Self {
            timestamp: obs.timestamp,
            temperature: obs.air_temperature,
            feels_like: obs.feels_like,
            humidity: obs.relative_humidity,
            wind_speed: obs.wind_avg,
            wind_gust: obs.wind_gust,
            wind_direction: obs.wind_direction,
            wind_direction_cardinal: wind_direction_to_compass(obs.wind_direction),
            pressure: obs.station_pressure,
            sea_level_pressure: obs.sea_level_pressure,
            rain: obs.rain_accumulation,
            uv_index: obs.uv_index,
            solar_radiation: obs.solar_radiation,
            lightning_strike_count: obs.lightning_strike_count,
        }
    }
}

impl HistoryDocument {
    pub fn new(history: &History, station: &StationConfig) -> Self {
        Self {
            station: station.into(),
            units: history.units,
            from: history.window.start(),
            to: history.window.end(),
            resolution: history.resolution.label(),
            source: history.source.as_str(),
            observations: history.observations.iter().map(HistoryRow::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastDocument {
    pub station: StationInfo,
    pub units: UnitSystem,
    pub daily: Vec<ForecastRow>,
}

#[derive(Debug, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub high_temp: f64,
    pub low_temp: f64,
    pub conditions: String,
    pub icon: String,
    pub precip_chance: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
}

impl ForecastDocument {
    pub fn new(
        forecast: &Forecast,
        days: usize,
        units: UnitSystem,
        station: &StationConfig,
    ) -> Self {
        let daily = forecast
            .daily
            .iter()
            .take(days)
            .map(|day| ForecastRow {
                date: day.date,
                high_temp: display_temp(day.high_temp, units),
                low_temp: display_temp(day.low_temp, units),
                conditions: day.conditions.clone(),
                icon: day.icon.clone(),
                precip_chance: day.precip_chance,
                precip_type: day.precip_type.clone(),
                sunrise: day.sunrise,
                sunset: day.sunset,
            })
            .collect();

        Self {
            station: station.into(),
            units,
            daily,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentDocument {
    pub station: StationInfo,
    pub units: UnitSystem,
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub dew_point: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_lull: f64,
    pub wind_direction: f64,
    pub wind_direction_cardinal: &'static str,
    /// Sea-level pressure when the source reports it, station pressure otherwise.
    pub pressure: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure_trend: Option<String>,
    pub uv_index: f64,
    pub solar_radiation: f64,
    pub rain_today: f64,
    pub lightning_count: u32,
    pub lightning_distance: f64,
    pub battery: f64,
}

impl CurrentDocument {
    pub fn new(current: &Current, station: &StationConfig) -> Self {
        let obs = &current.observation;
        Self {
            station: StationInfo {
                name: current.station_name(station),
                ..StationInfo::from(station)
            },
            units: current.units,
            source: current.source.as_str(),
            timestamp: obs.timestamp,
            temperature: obs.air_temperature,
            feels_like: obs.feels_like,
            dew_point: obs.dew_point,
            humidity: obs.relative_humidity,
            wind_speed: obs.wind_avg,
            wind_gust: obs.wind_gust,
            wind_lull: obs.wind_lull,
            wind_direction: obs.wind_direction,
            wind_direction_cardinal: wind_direction_to_compass(obs.wind_direction),
            pressure: obs.sea_level_pressure.unwrap_or(obs.station_pressure),
            pressure_trend: obs.pressure_trend.clone(),
            uv_index: obs.uv_index,
            solar_radiation: obs.solar_radiation,
            rain_today: obs.rain_accumulation,
            lightning_count: obs.lightning_strike_count,
            lightning_distance: obs.lightning_avg_distance,
            battery: obs.battery,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StationRow {
    pub name: String,
    pub key: String,
    pub station_id: u64,
    pub device_id: u64,
    pub default: bool,
    pub status: &'static str,
    pub last_observation: Option<DateTime<Utc>>,
}

impl From<&StationStatus> for StationRow {
    fn from(status: &StationStatus) -> Self {
        Self {
            name: status.name.clone(),
            key: status.key.clone(),
            station_id: status.station_id,
            device_id: status.device_id,
            default: status.is_default,
            status: if status.online { "online" } else { "offline" },
            last_observation: status.last_observed,
        }
    }
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value).context("Failed to encode JSON output")?;
    writeln!(out)?;
    Ok(())
}
