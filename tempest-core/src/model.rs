use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::units::{
    UnitSystem, celsius_to_fahrenheit, hpa_to_inhg, km_to_miles, mm_to_inches, mps_to_mph,
};

/// A single point-in-time reading from a station device.
///
/// Numeric fields are metric unless the value came out of
/// [`Observation::converted`] or from a daemon asked for imperial units.
/// Missing fields decode as zero so older daemons and partial rows still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub air_temperature: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub dew_point: f64,
    #[serde(default)]
    pub relative_humidity: f64,
    #[serde(default)]
    pub wind_avg: f64,
    #[serde(default)]
    pub wind_gust: f64,
    #[serde(default)]
    pub wind_lull: f64,
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub station_pressure: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level_pressure: Option<f64>,
    /// `rising`, `falling` or `steady`, when the source reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_trend: Option<String>,
    #[serde(default)]
    pub rain_accumulation: f64,
    #[serde(default)]
    pub uv_index: f64,
    #[serde(default)]
    pub solar_radiation: f64,
    #[serde(default)]
    pub lightning_strike_count: u32,
    #[serde(default)]
    pub lightning_avg_distance: f64,
    #[serde(default)]
    pub battery: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<u64>,
}

impl Observation {
    /// An observation at `timestamp` with every reading zeroed.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            air_temperature: 0.0,
            feels_like: 0.0,
            dew_point: 0.0,
            relative_humidity: 0.0,
            wind_avg: 0.0,
            wind_gust: 0.0,
            wind_lull: 0.0,
            wind_direction: 0.0,
            station_pressure: 0.0,
            sea_level_pressure: None,
            pressure_trend: None,
            rain_accumulation: 0.0,
            uv_index: 0.0,
            solar_radiation: 0.0,
            lightning_strike_count: 0,
            lightning_avg_distance: 0.0,
            battery: 0.0,
            station_id: None,
        }
    }

    /// Returns a copy of this metric observation expressed in `units`.
    pub fn converted(&self, units: UnitSystem) -> Observation {
        match units {
            UnitSystem::Metric => self.clone(),
            UnitSystem::Imperial => Observation {
                air_temperature: celsius_to_fahrenheit(self.air_temperature),
                feels_like: celsius_to_fahrenheit(self.feels_like),
                dew_point: celsius_to_fahrenheit(self.dew_point),
                wind_avg: mps_to_mph(self.wind_avg),
                wind_gust: mps_to_mph(self.wind_gust),
                wind_lull: mps_to_mph(self.wind_lull),
                station_pressure: hpa_to_inhg(self.station_pressure),
                sea_level_pressure: self.sea_level_pressure.map(hpa_to_inhg),
                rain_accumulation: mm_to_inches(self.rain_accumulation),
                lightning_avg_distance: km_to_miles(self.lightning_avg_distance),
                ..self.clone()
            },
        }
    }
}

/// Multi-day forecast for a station. Temperatures are °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub daily: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar day. Decodes from `YYYY-MM-DD` or from an RFC3339 instant,
    /// keeping the date in the instant's own offset.
    #[serde(deserialize_with = "date_or_instant")]
    pub date: NaiveDate,
    pub high_temp: f64,
    pub low_temp: f64,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub precip_chance: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<Utc>>,
}

fn date_or_instant<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(instant.date_naive());
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| de::Error::custom(format!("invalid date '{raw}'")))
}

/// Station metadata as reported by a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub station_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn converted_to_imperial_leaves_source_untouched() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let mut obs = Observation::at(ts);
        obs.air_temperature = 20.0;
        obs.wind_avg = 5.0;
        obs.relative_humidity = 55.0;
        obs.rain_accumulation = 2.54;

        let imperial = obs.converted(UnitSystem::Imperial);

        assert_eq!(obs.air_temperature, 20.0);
        assert!((imperial.air_temperature - 68.0).abs() < 1e-9);
        assert!((imperial.wind_avg - 11.18468).abs() < 1e-4);
        assert!((imperial.rain_accumulation - 0.1).abs() < 1e-9);
        assert_eq!(imperial.relative_humidity, 55.0);
        assert_eq!(imperial.timestamp, ts);
    }

    #[test]
    fn metric_conversion_is_identity() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let mut obs = Observation::at(ts);
        obs.air_temperature = 12.5;
        assert_eq!(obs.converted(UnitSystem::Metric), obs);
    }

    #[test]
    fn observation_decodes_tolerantly() {
        let json = r#"{
            "timestamp": "2024-06-15T12:00:00Z",
            "air_temperature": 21.5,
            "station_id": 1001,
            "something_new": [1, 2, 3]
        }"#;

        let obs: Observation = serde_json::from_str(json).expect("decode");
        assert_eq!(obs.air_temperature, 21.5);
        assert_eq!(obs.station_id, Some(1001));
        assert_eq!(obs.battery, 0.0);
        assert_eq!(obs.sea_level_pressure, None);
    }

    #[test]
    fn timestamps_roundtrip_through_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 34, 56).unwrap();
        let json = serde_json::to_string(&Observation::at(ts)).unwrap();
        assert!(json.contains("\"2024-06-15T12:34:56Z\""));

        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, ts);
    }

    #[test]
    fn forecast_dates_accept_plain_days_and_instants() {
        let days: Vec<ForecastDay> = serde_json::from_str(
            r#"[
                { "date": "2024-01-15", "high_temp": 20.0, "low_temp": 10.0 },
                { "date": "2024-01-16T00:00:00Z", "high_temp": 21.0, "low_temp": 11.0 },
                { "date": "2024-01-17T00:00:00-07:00", "high_temp": 22.0, "low_temp": 12.0 }
            ]"#,
        )
        .expect("decode");

        let dates: Vec<String> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-01-15", "2024-01-16", "2024-01-17"]);

        let json = serde_json::to_value(&days[1]).unwrap();
        assert_eq!(json["date"], "2024-01-16");
    }

    #[test]
    fn forecast_date_rejects_garbage() {
        let err = serde_json::from_str::<ForecastDay>(
            r#"{ "date": "next tuesday", "high_temp": 1.0, "low_temp": 0.0 }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn dew_point_converts_with_temperatures() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let mut obs = Observation::at(ts);
        obs.dew_point = 10.0;
        obs.pressure_trend = Some("rising".into());

        let imperial = obs.converted(UnitSystem::Imperial);
        assert!((imperial.dew_point - 50.0).abs() < 1e-9);
        assert_eq!(imperial.pressure_trend.as_deref(), Some("rising"));
    }
}
