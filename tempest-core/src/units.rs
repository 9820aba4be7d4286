//! Unit systems and the metric → imperial conversions used for display.
//!
//! Observations travel in metric (°C, m/s, hPa, mm, km) until a caller
//! asks for something else.

use std::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    #[default]
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }

    pub fn is_imperial(&self) -> bool {
        matches!(self, UnitSystem::Imperial)
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn pressure_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "hPa",
            UnitSystem::Imperial => "inHg",
        }
    }

    pub fn precip_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "mm",
            UnitSystem::Imperial => "in",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow!("units must be 'metric' or 'imperial', got '{value}'")),
        }
    }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * 2.236_936_292
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * 0.029_529_983
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / 25.4
}

pub fn km_to_miles(km: f64) -> f64 {
    km * 0.621_371_192
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass name for a wind direction in degrees.
pub fn wind_direction_to_compass(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Apparent temperature in °C.
///
/// Uses the NWS heat index when it is hot and humid, wind chill when it is
/// cold and windy, and the air temperature otherwise.
pub fn feels_like(temp_c: f64, humidity_pct: f64, wind_mps: f64) -> f64 {
    let temp_f = celsius_to_fahrenheit(temp_c);
    let wind_mph = mps_to_mph(wind_mps);

    if temp_f >= 80.0 && humidity_pct >= 40.0 {
        let rh = humidity_pct;
        let hi = -42.379 + 2.049_015_23 * temp_f + 10.143_331_27 * rh
            - 0.224_755_41 * temp_f * rh
            - 0.006_837_83 * temp_f * temp_f
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * temp_f * temp_f * rh
            + 0.000_852_82 * temp_f * rh * rh
            - 0.000_001_99 * temp_f * temp_f * rh * rh;
        return (hi - 32.0) * 5.0 / 9.0;
    }

    if temp_f <= 50.0 && wind_mph > 3.0 {
        let v = wind_mph.powf(0.16);
        let wc = 35.74 + 0.6215 * temp_f - 35.75 * v + 0.4275 * temp_f * v;
        return (wc - 32.0) * 5.0 / 9.0;
    }

    temp_c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn unit_system_roundtrip() {
        for units in UnitSystem::all() {
            let parsed = UnitSystem::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
        assert_eq!(UnitSystem::try_from("IMPERIAL").unwrap(), UnitSystem::Imperial);
    }

    #[test]
    fn unknown_units_error() {
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("'metric' or 'imperial'"));
    }

    #[test]
    fn conversions() {
        assert!(close(celsius_to_fahrenheit(0.0), 32.0));
        assert!(close(celsius_to_fahrenheit(100.0), 212.0));
        assert!(close(mps_to_mph(10.0), 22.369));
        assert!(close(hpa_to_inhg(1013.25), 29.921));
        assert!(close(mm_to_inches(25.4), 1.0));
        assert!(close(km_to_miles(10.0), 6.2137));
    }

    #[test]
    fn compass_points() {
        assert_eq!(wind_direction_to_compass(0.0), "N");
        assert_eq!(wind_direction_to_compass(359.0), "N");
        assert_eq!(wind_direction_to_compass(90.0), "E");
        assert_eq!(wind_direction_to_compass(200.0), "SSW");
        assert_eq!(wind_direction_to_compass(-90.0), "W");
    }

    #[test]
    fn feels_like_is_air_temperature_in_mild_weather() {
        assert_eq!(feels_like(18.0, 50.0, 2.0), 18.0);
    }

    #[test]
    fn feels_like_applies_wind_chill_and_heat_index() {
        assert!(feels_like(0.0, 50.0, 10.0) < 0.0);
        assert!(feels_like(35.0, 70.0, 1.0) > 35.0);
    }
}
