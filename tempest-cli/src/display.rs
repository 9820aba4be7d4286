//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use tempest_core::{
    Current, Forecast, History, Observation, StationStatus, UnitSystem,
    units::{celsius_to_fahrenheit, wind_direction_to_compass},
};

use crate::theme::{Theme, battery_label, uv_label};

pub fn format_temp(value: f64, units: UnitSystem) -> String {
    format!("{value:.1}{}", units.temperature_unit())
}

pub fn format_wind(speed: f64, direction: f64, units: UnitSystem) -> String {
    format!(
        "{speed:.1} {} {}",
        units.speed_unit(),
        wind_direction_to_compass(direction)
    )
}

pub fn format_pressure(value: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Imperial => format!("{value:.2} {}", units.pressure_unit()),
        UnitSystem::Metric => format!("{value:.1} {}", units.pressure_unit()),
    }
}

pub fn format_precip(value: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Imperial => format!("{value:.2} {}", units.precip_unit()),
        UnitSystem::Metric => format!("{value:.1} {}", units.precip_unit()),
    }
}

pub fn format_distance(km_or_miles: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Imperial => format!("{km_or_miles:.1} mi"),
        UnitSystem::Metric => format!("{km_or_miles:.1} km"),
    }
}

/// Compact age of a reading: `42s`, `7m`, `2h 5m`, `3d`.
pub fn time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => match (s / 3600, s % 3600 / 60) {
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h {m}m"),
        },
        s => format!("{}d", s / 86_400),
    }
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%m-%d %H:%M").to_string()
}

/// Observation table with a one-line summary header.
pub fn render_history(history: &History, station: &str, theme: &Theme) -> String {
    let units = history.units;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}: {} observations ({}, {})",
        theme.title(station),
        history.observations.len(),
        history.resolution,
        history.source
    );

    if history.observations.is_empty() {
        out.push_str("No observations in this time range.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<12} {:>8} {:>10} {:>5} {:>16} {:>12} {:>9} {:>5}",
        "Time", "Temp", "Feels Like", "Hum%", "Wind", "Pressure", "Rain", "UV"
    );
    for obs in &history.observations {
        let _ = writeln!(out, "{}", history_row(obs, units, theme));
    }
    out
}

/// Cells are padded before they are painted so escape codes never skew
/// the columns.
fn history_row(obs: &Observation, units: UnitSystem, theme: &Theme) -> String {
    let temp = format!("{:>8}", format_temp(obs.air_temperature, units));
    let feels = format!("{:>10}", format_temp(obs.feels_like, units));
    format!(
        "{:<12} {} {} {:>4.0}% {:>16} {:>12} {} {}",
        local_time(obs.timestamp),
        theme.temperature(obs.air_temperature, units, &temp),
        theme.temperature(obs.feels_like, units, &feels),
        obs.relative_humidity,
        format_wind(obs.wind_avg, obs.wind_direction, units),
        format_pressure(obs.station_pressure, units),
        theme.rain(
            obs.rain_accumulation,
            units,
            &format!("{:>9}", format_precip(obs.rain_accumulation, units))
        ),
        theme.uv(obs.uv_index, &format!("{:>5.1}", obs.uv_index)),
    )
}

/// Forecast temperatures arrive in Celsius.
pub fn display_temp(celsius: f64, units: UnitSystem) -> f64 {
    if units.is_imperial() {
        celsius_to_fahrenheit(celsius)
    } else {
        celsius
    }
}

/// First `days` forecast days as a table.
pub fn render_forecast(
    forecast: &Forecast,
    days: usize,
    units: UnitSystem,
    station: &str,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {days}-day forecast\n", theme.title(station));

    if forecast.daily.is_empty() {
        out.push_str("No forecast data available.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>8} {:>7}  {}",
        "Day", "High", "Low", "Precip", "Conditions"
    );
    for day in forecast.daily.iter().take(days) {
        let precip = match &day.precip_type {
            Some(kind) if day.precip_chance > 0 => format!("{}% {kind}", day.precip_chance),
            _ => format!("{}%", day.precip_chance),
        };
        let high = display_temp(day.high_temp, units);
        let low = display_temp(day.low_temp, units);
        let _ = writeln!(
            out,
            "{:<14} {} {} {:>7}  {} {}",
            day.date.format("%a %b %d"),
            theme.temperature(high, units, &format!("{:>8}", format_temp(high, units))),
            theme.temperature(low, units, &format!("{:>8}", format_temp(low, units))),
            precip,
            theme.condition_icon(&day.icon),
            day.conditions,
        );
    }
    out
}

/// Current conditions card: header, temperature line, then one labelled
/// reading per line.
pub fn render_current(
    current: &Current,
    station: &str,
    theme: &Theme,
    now: DateTime<Utc>,
) -> String {
    let obs = &current.observation;
    let units = current.units;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  {}\n",
        theme.title(station),
        theme.muted(&format!("Updated {} ago", time_ago(obs.timestamp, now)))
    );

    let temp = format_temp(obs.air_temperature, units);
    let feels = format_temp(obs.feels_like, units);
    let _ = writeln!(
        out,
        "{}  {}{}\n",
        theme.title(&theme.temperature(obs.air_temperature, units, &temp)),
        theme.muted("Feels like "),
        theme.temperature(obs.feels_like, units, &feels)
    );

    let arrow = theme.wind_arrow(obs.wind_direction);
    let mut wind = format_wind(obs.wind_avg, obs.wind_direction, units);
    if !arrow.is_empty() {
        wind.push(' ');
        wind.push_str(arrow);
    }

    let pressure_value = obs.sea_level_pressure.unwrap_or(obs.station_pressure);
    let mut pressure = format_pressure(pressure_value, units);
    if let Some(trend) = obs.pressure_trend.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(pressure, " ({trend})");
    }

    let lightning = match obs.lightning_strike_count {
        0 => "none".to_string(),
        n if obs.lightning_avg_distance > 0.0 => format!(
            "{n} strikes {} avg",
            format_distance(obs.lightning_avg_distance, units)
        ),
        n => format!("{n} strikes"),
    };

    let battery = if obs.battery > 0.0 {
        theme.battery(
            obs.battery,
            &format!("{:.2} V ({})", obs.battery, battery_label(obs.battery)),
        )
    } else {
        theme.muted("N/A")
    };

    let rows = [
        (
            "Humidity",
            theme.humidity(obs.relative_humidity, &format!("{:.0}%", obs.relative_humidity)),
        ),
        (
            "Dew Point",
            theme.temperature(obs.dew_point, units, &format_temp(obs.dew_point, units)),
        ),
        ("Wind", theme.wind(obs.wind_avg, units, &wind)),
        (
            "Wind Gust",
            theme.wind(obs.wind_gust, units, &format_speed(obs.wind_gust, units)),
        ),
        (
            "Wind Lull",
            theme.wind(obs.wind_lull, units, &format_speed(obs.wind_lull, units)),
        ),
        ("Pressure", theme.pressure(pressure_value, units, &pressure)),
        (
            "UV Index",
            theme.uv(obs.uv_index, &format!("{:.1} ({})", obs.uv_index, uv_label(obs.uv_index))),
        ),
        ("Solar Radiation", format!("{:.0} W/m²", obs.solar_radiation)),
        (
            "Rain Today",
            theme.rain(
                obs.rain_accumulation,
                units,
                &format_precip(obs.rain_accumulation, units),
            ),
        ),
        (
            "Lightning (3hr)",
            theme.lightning(obs.lightning_strike_count, &lightning),
        ),
        ("Battery", battery),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<17}{value}");
    }
    out
}

fn format_speed(speed: f64, units: UnitSystem) -> String {
    format!("{speed:.1} {}", units.speed_unit())
}

/// Station table for `stations`; the default station is starred.
pub fn render_stations(statuses: &[StationStatus], theme: &Theme, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", theme.title("Stations"));
    let _ = writeln!(
        out,
        "  {:<12} {:<20} {:>8} {:>8} {:<8} {}",
        "Name", "Station", "SID", "DID", "Status", "Last Seen"
    );

    for status in statuses {
        let state = if status.online {
            theme.online(&format!("{:<8}", "Online"))
        } else {
            theme.offline(&format!("{:<8}", "Offline"))
        };
        let last_seen = match status.last_observed {
            Some(ts) => format!("{} ago", time_ago(ts, now)),
            None => theme.muted("never"),
        };
        let _ = writeln!(
            out,
            "{} {:<12} {:<20} {:>8} {:>8} {state} {last_seen}",
            if status.is_default { '*' } else { ' ' },
            status.key,
            truncate(&status.name, 20),
            status.station_id,
            status.device_id,
        );
    }
    out
}

/// Cuts `text` to `width` characters, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}
