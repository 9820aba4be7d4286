use std::{collections::BTreeMap, fmt::Write as _, io};

use anyhow::Result;
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};
use serde::Serialize;
use tempest_core::{
    Config, StationConfig, UnitSystem,
    config::redact_token,
    http::validate_server_url,
};

use crate::{output, settings::Settings};

#[derive(Debug, Serialize)]
struct RedactedStation<'a> {
    name: &'a str,
    station_id: u64,
    device_id: u64,
    token: String,
}

#[derive(Debug, Serialize)]
struct RedactedConfig<'a> {
    config_file: String,
    default_station: Option<&'a str>,
    units: UnitSystem,
    server: Option<&'a str>,
    stations: BTreeMap<&'a str, RedactedStation<'a>>,
}

impl<'a> RedactedConfig<'a> {
    fn new(settings: &'a Settings) -> Self {
        let config = &settings.config;
        let stations = config
            .stations
            .iter()
            .map(|(key, station)| {
                (
                    key.as_str(),
                    RedactedStation {
                        name: &station.name,
                        station_id: station.station_id,
                        device_id: station.device_id,
                        token: redact_token(&station.token),
                    },
                )
            })
            .collect();

        Self {
            config_file: settings.config_path.display().to_string(),
            default_station: config.default_station.as_deref(),
            units: settings.units,
            server: config.effective_server_url(),
            stations,
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Config file:     {}", self.config_file);
        let _ = writeln!(
            out,
            "Default station: {}",
            self.default_station.unwrap_or("(none)")
        );
        let _ = writeln!(out, "Units:           {}", self.units);
        let _ = writeln!(out, "Server:          {}", self.server.unwrap_or("(cloud API)"));

        if self.stations.is_empty() {
            out.push_str("\nNo stations configured. Run `tempest config init` to add one.\n");
            return out;
        }

        for (key, station) in &self.stations {
            let _ = writeln!(out, "\n[{key}]");
            if !station.name.is_empty() {
                let _ = writeln!(out, "  name:       {}", station.name);
            }
            let _ = writeln!(out, "  station_id: {}", station.station_id);
            if station.device_id > 0 {
                let _ = writeln!(out, "  device_id:  {}", station.device_id);
            }
            let _ = writeln!(out, "  token:      {}", station.token);
        }
        out
    }
}

/// `config show`: effective configuration with every token redacted.
pub fn show(settings: &Settings) -> Result<()> {
    let view = RedactedConfig::new(settings);
    if settings.json {
        output::write_json(io::stdout().lock(), &view)
    } else {
        print!("{}", view.render());
        Ok(())
    }
}

/// `config init`: prompts for one station and writes the config file.
///
/// Starts from the file on disk, not the env-overridden view, so
/// `TEMPEST_TOKEN` and friends never get persisted.
pub fn init(settings: &Settings) -> Result<()> {
    let path = &settings.config_path;
    let mut config = Config::load_from(path)?;

    println!("Configuring tempest ({})", path.display());

    let key = Text::new("Station key:")
        .with_default("home")
        .with_help_message("Short name used with --station")
        .prompt()?;

    let existing = config.stations.get(&key).cloned().unwrap_or_default();

    let token = Password::new("API token:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Create one at https://tempestwx.com/settings/tokens")
        .prompt()?;
    let token = if token.trim().is_empty() {
        existing.token.clone()
    } else {
        token.trim().to_string()
    };

    let station_id = CustomType::<u64>::new("Station ID:")
        .with_error_message("Please enter a numeric station ID")
        .with_default(existing.station_id)
        .prompt()?;

    let device_id = CustomType::<u64>::new("Device ID (0 to skip, needed for history):")
        .with_error_message("Please enter a numeric device ID")
        .with_default(existing.device_id)
        .prompt()?;

    let name = Text::new("Display name:")
        .with_default(if existing.name.is_empty() { &key } else { &existing.name })
        .prompt()?;

    let current_units = config.unit_system().unwrap_or_default();
    let start = UnitSystem::all()
        .iter()
        .position(|u| *u == current_units)
        .unwrap_or(0);
    let units = Select::new("Units:", UnitSystem::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    let server = Text::new("tempestd server URL (leave empty for the cloud API):")
        .with_initial_value(config.effective_server_url().unwrap_or(""))
        .prompt_skippable()?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(server) = &server {
        validate_server_url(server)?;
    }

    let make_default = config.default_station.as_deref() != Some(key.as_str())
        && !config.stations.is_empty()
        && Confirm::new(&format!("Make '{key}' the default station?"))
            .with_default(true)
            .prompt()?;

    config.upsert_station(
        key.clone(),
        StationConfig {
            token,
            station_id,
            device_id,
            name,
        },
    );
    if make_default {
        config.default_station = Some(key);
    }
    config.units = Some(units.as_str().to_string());
    config.tempestd.server = server;
    config.server = None;

    config.validate()?;
    config.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
