use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempest_core::{
    Config, StationConfig, UnitSystem, Url,
    config::is_world_readable,
    http::validate_server_url,
};
use tracing::{debug, warn};

use crate::{cli::GlobalArgs, theme::Theme};

/// Config file plus flags, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub config_path: PathBuf,
    pub station_name: Option<String>,
    pub units: UnitSystem,
    /// Set when a valid daemon URL came from a flag, env or the config file.
    pub server_url: Option<Url>,
    pub json: bool,
    /// Off with `--no-color` or `NO_COLOR`.
    pub color: bool,
    pub emoji: bool,
}

impl Settings {
    pub fn resolve(globals: &GlobalArgs) -> Result<Self> {
        let (config, config_path) = Self::load(globals)?;
        Self::from_parts(config, config_path, globals)
    }

    /// Like [`Settings::resolve`], but unusable units in the file are
    /// dropped with a warning. `config init` is how such a file gets fixed.
    pub fn resolve_lenient(globals: &GlobalArgs) -> Result<Self> {
        let (config, config_path) = Self::load(globals)?;
        Self::from_parts(forget_bad_units(config, &config_path), config_path, globals)
    }

    fn load(globals: &GlobalArgs) -> Result<(Config, PathBuf)> {
        let (config, config_path) = Config::load(globals.config.as_deref())?;

        if config_path.exists() && is_world_readable(&config_path) {
            warn!(
                path = %config_path.display(),
                "config file is readable by other users; consider `chmod 600` since it holds API tokens"
            );
        }
        Ok((config, config_path))
    }

    fn from_parts(config: Config, config_path: PathBuf, globals: &GlobalArgs) -> Result<Self> {
        let units = match globals.units {
            Some(units) => units,
            None => config
                .unit_system()
                .with_context(|| format!("invalid units in {}", config_path.display()))?,
        };
        let server_url = server_url(globals.server.as_deref(), &config);
        debug!(?units, server = ?server_url.as_ref().map(Url::as_str), "settings resolved");

        Ok(Self {
            station_name: globals.station.clone().filter(|s| !s.is_empty()),
            units,
            server_url,
            json: globals.json,
            color: !globals.no_color,
            emoji: !globals.no_emoji,
            config,
            config_path,
        })
    }

    /// The selected station, or the default one.
    pub fn station(&self) -> Result<&StationConfig> {
        self.config
            .resolve_station(self.station_name.as_deref())
            .context("no usable station; run `tempest config show` to inspect the configuration")
    }

    /// Colour only reaches a terminal; piped output stays plain.
    pub fn theme(&self) -> Theme {
        Theme::new(self.color && io::stdout().is_terminal(), self.emoji)
    }
}

fn forget_bad_units(mut config: Config, path: &Path) -> Config {
    if let Err(err) = config.unit_system() {
        warn!(path = %path.display(), error = %err, "ignoring invalid units in config file");
        config.units = None;
    }
    config
}

/// The flag wins over the config file. Invalid URLs are dropped with a
/// warning so commands fall back to the cloud API.
fn server_url(flag: Option<&str>, config: &Config) -> Option<Url> {
    let raw = flag
        .filter(|s| !s.is_empty())
        .or(config.effective_server_url())?;

    match validate_server_url(raw) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(url = raw, error = %err, "ignoring invalid tempestd server URL");
            None
        }
    }
}
