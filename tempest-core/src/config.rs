use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, fs, path::Path, path::PathBuf};

use crate::units::UnitSystem;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "TEMPEST_CONFIG";

/// Per-station settings: who to ask and with which credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub station_id: u64,
    /// Sensor unit id; history is indexed by device. Zero means unset.
    #[serde(default)]
    pub device_id: u64,
    #[serde(default)]
    pub name: String,
}

impl StationConfig {
    pub fn device_id(&self) -> Option<u64> {
        (self.device_id > 0).then_some(self.device_id)
    }

    /// Human name, falling back to the numeric station id.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("station {}", self.station_id)
        } else {
            self.name.clone()
        }
    }
}

/// Settings for the local `tempestd` daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_station = "home"
/// units = "imperial"
///
/// [tempestd]
/// server = "http://localhost:8080"
///
/// [stations.home]
/// token = "..."
/// station_id = 1001
/// device_id = 2002
/// name = "Home"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_station: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    /// Flat alias of `tempestd.server`, still read for older files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "DaemonConfig::is_empty")]
    pub tempestd: DaemonConfig,

    #[serde(default)]
    pub stations: BTreeMap<String, StationConfig>,
}

impl DaemonConfig {
    fn is_empty(&self) -> bool {
        self.server.is_none()
    }
}

impl Config {
    /// Load from `path`, `$TEMPEST_CONFIG`, or the platform default, in that
    /// order, then apply the `TEMPEST_*` station overrides.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
                Some(p) => PathBuf::from(p),
                None => Self::config_file_path()?,
            },
        };

        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides();
        Ok((cfg, path))
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        restrict_permissions(path)?;
        Ok(())
    }

    /// Default path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "tempest", "tempest")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            env::var("TEMPEST_TOKEN").ok(),
            env::var("TEMPEST_STATION_ID").ok(),
            env::var("TEMPEST_DEVICE_ID").ok(),
        );
    }

    /// Overrides token and ids of the default station, creating a station
    /// named `default` if none is set. Unparseable ids are ignored.
    pub fn apply_overrides(
        &mut self,
        token: Option<String>,
        station_id: Option<String>,
        device_id: Option<String>,
    ) {
        let token = token.filter(|s| !s.is_empty());
        let station_id = station_id.filter(|s| !s.is_empty());
        let device_id = device_id.filter(|s| !s.is_empty());
        if token.is_none() && station_id.is_none() && device_id.is_none() {
            return;
        }

        let name = self
            .default_station
            .get_or_insert_with(|| "default".to_string())
            .clone();
        let sc = self.stations.entry(name).or_default();

        if let Some(token) = token {
            sc.token = token;
        }
        if let Some(id) = station_id.and_then(|s| s.trim().parse().ok()) {
            sc.station_id = id;
        }
        if let Some(id) = device_id.and_then(|s| s.trim().parse().ok()) {
            sc.device_id = id;
        }
    }

    /// Checks for required fields.
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            bail!("no stations configured; run `tempest config init` to set up");
        }
        if let Some(default) = &self.default_station {
            if !self.stations.contains_key(default) {
                bail!("default_station '{default}' not found in stations");
            }
        }
        self.unit_system()?;
        Ok(())
    }

    /// Station by name, else the default, else the first one configured.
    pub fn resolve_station(&self, name: Option<&str>) -> Result<&StationConfig> {
        let name = name
            .filter(|n| !n.is_empty())
            .or(self.default_station.as_deref().filter(|n| !n.is_empty()));

        let name = match name {
            Some(name) => name,
            None => self.stations.keys().next().map(String::as_str).ok_or_else(|| {
                anyhow!("no stations configured; run `tempest config init` to set up")
            })?,
        };

        self.stations.get(name).ok_or_else(|| {
            anyhow!(
                "station '{name}' not found; available: {}",
                self.station_names().join(", ")
            )
        })
    }

    /// Sorted station names.
    pub fn station_names(&self) -> Vec<&str> {
        self.stations.keys().map(String::as_str).collect()
    }

    /// Configured unit system, imperial when unset.
    pub fn unit_system(&self) -> Result<UnitSystem> {
        match self.units.as_deref().filter(|u| !u.is_empty()) {
            Some(u) => UnitSystem::try_from(u),
            None => Ok(UnitSystem::default()),
        }
    }

    /// Server URL from `tempestd.server`, falling back to the flat `server` key.
    pub fn effective_server_url(&self) -> Option<&str> {
        self.tempestd
            .server
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.server.as_deref().filter(|s| !s.is_empty()))
    }

    /// Convenience helper: insert/replace a station and make it the default
    /// if there is none yet.
    pub fn upsert_station(&mut self, key: String, station: StationConfig) {
        if self.default_station.is_none() {
            self.default_station = Some(key.clone());
        }
        self.stations.insert(key, station);
    }
}

/// First four characters followed by `****`.
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(4) {
        Some((idx, _)) => format!("{}****", &token[..idx]),
        None => "****".to_string(),
    }
}

/// Whether a config file at `path` is readable by group or others.
#[cfg(unix)]
pub fn is_world_readable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o044 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_world_readable(_path: &Path) -> bool {
    false
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
