use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;

/// The single tracked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable identifier used to key persisted state.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            id: "armonk".to_string(),
            name: "Armonk".to_string(),
            latitude: 41.1265,
            longitude: -73.7140,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// refresh_interval_secs = 3600
///
/// [location]
/// id = "armonk"
/// name = "Armonk"
/// latitude = 41.1265
/// longitude = -73.714
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub refresh_interval_secs: u64,
    /// Overrides the platform data directory for the rain-day state file.
    pub state_file: Option<PathBuf>,
    pub location: Location,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            state_file: None,
            location: Location::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.location.id.trim().is_empty() {
            return Err(anyhow!("location.id must not be empty"));
        }
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(anyhow!("location.latitude {} is out of range", self.location.latitude));
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(anyhow!("location.longitude {} is out of range", self.location.longitude));
        }
        if self.refresh_interval_secs == 0 {
            return Err(anyhow!("refresh_interval_secs must be greater than zero"));
        }
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "raintrack", "raintrack")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the rain-day state file, honouring `state_file` when set.
    pub fn state_file_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("state.json")),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment if set, otherwise from the file.
    pub fn effective_api_key(&self) -> Option<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }
}

fn pick_api_key(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_file.filter(|key| !key.trim().is_empty()).map(str::to_string))
}
