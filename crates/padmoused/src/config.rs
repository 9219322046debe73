use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use padmouse_profile::{override_rules, DeviceOverride, ProfileError, ProfileTable};
use serde::Deserialize;
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "padmouse.yaml";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u8),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Startup state of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FilterSettings {
    /// `false` runs the pass-through filter.
    pub enabled: bool,
    pub virtual_mouse: bool,
    pub volume_mode: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            virtual_mouse: true,
            volume_mode: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Config {
    pub filter: FilterSettings,
    pub devices: Vec<DeviceOverride>,
    pub blacklist: Vec<String>,
}

impl Config {
    /// Built-in profiles with this config's classification overrides.
    pub(crate) fn profile_table(&self) -> Result<ProfileTable, ConfigError> {
        let extra = override_rules(&self.devices, &self.blacklist)?;
        Ok(ProfileTable::with_rules(extra)?)
    }
}

#[derive(Debug, Deserialize)]
struct Versioned {
    version: u8,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    #[serde(default)]
    filter: FilterSettings,
    #[serde(default)]
    devices: Vec<DeviceOverride>,
    #[serde(default)]
    blacklist: Vec<String>,
}

/// Parse a yaml config.
pub(crate) fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let version = serde_yaml::from_str::<Versioned>(input)?.version;
    match version {
        1 => {
            let raw: ConfigV1 = serde_yaml::from_str(input)?;
            Ok(Config {
                filter: raw.filter,
                devices: raw.devices,
                blacklist: raw.blacklist,
            })
        }
        _ => Err(ConfigError::UnsupportedVersion(version)),
    }
}

/// Load the config. A missing default file means defaults, a missing
/// explicit file is an error.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(input) => parse_config(&input),
        Err(e) if !explicit && e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}
