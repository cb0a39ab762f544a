//! Layered settings: defaults -> TOML file -> `NINITE_*` environment.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `NINITE_PROXY__SERVER=proxy.corp` or `NINITE_REMOTE__PASSWORD=...`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "NINITE";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_EXECUTABLE: &str = ".";

/// Values that rarely change between runs. Empty strings and a zero port mean "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// NinitePro.exe, or the directory containing it
    pub executable: String,
    pub locale: String,
    pub cache_path: String,
    pub proxy: ProxySettings,
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub username: String,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            locale: String::new(),
            cache_path: String::new(),
            proxy: ProxySettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the per-user default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&Settings::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Executable path with `~` expanded
    pub fn executable_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.executable).into_owned())
    }
}

/// `<config dir>/ninite-classic/config.toml` for the current user
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "Ninite", "ninite-classic")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
