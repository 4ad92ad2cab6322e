//! Runtime configuration.
//!
//! Layers, lowest first: built-in defaults, an optional YAML file, then
//! `SWEEPER_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use perceiver_pattern::PatternProfile;
use serde::{Deserialize, Serialize};
use sweeper_scheduler::{ObserverOptions, ObserverTimings};

use crate::errors::SweeperError;

pub const ENV_PREFIX: &str = "SWEEPER";
const LOCAL_CONFIG: &str = "config/sweeper.yaml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Element id scanned and observed for mutations.
    pub container_id: String,
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub stability_window_ms: u64,
    /// Where the two observer toggles are persisted.
    pub settings_path: Option<PathBuf>,
    /// Port of the HTTP control surface; 0 disables it.
    pub control_port: u16,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        let timings = ObserverTimings::default();
        Self {
            container_id: PatternProfile::default().container_id,
            debounce_ms: timings.debounce.as_millis() as u64,
            poll_interval_ms: timings.poll_interval.as_millis() as u64,
            stability_window_ms: timings.stability_window.as_millis() as u64,
            settings_path: None,
            control_port: 0,
        }
    }
}

impl SweeperConfig {
    /// Loads the layered configuration. `explicit` must exist when given; the
    /// default locations are optional. Returns the file that was used, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), SweeperError> {
        let mut builder = Config::builder();
        let source = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(SweeperError::MissingConfig(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => default_config_path(),
        };
        if let Some(path) = &source {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: SweeperConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok((config, source))
    }

    pub fn validate(&self) -> Result<(), SweeperError> {
        if self.container_id.trim().is_empty() {
            return Err(SweeperError::InvalidConfig(
                "container_id must not be empty".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SweeperError::InvalidConfig(
                "poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn profile(&self) -> PatternProfile {
        PatternProfile::default().with_container(self.container_id.clone())
    }

    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            timings: ObserverTimings {
                debounce: Duration::from_millis(self.debounce_ms),
                poll_interval: Duration::from_millis(self.poll_interval_ms),
                stability_window: Duration::from_millis(self.stability_window_ms),
            },
            profile: self.profile(),
        }
    }

    pub fn resolved_settings_path(&self) -> Option<PathBuf> {
        self.settings_path.clone().or_else(|| {
            dirs::config_dir().map(|dir| dir.join("sweeper").join("settings.json"))
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("sweeper").join("sweeper.yaml"))
        .filter(|path| path.exists())
}
