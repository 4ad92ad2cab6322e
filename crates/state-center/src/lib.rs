//! Settings store collaborator: the two observer toggles, read once at
//! startup and written whenever the control channel flips one of them.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sweeper_core_types::ObserverConfig;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Stored toggles. Absent values mean "never written" and read as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globally_disabled: Option<bool>,
}

impl StoredSettings {
    pub fn into_config(self) -> ObserverConfig {
        ObserverConfig::default()
            .with_diagnostics(self.diagnostics_enabled.unwrap_or(false))
            .with_disabled(self.globally_disabled.unwrap_or(false))
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.diagnostics_enabled {
            self.diagnostics_enabled = Some(value);
        }
        if let Some(value) = patch.globally_disabled {
            self.globally_disabled = Some(value);
        }
    }
}

/// Partial update; `None` fields are left as stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub diagnostics_enabled: Option<bool>,
    pub globally_disabled: Option<bool>,
}

impl SettingsPatch {
    pub fn diagnostics(value: bool) -> Self {
        Self {
            diagnostics_enabled: Some(value),
            ..Self::default()
        }
    }

    pub fn disabled(value: bool) -> Self {
        Self {
            globally_disabled: Some(value),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<StoredSettings, SettingsError>;
    async fn store(&self, patch: SettingsPatch) -> Result<(), SettingsError>;
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    inner: Mutex<StoredSettings>,
}

impl InMemorySettingsStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_settings(settings: StoredSettings) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(settings),
        })
    }

    pub fn current(&self) -> StoredSettings {
        *self.inner.lock()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<StoredSettings, SettingsError> {
        Ok(self.current())
    }

    async fn store(&self, patch: SettingsPatch) -> Result<(), SettingsError> {
        self.inner.lock().apply(patch);
        Ok(())
    }
}

/// Pretty-printed JSON file. A missing file loads as empty settings and is
/// created, along with its parent directory, on the first write.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoredSettings, SettingsError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target: "settings", path = %self.path.display(), "no settings file yet");
                return Ok(StoredSettings::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> Result<StoredSettings, SettingsError> {
        self.read().await
    }

    async fn store(&self, patch: SettingsPatch) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;
        let mut settings = match self.read().await {
            Ok(settings) => settings,
            Err(SettingsError::Malformed { path, source }) => {
                warn!(target: "settings", path = %path.display(), error = %source, "overwriting malformed settings file");
                StoredSettings::default()
            }
            Err(err) => return Err(err),
        };
        settings.apply(patch);

        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(&settings).map_err(|source| {
            SettingsError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&self.path, body).await.map_err(io_err)?;
        debug!(target: "settings", path = %self.path.display(), ?settings, "settings stored");
        Ok(())
    }
}

/// Store for environments without persistence; every call fails so callers
/// exercise their fallback path.
pub struct UnavailableSettingsStore;

impl UnavailableSettingsStore {
    pub fn new() -> Arc<dyn SettingsStore> {
        Arc::new(Self)
    }
}

#[async_trait]
impl SettingsStore for UnavailableSettingsStore {
    async fn load(&self) -> Result<StoredSettings, SettingsError> {
        Err(SettingsError::Unavailable("no settings backend".into()))
    }

    async fn store(&self, _patch: SettingsPatch) -> Result<(), SettingsError> {
        Err(SettingsError::Unavailable("no settings backend".into()))
    }
}
