//! User preference persistence for the Workbench CLI/TUI.
//!
//! A tiny JSON-backed store that records lightweight configuration such as
//! the preferred theme and the default cluster type for new workspaces. The
//! file lives in the standard configuration directory
//! (`~/.config/workbench/preferences.json` on most platforms) and access is
//! serialized by an internal `Mutex`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "WORKBENCH_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    /// Identifier of the theme selected via the TUI.
    #[serde(default)]
    pub preferred_theme: Option<String>,
    /// Cluster type preselected for new workspaces (`k8s`, `ecs`, ...).
    #[serde(default)]
    pub default_cluster_type: Option<String>,
    /// Attach lifecycle settings to creation requests.
    #[serde(default)]
    pub submit_lifecycle_config: bool,
}

/// Thread-safe preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct UserPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl UserPreferences {
    /// Open the store at `WORKBENCH_PREFERENCES_PATH` or the default config path.
    pub fn new() -> Result<Self, PreferencesError> {
        Self::at_path(default_preferences_path())
    }

    /// Open the store rooted at `path`.
    pub fn at_path(path: PathBuf) -> Result<Self, PreferencesError> {
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> PreferencesPayload {
        self.lock().clone()
    }

    pub fn preferred_theme(&self) -> Option<String> {
        self.lock().preferred_theme.clone()
    }

    /// Persist a new preferred theme identifier.
    pub fn set_preferred_theme(&self, theme_id: Option<String>) -> Result<(), PreferencesError> {
        self.update(|payload| payload.preferred_theme = theme_id)
    }

    fn update(&self, apply: impl FnOnce(&mut PreferencesPayload)) -> Result<(), PreferencesError> {
        let mut payload = self.lock();
        apply(&mut payload);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    // A poisoned lock still holds a valid payload; keep serving it.
    fn lock(&self) -> MutexGuard<'_, PreferencesPayload> {
        self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    if let Ok(path) = env::var(PREFERENCES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("workbench")
        .join(PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let prefs = UserPreferences::at_path(dir.path().join("prefs.json")).expect("open");
        assert_eq!(prefs.snapshot(), PreferencesPayload::default());
    }

    #[test]
    fn theme_choice_round_trips_through_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefs.json");
        let prefs = UserPreferences::at_path(path.clone()).expect("open");
        prefs.set_preferred_theme(Some("nord".into())).expect("save");

        let reopened = UserPreferences::at_path(path).expect("reopen");
        assert_eq!(reopened.preferred_theme().as_deref(), Some("nord"));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").expect("write");
        let prefs = UserPreferences::at_path(path).expect("open");
        assert!(prefs.preferred_theme().is_none());
    }

    #[test]
    fn env_override_selects_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"default_cluster_type":"ecs","submit_lifecycle_config":true}"#).expect("write");
        temp_env::with_var(PREFERENCES_PATH_ENV, Some(path.to_string_lossy().to_string()), || {
            let prefs = UserPreferences::new().expect("open");
            assert_eq!(prefs.path(), path.as_path());
            let snapshot = prefs.snapshot();
            assert_eq!(snapshot.default_cluster_type.as_deref(), Some("ecs"));
            assert!(snapshot.submit_lifecycle_config);
        });
    }

    #[test]
    fn ephemeral_store_never_writes() {
        let prefs = UserPreferences::ephemeral();
        prefs.set_preferred_theme(Some("dracula".into())).expect("in-memory update");
        assert_eq!(prefs.preferred_theme().as_deref(), Some("dracula"));
        assert_eq!(prefs.path(), Path::new(""));
    }
}
