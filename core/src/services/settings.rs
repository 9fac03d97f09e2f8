//! Settings service
//!
//! Holds the singleton settings record. Updates merge into it and persist
//! the whole record; loading merges the stored record with defaults.

use crate::config::{DEFAULT_ANNIVERSARY, SETTINGS_KEY};
use crate::dates::is_valid_date;
use crate::models::{Settings, SettingsPatch};
use crate::storage::{KeyValueStore, Persister};

/// Service for managing the settings record
pub struct SettingsService {
    settings: Settings,
    persister: Persister,
}

impl SettingsService {
    pub fn new(settings: Settings, persister: Persister) -> Self {
        Self {
            settings,
            persister,
        }
    }

    /// Load settings, backfilling missing fields from defaults.
    ///
    /// An anniversary that does not parse is replaced by the fallback date
    /// so an invalid value never outlives a restart.
    pub async fn load(kv: &KeyValueStore, persister: Persister) -> Self {
        let mut settings: Settings = kv.load(SETTINGS_KEY, Settings::default()).await;

        if !is_valid_date(&settings.anniversary) {
            tracing::warn!(
                "Stored anniversary {:?} is invalid, using {}",
                settings.anniversary,
                DEFAULT_ANNIVERSARY
            );
            settings.anniversary = DEFAULT_ANNIVERSARY.to_string();
        }

        Self::new(settings, persister)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Merge `patch` into the record and persist it.
    ///
    /// Values are stored as given, so a half-typed anniversary survives
    /// until `commit` runs.
    pub fn update(&mut self, patch: SettingsPatch) -> &Settings {
        if let Some(couple_name) = patch.couple_name {
            self.settings.couple_name = couple_name;
        }
        if let Some(anniversary) = patch.anniversary {
            self.settings.anniversary = anniversary;
        }

        tracing::debug!("Settings updated");
        self.persist();
        &self.settings
    }

    /// Finish editing: an invalid anniversary falls back to the default.
    ///
    /// Returns `true` when the anniversary had to be replaced.
    pub fn commit(&mut self) -> bool {
        if is_valid_date(&self.settings.anniversary) {
            return false;
        }

        tracing::info!(
            "Anniversary {:?} is invalid, falling back to {}",
            self.settings.anniversary,
            DEFAULT_ANNIVERSARY
        );
        self.settings.anniversary = DEFAULT_ANNIVERSARY.to_string();
        self.persist();
        true
    }

    /// Restore the default record
    pub fn reset(&mut self) {
        self.settings = Settings::default();
        self.persist();
    }

    fn persist(&self) {
        self.persister.schedule(SETTINGS_KEY, &self.settings);
    }
}
