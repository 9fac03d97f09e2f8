//! Application configuration
//!
//! Central location for storage keys, default values and presets used
//! throughout the store, plus the runtime `AppConfig`.

use std::path::PathBuf;

// ===== Storage Keys =====

/// Key holding the serialized album list
pub const ALBUMS_KEY: &str = "albums";
/// Key holding the serialized photo list
pub const PHOTOS_KEY: &str = "photos";
/// Key holding the settings record
pub const SETTINGS_KEY: &str = "settings";
/// Key holding planned events.
/// Bumped to v2 when events gained a time of day; v1 data is never read.
pub const EVENTS_KEY: &str = "planned_events_v2";

// ===== Settings Defaults =====

/// Couple name shown until the user sets one
pub const DEFAULT_COUPLE_NAME: &str = "You & Partner";

/// Anniversary used for fresh settings and as the fallback for invalid input
pub const DEFAULT_ANNIVERSARY: &str = "2024-02-14";

// ===== Planner =====

/// Duration choices offered when planning a date, in minutes
pub const PLAN_DURATION_PRESETS: &[u32] = &[30, 60, 90, 120];

/// Duration preselected for a new plan, in minutes
pub const DEFAULT_PLAN_DURATION_MINS: u32 = 60;

/// Shortest event written to the device calendar, in minutes
pub const MIN_DEVICE_EVENT_MINS: u32 = 15;

/// Alarm attached to mirrored events, relative to the start (one hour before)
pub const DEVICE_EVENT_ALARM_OFFSET_MINS: i32 = -60;

// ===== Runtime Configuration =====

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "OURDAYS_DATA_DIR";

/// Environment variable selecting the storage backend ("sqlite" or "files")
pub const BACKEND_ENV: &str = "OURDAYS_BACKEND";

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "ourdays.db";

/// Directory name used by the file backend inside the data directory
pub const FILE_STORE_DIR: &str = "store";

/// Which storage backend mirrors the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Sqlite,
    Files,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            "files" | "file" | "json" => Ok(BackendKind::Files),
            other => Err(format!("Unknown storage backend '{}'", other)),
        }
    }
}

/// Runtime configuration for opening the store
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
}

impl AppConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            backend: BackendKind::default(),
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Build a config from the environment.
    ///
    /// Falls back to `./ourdays-data` and the SQLite backend. An unknown
    /// backend name is logged and ignored.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
            std::env::var(BACKEND_ENV).ok().as_deref(),
        )
    }

    fn from_values(data_dir: Option<PathBuf>, backend: Option<&str>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| PathBuf::from("ourdays-data"));

        let backend = match backend {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, using sqlite", e);
                BackendKind::Sqlite
            }),
            None => BackendKind::Sqlite,
        };

        Self { data_dir, backend }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn file_store_dir(&self) -> PathBuf {
        self.data_dir.join(FILE_STORE_DIR)
    }
}
