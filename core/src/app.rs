//! Application state and initialization
//!
//! `AppState` is the domain store: it is built explicitly, loads every
//! collection before it is handed out, and is passed by reference to
//! whatever presents it. Nothing reaches it through a global.

use crate::calendar::{CalendarSync, DeviceCalendar};
use crate::config::{AppConfig, BackendKind};
use crate::dates::today;
use crate::error::Result;
use crate::models::{Album, PlannedEvent, Photo};
use crate::services::{LibraryService, PlannerService, SettingsService};
use crate::storage::{
    FileBackend, KeyValueStore, MemoryBackend, Persister, SqliteBackend, StorageBackend,
};
use crate::views::{self, AlbumSummary, CalendarMark, LibraryStats, TimelineSection};
use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once
/// is harmless.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ourdays=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Tracing initialized");
    }
}

/// Open the backend selected by `config`, creating directories as needed
pub async fn open_backend(config: &AppConfig) -> Result<Arc<dyn StorageBackend>> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let backend: Arc<dyn StorageBackend> = match config.backend {
        BackendKind::Sqlite => Arc::new(SqliteBackend::open(&config.database_path()).await?),
        BackendKind::Files => {
            let backend = FileBackend::new(config.file_store_dir());
            backend.initialize().await?;
            Arc::new(backend)
        }
    };

    Ok(backend)
}

/// The domain store: albums, photos, settings and planned events
pub struct AppState {
    pub library: LibraryService,
    pub settings: SettingsService,
    pub planner: PlannerService,
    persister: Persister,
}

impl AppState {
    /// Open the configured backend and load every collection.
    ///
    /// If the backend cannot be opened the store runs on memory only, so
    /// the app stays usable and this session's changes are not kept.
    pub async fn open(config: &AppConfig, calendar: Option<Arc<dyn DeviceCalendar>>) -> Self {
        tracing::info!("Opening store in {:?} ({:?})", config.data_dir, config.backend);

        let backend = match open_backend(config).await {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!("Storage unavailable, running without persistence: {}", e);
                Arc::new(MemoryBackend::new())
            }
        };

        Self::load(backend, calendar).await
    }

    /// Load every collection from `backend` and start the persistence writer.
    /// Must be called from within a Tokio runtime.
    pub async fn load(
        backend: Arc<dyn StorageBackend>,
        calendar: Option<Arc<dyn DeviceCalendar>>,
    ) -> Self {
        let kv = KeyValueStore::new(backend);
        let persister = Persister::spawn(kv.clone());

        let library = LibraryService::load(&kv, persister.clone()).await;
        let settings = SettingsService::load(&kv, persister.clone()).await;
        let planner =
            PlannerService::load(&kv, persister.clone(), calendar.map(CalendarSync::new)).await;

        tracing::info!("Store loaded");

        Self {
            library,
            settings,
            planner,
            persister,
        }
    }

    /// Clear albums and photos and restore default settings.
    ///
    /// Destructive and unconfirmed; callers ask the user first. Planned
    /// events are kept.
    pub fn reset_all(&mut self) {
        tracing::warn!("Resetting albums, photos and settings");
        self.library.clear();
        self.settings.reset();
    }

    /// Wait until every change made so far has been written
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    // ===== Derived views =====

    pub fn albums(&self) -> &[Album] {
        self.library.albums()
    }

    pub fn photos(&self) -> &[Photo] {
        self.library.photos()
    }

    pub fn events(&self) -> &[PlannedEvent] {
        self.planner.events()
    }

    pub fn album_summaries(&self) -> Vec<AlbumSummary<'_>> {
        views::album_summaries(self.albums(), self.photos())
    }

    pub fn timeline(&self) -> Vec<TimelineSection<'_>> {
        views::timeline(self.albums(), self.photos())
    }

    pub fn upcoming_events(&self) -> Vec<&PlannedEvent> {
        views::upcoming_events(self.events(), &today())
    }

    pub fn calendar_marks(&self, selected: &str) -> BTreeMap<String, CalendarMark> {
        views::calendar_marks(self.events(), selected)
    }

    pub fn stats(&self) -> LibraryStats {
        views::library_stats(self.albums(), self.photos())
    }

    pub fn days_together(&self) -> u64 {
        views::days_together(self.settings.get(), Local::now())
    }
}
