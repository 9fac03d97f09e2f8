//! Services module
//!
//! Owners of the in-memory collections. Every mutation updates memory
//! first and then schedules a write of the whole collection.

pub mod library;
pub mod planner;
pub mod settings;

pub use library::{AlbumDeletion, LibraryService};
pub use planner::{EventCreated, EventDeleted, PlannerService, SyncOutcome};
pub use settings::SettingsService;
