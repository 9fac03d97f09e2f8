//! Ourdays library
//!
//! Local data store for a couple's photo albums, photo timeline, settings
//! and date planner. Collections live in memory, are loaded once at
//! startup and written back to a key-value backend after every change.

pub mod app;
pub mod calendar;
pub mod config;
pub mod database;
pub mod dates;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod views;

pub use app::AppState;
pub use error::{AppError, Result};
