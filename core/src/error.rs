//! Error types for Ourdays
//!
//! All errors use thiserror for structured error handling.
//! These errors only surface at the storage and device-calendar seams;
//! the domain store absorbs them before they reach a caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Calendar permission not granted")]
    CalendarPermissionDenied,

    #[error("No device calendar available")]
    NoDeviceCalendar,

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_message() {
        let err = AppError::InvalidKey("../albums".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#""Invalid storage key: ../albums""#);
    }

    #[test]
    fn test_calendar_errors_display() {
        assert_eq!(
            AppError::CalendarPermissionDenied.to_string(),
            "Calendar permission not granted"
        );
        assert_eq!(
            AppError::Calendar("write refused".to_string()).to_string(),
            "Calendar error: write refused"
        );
    }
}
