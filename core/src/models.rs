//! Domain models
//!
//! Rust structs for the persisted collections and the requests that
//! create or patch them. Field names serialize in the stored JSON shape
//! (`dateISO`, `albumId`, `createdAt`, ...).

use crate::config::{DEFAULT_ANNIVERSARY, DEFAULT_COUPLE_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, dated grouping of photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    /// Day the outing happened (`YYYY-MM-DD`)
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    /// Records saved without it read as the Unix epoch
    #[serde(rename = "createdAt", default)]
    pub created_at: DateTime<Utc>,
}

/// A reference to an image plus its catalog metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    /// Content reference owned by the platform media layer
    pub uri: String,
    /// `None` means unfiled
    #[serde(rename = "albumId", default)]
    pub album_id: Option<String>,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub favorite: bool,
    /// Records saved without it read as the Unix epoch
    #[serde(rename = "createdAt", default)]
    pub created_at: DateTime<Utc>,
}

/// Add photo request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPhoto {
    pub uri: String,
    #[serde(rename = "albumId", default)]
    pub album_id: Option<String>,
    #[serde(rename = "dateISO", default)]
    pub date_iso: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl NewPhoto {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn in_album(mut self, album_id: impl Into<String>) -> Self {
        self.album_id = Some(album_id.into());
        self
    }

    pub fn dated(mut self, date_iso: impl Into<String>) -> Self {
        self.date_iso = Some(date_iso.into());
        self
    }

    pub fn captioned(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// The singleton settings record.
///
/// Missing fields backfill from the defaults when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "coupleName")]
    pub couple_name: String,
    /// Anniversary date (`YYYY-MM-DD`)
    pub anniversary: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            couple_name: DEFAULT_COUPLE_NAME.to_string(),
            anniversary: DEFAULT_ANNIVERSARY.to_string(),
        }
    }
}

/// Partial settings update; `None` leaves a field as it is
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(rename = "coupleName", default)]
    pub couple_name: Option<String>,
    #[serde(default)]
    pub anniversary: Option<String>,
}

/// A future date/time entry, optionally mirrored to the device calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedEvent {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    /// 24-hour `HH:MM`
    #[serde(rename = "timeHHMM", default)]
    pub time_hhmm: String,
    #[serde(rename = "durationMins")]
    pub duration_mins: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Id of the mirrored device-calendar entry, if one was created
    #[serde(rename = "deviceEventId", default)]
    pub device_event_id: Option<String>,
    /// Records saved without it read as the Unix epoch
    #[serde(rename = "createdAt", default)]
    pub created_at: DateTime<Utc>,
}

/// Create planned event request
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    #[serde(rename = "timeHHMM")]
    pub time_hhmm: String,
    #[serde(rename = "durationMins")]
    pub duration_mins: u32,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Also write the plan to the device calendar
    #[serde(rename = "syncToDevice", default)]
    pub sync_to_device: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_backfill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"coupleName":"Sam & Alex"}"#).unwrap();
        assert_eq!(settings.couple_name, "Sam & Alex");
        assert_eq!(settings.anniversary, DEFAULT_ANNIVERSARY);
    }

    #[test]
    fn test_photo_stored_shape() {
        let json = r#"{
            "id": "1-a",
            "uri": "file:///p.jpg",
            "albumId": null,
            "dateISO": "2025-01-10",
            "createdAt": "2025-01-10T08:00:00Z"
        }"#;
        let photo: Photo = serde_json::from_str(json).unwrap();
        assert_eq!(photo.album_id, None);
        assert_eq!(photo.caption, "");
        assert!(!photo.favorite);

        let value = serde_json::to_value(&photo).unwrap();
        assert_eq!(value["dateISO"], "2025-01-10");
        assert!(value.get("albumId").is_some());
    }

    #[test]
    fn test_album_without_created_at_reads_as_epoch() {
        let album: Album =
            serde_json::from_str(r#"{"id":"1-b","name":"Old","dateISO":"2023-05-01"}"#).unwrap();
        assert_eq!(album.created_at.timestamp(), 0);
    }

    #[test]
    fn test_event_without_time_defaults_to_empty() {
        let json = r#"{
            "id": "e1",
            "dateISO": "2025-03-01",
            "durationMins": 60,
            "title": "Dinner",
            "createdAt": "2025-02-01T10:00:00Z"
        }"#;
        let event: PlannedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.time_hhmm, "");
        assert_eq!(event.notes, None);
        assert_eq!(event.device_event_id, None);
    }
}
