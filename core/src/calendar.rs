//! Device calendar integration
//!
//! `DeviceCalendar` is the platform's native calendar as the store sees
//! it. `CalendarSync` wraps one with the mirroring policy: ask for
//! permission first, write to the first writable calendar, never shorter
//! than the minimum event length, with an alarm before the start.

use crate::config::{DEVICE_EVENT_ALARM_OFFSET_MINS, MIN_DEVICE_EVENT_MINS};
use crate::dates::combine_date_time;
use crate::error::{AppError, Result};
use crate::models::PlannedEvent;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// A calendar available on the device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCalendarInfo {
    pub id: String,
    pub title: String,
    pub allows_modifications: bool,
}

/// Event to write to the device calendar, in local wall-clock time
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEventDraft {
    pub title: String,
    pub notes: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Alarm offsets relative to `start`, in minutes
    pub alarm_offsets_mins: Vec<i32>,
}

/// The platform calendar service
#[async_trait]
pub trait DeviceCalendar: Send + Sync {
    /// Ask the user for calendar access (or report the current answer)
    async fn request_permission(&self) -> Result<PermissionStatus>;

    async fn calendars(&self) -> Result<Vec<DeviceCalendarInfo>>;

    /// Create an event, returning the device's id for it
    async fn create_event(&self, calendar_id: &str, draft: &DeviceEventDraft) -> Result<String>;

    async fn delete_event(&self, event_id: &str) -> Result<()>;
}

/// Build the device event for a plan.
///
/// The end is `start + max(duration, 15)` minutes; one alarm an hour
/// before the start.
pub fn draft_for(event: &PlannedEvent) -> Result<DeviceEventDraft> {
    let start = combine_date_time(&event.date_iso, &event.time_hhmm).ok_or_else(|| {
        AppError::Calendar(format!(
            "Invalid start {} {} for event {}",
            event.date_iso, event.time_hhmm, event.id
        ))
    })?;
    let length = event.duration_mins.max(MIN_DEVICE_EVENT_MINS);
    let end = start + Duration::minutes(i64::from(length));

    Ok(DeviceEventDraft {
        title: event.title.clone(),
        notes: event.notes.clone(),
        start,
        end,
        alarm_offsets_mins: vec![DEVICE_EVENT_ALARM_OFFSET_MINS],
    })
}

/// Mirrors planned events into a device calendar
#[derive(Clone)]
pub struct CalendarSync {
    calendar: Arc<dyn DeviceCalendar>,
}

impl CalendarSync {
    pub fn new(calendar: Arc<dyn DeviceCalendar>) -> Self {
        Self { calendar }
    }

    async fn ensure_permission(&self) -> Result<()> {
        match self.calendar.request_permission().await? {
            PermissionStatus::Granted => Ok(()),
            status => {
                tracing::debug!("Calendar permission is {:?}", status);
                Err(AppError::CalendarPermissionDenied)
            }
        }
    }

    /// First writable calendar, else the first calendar at all
    pub async fn default_calendar_id(&self) -> Result<String> {
        let calendars = self.calendar.calendars().await?;

        calendars
            .iter()
            .find(|c| c.allows_modifications)
            .or_else(|| calendars.first())
            .map(|c| c.id.clone())
            .ok_or(AppError::NoDeviceCalendar)
    }

    /// Write `event` to the device calendar and return the device's id
    pub async fn mirror(&self, event: &PlannedEvent) -> Result<String> {
        self.ensure_permission().await?;
        let calendar_id = self.default_calendar_id().await?;
        let draft = draft_for(event)?;

        let device_event_id = self.calendar.create_event(&calendar_id, &draft).await?;

        tracing::info!(
            "Mirrored event {} to device calendar {} as {}",
            event.id,
            calendar_id,
            device_event_id
        );
        Ok(device_event_id)
    }

    /// Delete a mirrored event from the device calendar
    pub async fn remove(&self, device_event_id: &str) -> Result<()> {
        self.ensure_permission().await?;
        self.calendar.delete_event(device_event_id).await?;

        tracing::info!("Removed device calendar event {}", device_event_id);
        Ok(())
    }
}
