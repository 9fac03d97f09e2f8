//! Planner service
//!
//! Owns the planned-event collection and optionally mirrors events to the
//! device calendar. Local changes always apply; the device calendar is
//! best effort and its outcome is only reported back.

use crate::calendar::CalendarSync;
use crate::config::EVENTS_KEY;
use crate::dates::{generate_id, parse_date, parse_time, today};
use crate::models::{NewEvent, PlannedEvent};
use crate::storage::{KeyValueStore, Persister};
use chrono::Utc;

/// What happened on the device calendar side of a create or delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No device calendar work was asked for
    NotRequested,
    Synced,
    /// The device calendar call did not go through; local state is unaffected
    Failed(String),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCreated {
    pub event: PlannedEvent,
    pub sync: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDeleted {
    pub event: PlannedEvent,
    pub sync: SyncOutcome,
}

/// Service for managing planned events
pub struct PlannerService {
    events: Vec<PlannedEvent>,
    persister: Persister,
    calendar: Option<CalendarSync>,
}

impl PlannerService {
    pub fn new(
        events: Vec<PlannedEvent>,
        persister: Persister,
        calendar: Option<CalendarSync>,
    ) -> Self {
        Self {
            events,
            persister,
            calendar,
        }
    }

    pub async fn load(
        kv: &KeyValueStore,
        persister: Persister,
        calendar: Option<CalendarSync>,
    ) -> Self {
        let events: Vec<PlannedEvent> = kv.load_list(EVENTS_KEY).await;
        tracing::info!("Loaded {} planned events", events.len());
        Self::new(events, persister, calendar)
    }

    /// Events, newest first
    pub fn events(&self) -> &[PlannedEvent] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&PlannedEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn has_device_calendar(&self) -> bool {
        self.calendar.is_some()
    }

    /// Plan a date.
    ///
    /// Rejected (`None`) for a blank title, an invalid or past date, a
    /// malformed time or a zero duration. When mirroring is requested the
    /// device calendar is tried first and its id recorded on success; the
    /// local event is created either way.
    pub async fn create_event(&mut self, req: NewEvent) -> Option<EventCreated> {
        let sync_to_device = req.sync_to_device;
        let event = self.build_event(req)?;

        let (event, sync) = if sync_to_device {
            self.mirror(event).await
        } else {
            (event, SyncOutcome::NotRequested)
        };

        tracing::info!("Planned event {} on {}", event.id, event.date_iso);

        self.events.insert(0, event.clone());
        self.persist();

        Some(EventCreated { event, sync })
    }

    fn build_event(&self, req: NewEvent) -> Option<PlannedEvent> {
        let title = req.title.trim();
        if title.is_empty() {
            tracing::debug!("Ignoring plan with blank title");
            return None;
        }
        if parse_date(&req.date_iso).is_none() {
            tracing::debug!("Ignoring plan with invalid date {:?}", req.date_iso);
            return None;
        }
        if req.date_iso < today() {
            tracing::debug!("Ignoring plan for past date {}", req.date_iso);
            return None;
        }
        if parse_time(&req.time_hhmm).is_none() {
            tracing::debug!("Ignoring plan with invalid time {:?}", req.time_hhmm);
            return None;
        }
        if req.duration_mins == 0 {
            tracing::debug!("Ignoring plan with zero duration");
            return None;
        }

        let notes = req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Some(PlannedEvent {
            id: generate_id(),
            date_iso: req.date_iso,
            time_hhmm: req.time_hhmm,
            duration_mins: req.duration_mins,
            title: title.to_string(),
            notes,
            device_event_id: None,
            created_at: Utc::now(),
        })
    }

    async fn mirror(&self, mut event: PlannedEvent) -> (PlannedEvent, SyncOutcome) {
        let Some(calendar) = &self.calendar else {
            return (
                event,
                SyncOutcome::Failed("No device calendar configured".to_string()),
            );
        };

        match calendar.mirror(&event).await {
            Ok(device_event_id) => {
                event.device_event_id = Some(device_event_id);
                (event, SyncOutcome::Synced)
            }
            Err(e) => {
                tracing::warn!("Saved event {} locally but device sync failed: {}", event.id, e);
                (event, SyncOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Delete a plan, then try to delete its device calendar copy.
    ///
    /// The local delete stands whatever the device calendar answers.
    pub async fn delete_event(&mut self, id: &str) -> Option<EventDeleted> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        let event = self.events.remove(idx);
        self.persist();

        tracing::info!("Deleted planned event {}", id);

        let sync = match (&event.device_event_id, &self.calendar) {
            (None, _) => SyncOutcome::NotRequested,
            (Some(_), None) => SyncOutcome::Failed("No device calendar configured".to_string()),
            (Some(device_event_id), Some(calendar)) => match calendar.remove(device_event_id).await {
                Ok(()) => SyncOutcome::Synced,
                Err(e) => {
                    tracing::warn!("Could not remove device event {}: {}", device_event_id, e);
                    SyncOutcome::Failed(e.to_string())
                }
            },
        };

        Some(EventDeleted { event, sync })
    }

    fn persist(&self) {
        self.persister.schedule(EVENTS_KEY, &self.events);
    }
}
