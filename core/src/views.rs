//! Derived views
//!
//! Pure computations over the store's collections, recomputed on every
//! read. All display fallbacks (missing album names, undated photos,
//! pluralized counts) are defined here and nowhere else.

use crate::dates::{days_since_at, format_display, format_month_year};
use crate::models::{Album, PlannedEvent, Photo, Settings};
use chrono::{DateTime, Local};
use std::collections::{BTreeMap, HashMap};

/// Title of the pseudo-album listing every photo
pub const ALL_PHOTOS_LABEL: &str = "All Photos";
/// Label for a photo not filed in any album
pub const NO_ALBUM_LABEL: &str = "No Album";
/// Label for a photo whose album no longer exists
pub const MISSING_ALBUM_LABEL: &str = "Album";
/// Timeline section for photos whose effective date does not parse
pub const UNDATED_LABEL: &str = "Undated";

// ===== Albums =====

/// Album id → album
pub fn album_index(albums: &[Album]) -> HashMap<&str, &Album> {
    albums.iter().map(|a| (a.id.as_str(), a)).collect()
}

/// Album id → number of photos filed under it. Unfiled photos are not counted.
pub fn album_photo_counts(photos: &[Photo]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for album_id in photos.iter().filter_map(|p| p.album_id.as_deref()) {
        *counts.entry(album_id).or_insert(0) += 1;
    }
    counts
}

/// "1 photo", "3 photos"
pub fn photo_count_label(count: usize) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{} photos", count)
    }
}

/// Which photos an album screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumScope {
    All,
    Album(String),
}

pub fn photos_in_scope<'a>(photos: &'a [Photo], scope: &AlbumScope) -> Vec<&'a Photo> {
    match scope {
        AlbumScope::All => photos.iter().collect(),
        AlbumScope::Album(id) => photos
            .iter()
            .filter(|p| p.album_id.as_deref() == Some(id.as_str()))
            .collect(),
    }
}

/// One row of the album list
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumSummary<'a> {
    pub scope: AlbumScope,
    /// `None` for the "All Photos" row
    pub album: Option<&'a Album>,
    pub name: &'a str,
    pub photo_count: usize,
    pub count_label: String,
    /// Long-form album date, empty for "All Photos"
    pub date_label: String,
}

/// The album list: "All Photos" first, then albums in stored order
pub fn album_summaries<'a>(albums: &'a [Album], photos: &[Photo]) -> Vec<AlbumSummary<'a>> {
    let counts = album_photo_counts(photos);

    let all = AlbumSummary {
        scope: AlbumScope::All,
        album: None,
        name: ALL_PHOTOS_LABEL,
        photo_count: photos.len(),
        count_label: photo_count_label(photos.len()),
        date_label: String::new(),
    };

    std::iter::once(all)
        .chain(albums.iter().map(|album| {
            let count = counts.get(album.id.as_str()).copied().unwrap_or(0);
            AlbumSummary {
                scope: AlbumScope::Album(album.id.clone()),
                album: Some(album),
                name: &album.name,
                photo_count: count,
                count_label: photo_count_label(count),
                date_label: format_display(&album.date_iso),
            }
        }))
        .collect()
}

/// Display name of the album a photo is filed under
pub fn album_label_for<'a>(photo: &Photo, index: &HashMap<&str, &'a Album>) -> &'a str {
    match photo.album_id.as_deref() {
        None => NO_ALBUM_LABEL,
        Some(id) => index
            .get(id)
            .copied()
            .map(|a| a.name.as_str())
            .unwrap_or(MISSING_ALBUM_LABEL),
    }
}

// ===== Timeline =====

/// Date used to place a photo on the timeline: its album's date when it is
/// filed in an existing album with a date set, else its own.
pub fn effective_date<'a>(photo: &'a Photo, index: &HashMap<&str, &'a Album>) -> &'a str {
    photo
        .album_id
        .as_deref()
        .and_then(|id| index.get(id).copied())
        .map(|a| a.date_iso.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or(photo.date_iso.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry<'a> {
    pub photo: &'a Photo,
    pub effective_date: &'a str,
    pub album_label: &'a str,
}

/// Photos sharing a month, e.g. "February 2025"
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSection<'a> {
    pub title: String,
    pub entries: Vec<TimelineEntry<'a>>,
}

/// Photos newest first by effective date (ties: most recently added
/// first), grouped by month in order of first appearance.
pub fn timeline<'a>(albums: &'a [Album], photos: &'a [Photo]) -> Vec<TimelineSection<'a>> {
    let index = album_index(albums);

    let mut entries: Vec<TimelineEntry<'a>> = photos
        .iter()
        .map(|photo| TimelineEntry {
            photo,
            effective_date: effective_date(photo, &index),
            album_label: album_label_for(photo, &index),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.effective_date
            .cmp(a.effective_date)
            .then_with(|| b.photo.created_at.cmp(&a.photo.created_at))
    });

    let mut sections: Vec<TimelineSection<'a>> = Vec::new();
    let mut section_by_title: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let title = format_month_year(entry.effective_date)
            .unwrap_or_else(|| UNDATED_LABEL.to_string());

        let idx = *section_by_title.entry(title.clone()).or_insert_with(|| {
            sections.push(TimelineSection {
                title,
                entries: Vec::new(),
            });
            sections.len() - 1
        });
        sections[idx].entries.push(entry);
    }

    sections
}

// ===== Planner =====

/// Events on or after `today`, soonest first (ties by time of day)
pub fn upcoming_events<'a>(events: &'a [PlannedEvent], today: &str) -> Vec<&'a PlannedEvent> {
    let mut upcoming: Vec<&PlannedEvent> = events
        .iter()
        .filter(|e| e.date_iso.as_str() >= today)
        .collect();

    upcoming.sort_by(|a, b| {
        a.date_iso
            .cmp(&b.date_iso)
            .then_with(|| sort_time(a).cmp(sort_time(b)))
    });

    upcoming
}

fn sort_time(event: &PlannedEvent) -> &str {
    if event.time_hhmm.is_empty() {
        "00:00"
    } else {
        &event.time_hhmm
    }
}

/// Highlight state of one day in the calendar widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarMark {
    pub has_events: bool,
    pub selected: bool,
}

/// Days with at least one plan, plus the selected day
pub fn calendar_marks(events: &[PlannedEvent], selected: &str) -> BTreeMap<String, CalendarMark> {
    let mut marks: BTreeMap<String, CalendarMark> = BTreeMap::new();

    for event in events {
        marks.entry(event.date_iso.clone()).or_default().has_events = true;
    }
    marks.entry(selected.to_string()).or_default().selected = true;

    marks
}

// ===== Settings =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub albums: usize,
    pub photos: usize,
    pub favorites: usize,
}

pub fn library_stats(albums: &[Album], photos: &[Photo]) -> LibraryStats {
    LibraryStats {
        albums: albums.len(),
        photos: photos.len(),
        favorites: photos.iter().filter(|p| p.favorite).count(),
    }
}

/// Days since the anniversary as of `now`
pub fn days_together(settings: &Settings, now: DateTime<Local>) -> u64 {
    days_since_at(&settings.anniversary, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn album(id: &str, name: &str, date: &str) -> Album {
        Album {
            id: id.to_string(),
            name: name.to_string(),
            date_iso: date.to_string(),
            created_at: Utc::now(),
        }
    }

    fn photo(id: &str, album_id: Option<&str>, date: &str, created_secs: i64) -> Photo {
        Photo {
            id: id.to_string(),
            uri: format!("file:///{}.jpg", id),
            album_id: album_id.map(str::to_string),
            date_iso: date.to_string(),
            caption: String::new(),
            favorite: false,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    fn event(id: &str, date: &str, time: &str) -> PlannedEvent {
        PlannedEvent {
            id: id.to_string(),
            date_iso: date.to_string(),
            time_hhmm: time.to_string(),
            duration_mins: 60,
            title: id.to_string(),
            notes: None,
            device_event_id: None,
            created_at: Utc::now(),
        }
    }

    fn ids<'a>(section: &TimelineSection<'a>) -> Vec<&'a str> {
        section.entries.iter().map(|e| e.photo.id.as_str()).collect()
    }

    #[test]
    fn test_album_photo_counts_skip_unfiled() {
        let photos = vec![
            photo("p1", Some("a"), "2025-01-01", 1),
            photo("p2", Some("a"), "2025-01-01", 2),
            photo("p3", Some("b"), "2025-01-01", 3),
            photo("p4", None, "2025-01-01", 4),
        ];

        let counts = album_photo_counts(&photos);

        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_album_summaries() {
        let albums = vec![album("a", "Beach", "2025-07-04"), album("b", "Empty", "2025-01-01")];
        let photos = vec![photo("p1", Some("a"), "2025-07-04", 1), photo("p2", None, "2025-07-05", 2)];

        let summaries = album_summaries(&albums, &photos);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].name, ALL_PHOTOS_LABEL);
        assert_eq!(summaries[0].count_label, "2 photos");
        assert_eq!(summaries[1].name, "Beach");
        assert_eq!(summaries[1].count_label, "1 photo");
        assert_eq!(summaries[1].date_label, "July 4, 2025");
        assert_eq!(summaries[2].photo_count, 0);
        assert_eq!(summaries[2].count_label, "0 photos");
    }

    #[test]
    fn test_photos_in_scope() {
        let photos = vec![photo("p1", Some("a"), "2025-01-01", 1), photo("p2", None, "2025-01-01", 2)];

        assert_eq!(photos_in_scope(&photos, &AlbumScope::All).len(), 2);
        let scoped = photos_in_scope(&photos, &AlbumScope::Album("a".to_string()));
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "p1");
    }

    #[test]
    fn test_album_label_fallbacks() {
        let albums = vec![album("a", "Beach", "2025-07-04")];
        let index = album_index(&albums);

        assert_eq!(album_label_for(&photo("p1", Some("a"), "2025-01-01", 1), &index), "Beach");
        assert_eq!(album_label_for(&photo("p2", None, "2025-01-01", 1), &index), NO_ALBUM_LABEL);
        assert_eq!(
            album_label_for(&photo("p3", Some("gone"), "2025-01-01", 1), &index),
            MISSING_ALBUM_LABEL
        );
    }

    #[test]
    fn test_timeline_album_date_overrides_photo_date() {
        let albums = vec![album("A", "Valentine's", "2025-02-20")];
        let photos = vec![
            photo("P1", None, "2025-01-10", 1),
            photo("P2", Some("A"), "2025-01-02", 2),
        ];

        let sections = timeline(&albums, &photos);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "February 2025");
        assert_eq!(ids(&sections[0]), vec!["P2"]);
        assert_eq!(sections[0].entries[0].effective_date, "2025-02-20");
        assert_eq!(sections[0].entries[0].photo.date_iso, "2025-01-02");
        assert_eq!(sections[1].title, "January 2025");
        assert_eq!(ids(&sections[1]), vec!["P1"]);
    }

    #[test]
    fn test_effective_date_skips_blank_album_date() {
        let albums = vec![album("a", "Beach", ""), album("b", "Ski", "2025-02-20")];
        let index = album_index(&albums);

        let loose = photo("p1", Some("a"), "2025-01-10", 1);
        let filed = photo("p2", Some("b"), "2025-01-02", 2);

        assert_eq!(effective_date(&loose, &index), "2025-01-10");
        assert_eq!(effective_date(&filed, &index), "2025-02-20");
    }

    #[test]
    fn test_timeline_ties_break_on_created_at() {
        let photos = vec![
            photo("old", None, "2025-03-01", 100),
            photo("new", None, "2025-03-01", 200),
            photo("later", None, "2025-03-15", 50),
        ];

        let sections = timeline(&[], &photos);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "March 2025");
        assert_eq!(ids(&sections[0]), vec!["later", "new", "old"]);
    }

    #[test]
    fn test_timeline_missing_album_uses_photo_date() {
        let photos = vec![photo("p", Some("gone"), "2024-12-24", 1)];

        let sections = timeline(&[], &photos);

        assert_eq!(sections[0].title, "December 2024");
        assert_eq!(sections[0].entries[0].album_label, MISSING_ALBUM_LABEL);
    }

    #[test]
    fn test_timeline_undated_bucket() {
        let photos = vec![photo("bad", None, "someday", 1), photo("ok", None, "2025-01-01", 2)];

        let sections = timeline(&[], &photos);

        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&UNDATED_LABEL));
        assert!(titles.contains(&"January 2025"));
    }

    #[test]
    fn test_timeline_empty() {
        assert!(timeline(&[], &[]).is_empty());
    }

    #[test]
    fn test_upcoming_events_filter_and_order() {
        let events = vec![
            event("past", "2025-01-01", "10:00"),
            event("late", "2025-03-02", "20:00"),
            event("early", "2025-03-02", "09:00"),
            event("today", "2025-03-01", "12:00"),
            event("untimed", "2025-03-02", ""),
        ];

        let upcoming = upcoming_events(&events, "2025-03-01");
        let ids: Vec<_> = upcoming.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["today", "untimed", "early", "late"]);
    }

    #[test]
    fn test_calendar_marks() {
        let events = vec![
            event("a", "2025-03-02", "10:00"),
            event("b", "2025-03-02", "12:00"),
            event("c", "2025-04-01", "10:00"),
        ];

        let marks = calendar_marks(&events, "2025-03-05");

        assert_eq!(marks.len(), 3);
        assert_eq!(marks["2025-03-02"], CalendarMark { has_events: true, selected: false });
        assert_eq!(marks["2025-03-05"], CalendarMark { has_events: false, selected: true });

        let marks = calendar_marks(&events, "2025-04-01");
        assert_eq!(marks["2025-04-01"], CalendarMark { has_events: true, selected: true });
    }

    #[test]
    fn test_library_stats_and_days_together() {
        let mut favorite = photo("p1", None, "2025-01-01", 1);
        favorite.favorite = true;
        let photos = vec![favorite, photo("p2", None, "2025-01-01", 2)];

        let stats = library_stats(&[album("a", "x", "2025-01-01")], &photos);
        assert_eq!(stats, LibraryStats { albums: 1, photos: 2, favorites: 1 });

        let settings = Settings {
            couple_name: "Sam & Alex".to_string(),
            anniversary: "2024-02-14".to_string(),
        };
        let now = Local.with_ymd_and_hms(2024, 2, 16, 12, 0, 0).earliest().unwrap();
        assert_eq!(days_together(&settings, now), 2);
    }
}
