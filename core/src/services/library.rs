//! Library service
//!
//! Owns the album and photo collections. Every operation applies its
//! change in memory immediately and schedules a persist of each
//! collection it changed. Rejected input (blank names, invalid dates,
//! unknown ids) is a silent no-op reported as `None` or `false`.

use crate::config::{ALBUMS_KEY, PHOTOS_KEY};
use crate::dates::{generate_id, is_valid_date, today};
use crate::models::{Album, NewPhoto, Photo};
use crate::storage::{KeyValueStore, Persister};
use chrono::Utc;

/// Result of deleting an album and its photos
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumDeletion {
    /// The removed album, if it existed
    pub album: Option<Album>,
    /// Number of photos removed with it
    pub photos_removed: usize,
}

/// Service for managing albums and photos
pub struct LibraryService {
    albums: Vec<Album>,
    photos: Vec<Photo>,
    persister: Persister,
}

impl LibraryService {
    pub fn new(albums: Vec<Album>, photos: Vec<Photo>, persister: Persister) -> Self {
        Self {
            albums,
            photos,
            persister,
        }
    }

    /// Load both collections. Unreadable records are dropped, the rest kept.
    pub async fn load(kv: &KeyValueStore, persister: Persister) -> Self {
        let albums: Vec<Album> = kv.load_list(ALBUMS_KEY).await;
        let photos: Vec<Photo> = kv.load_list(PHOTOS_KEY).await;

        tracing::info!("Loaded {} albums and {} photos", albums.len(), photos.len());

        Self::new(albums, photos, persister)
    }

    /// Albums, newest first
    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    /// Photos, newest first
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn album(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    // ===== Albums =====

    /// Create an album. A missing or invalid date falls back to today.
    pub fn create_album(&mut self, name: &str, date_iso: Option<&str>) -> Option<Album> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Ignoring album with blank name");
            return None;
        }

        let date_iso = date_iso
            .filter(|d| is_valid_date(d))
            .map(str::to_string)
            .unwrap_or_else(today);

        let album = Album {
            id: generate_id(),
            name: name.to_string(),
            date_iso,
            created_at: Utc::now(),
        };

        tracing::info!("Creating album {} ({})", album.id, album.name);

        self.albums.insert(0, album.clone());
        self.persist_albums();

        Some(album)
    }

    pub fn rename_album(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Ignoring rename of {} to a blank name", id);
            return false;
        }

        let Some(album) = self.albums.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        album.name = name.to_string();

        tracing::info!("Renamed album {} to {}", id, name);
        self.persist_albums();
        true
    }

    /// Delete an album and every photo filed under it.
    ///
    /// Photos referencing `id` are removed even when no such album exists.
    pub fn delete_album(&mut self, id: &str) -> AlbumDeletion {
        let album = self
            .albums
            .iter()
            .position(|a| a.id == id)
            .map(|idx| self.albums.remove(idx));

        let before = self.photos.len();
        self.photos.retain(|p| p.album_id.as_deref() != Some(id));
        let photos_removed = before - self.photos.len();

        if album.is_some() {
            self.persist_albums();
        }
        if photos_removed > 0 {
            self.persist_photos();
        }

        tracing::info!("Deleted album {} with {} photos", id, photos_removed);

        AlbumDeletion {
            album,
            photos_removed,
        }
    }

    // ===== Photos =====

    /// Add a photo.
    ///
    /// The date is the explicit one if valid, else the album's date when
    /// the photo is filed into an existing album, else today.
    pub fn add_photo(&mut self, req: NewPhoto) -> Option<Photo> {
        let photo = self.build_photo(req)?;

        tracing::info!("Adding photo {}", photo.id);

        self.photos.insert(0, photo.clone());
        self.persist_photos();

        Some(photo)
    }

    /// Add several picked images to one album (or unfiled).
    ///
    /// Blank uris are skipped. Each photo is prepended in turn, so the
    /// last uri ends up first. One persist covers the whole batch.
    pub fn add_photos<I, S>(&mut self, uris: I, album_id: Option<&str>) -> Vec<Photo>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = Vec::new();

        for uri in uris {
            let req = NewPhoto {
                uri: uri.into(),
                album_id: album_id.map(str::to_string),
                date_iso: None,
                caption: None,
            };
            if let Some(photo) = self.build_photo(req) {
                self.photos.insert(0, photo.clone());
                added.push(photo);
            }
        }

        if !added.is_empty() {
            tracing::info!("Added {} photos", added.len());
            self.persist_photos();
        }

        added
    }

    fn build_photo(&self, req: NewPhoto) -> Option<Photo> {
        if req.uri.trim().is_empty() {
            tracing::debug!("Ignoring photo without uri");
            return None;
        }

        let album_date = req
            .album_id
            .as_deref()
            .and_then(|id| self.album(id))
            .map(|a| a.date_iso.clone());

        let date_iso = req
            .date_iso
            .filter(|d| is_valid_date(d))
            .or(album_date)
            .unwrap_or_else(today);

        Some(Photo {
            id: generate_id(),
            uri: req.uri,
            album_id: req.album_id,
            date_iso,
            caption: req.caption.unwrap_or_default(),
            favorite: false,
            created_at: Utc::now(),
        })
    }

    /// Flip the favorite flag, returning the new value
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let photo = self.photos.iter_mut().find(|p| p.id == id)?;
        photo.favorite = !photo.favorite;
        let favorite = photo.favorite;

        self.persist_photos();
        Some(favorite)
    }

    /// Replace the caption; `None` clears it
    pub fn update_caption(&mut self, id: &str, text: Option<&str>) -> bool {
        let Some(photo) = self.photos.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        photo.caption = text.unwrap_or_default().to_string();

        self.persist_photos();
        true
    }

    /// Replace the photo's own date. Invalid dates are rejected, not corrected.
    pub fn update_photo_date(&mut self, id: &str, date_iso: &str) -> bool {
        if !is_valid_date(date_iso) {
            tracing::debug!("Ignoring invalid date {:?} for photo {}", date_iso, id);
            return false;
        }

        let Some(photo) = self.photos.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        photo.date_iso = date_iso.to_string();

        self.persist_photos();
        true
    }

    /// File a photo under `album_id`, or unfile it with `None`.
    ///
    /// The target album is not checked for existence.
    pub fn move_photo_to_album(&mut self, id: &str, album_id: Option<&str>) -> bool {
        if let Some(target) = album_id {
            if self.album(target).is_none() {
                tracing::debug!("Moving photo {} to unknown album {}", id, target);
            }
        }

        let Some(photo) = self.photos.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        photo.album_id = album_id.map(str::to_string);

        self.persist_photos();
        true
    }

    pub fn delete_photo(&mut self, id: &str) -> Option<Photo> {
        let idx = self.photos.iter().position(|p| p.id == id)?;
        let photo = self.photos.remove(idx);

        tracing::info!("Deleted photo {}", id);
        self.persist_photos();
        Some(photo)
    }

    /// Drop every album and photo
    pub fn clear(&mut self) {
        self.albums.clear();
        self.photos.clear();
        self.persist_albums();
        self.persist_photos();
    }

    fn persist_albums(&self) {
        self.persister.schedule(ALBUMS_KEY, &self.albums);
    }

    fn persist_photos(&self) {
        self.persister.schedule(PHOTOS_KEY, &self.photos);
    }
}
