use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;

use crate::formats::{Bookmark, ManualType, Section};
use crate::storage::{BlobStore, LoadStatus, load_json, save_json};

pub const BOOKMARKS_KEY: &str = "ietm_bookmarks";

/// Saved section snapshots, mirrored wholesale to storage after each change.
///
/// Mutations update memory first. When the write that follows fails, the
/// in-memory change is kept and the error is returned to the caller.
#[derive(Debug)]
pub struct BookmarkStore {
    storage: Arc<dyn BlobStore>,
    bookmarks: Vec<Bookmark>,
    status: LoadStatus,
}

impl BookmarkStore {
    pub fn load(storage: Arc<dyn BlobStore>) -> anyhow::Result<Self> {
        let (bookmarks, status) =
            load_json::<Vec<Bookmark>>(storage.as_ref(), BOOKMARKS_KEY).context("load bookmarks")?;
        let bookmarks = bookmarks.unwrap_or_default();
        tracing::debug!(bookmarks = bookmarks.len(), ?status, "loaded bookmarks");

        Ok(Self {
            storage,
            bookmarks,
            status,
        })
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|bookmark| bookmark.id == id)
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|bookmark| bookmark.id == id)
    }

    /// Appends a snapshot of `section`.
    ///
    /// Does not check for an existing bookmark with the same id; use
    /// [`BookmarkStore::toggle`] or check [`BookmarkStore::is_bookmarked`] first.
    pub fn add(&mut self, section: &Section, manual_type: ManualType) -> anyhow::Result<()> {
        self.bookmarks.push(Bookmark {
            id: section.id.clone(),
            title: section.title.clone(),
            manual_type,
            content: section.content.clone().unwrap_or_default(),
            created_at: Utc::now(),
        });
        tracing::info!(section_id = %section.id, %manual_type, "bookmark added");
        self.save()
    }

    /// Removes every bookmark with `id` and returns how many were dropped.
    pub fn remove(&mut self, id: &str) -> anyhow::Result<usize> {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|bookmark| bookmark.id != id);
        let removed = before - self.bookmarks.len();
        tracing::info!(section_id = id, removed, "bookmark removed");
        self.save()?;
        Ok(removed)
    }

    /// Removes the bookmark for `section` if present, otherwise adds one.
    /// Returns whether the section is bookmarked afterwards.
    pub fn toggle(&mut self, section: &Section, manual_type: ManualType) -> anyhow::Result<bool> {
        if self.is_bookmarked(&section.id) {
            self.remove(&section.id)?;
            Ok(false)
        } else {
            self.add(section, manual_type)?;
            Ok(true)
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        save_json(self.storage.as_ref(), BOOKMARKS_KEY, &self.bookmarks).context("save bookmarks")
    }
}
