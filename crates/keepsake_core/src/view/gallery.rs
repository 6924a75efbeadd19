//! Gallery screen: photo grid plus a full-size modal.

use super::home::non_empty_or_placeholder;
use super::possessive;
use crate::model::memory::{MemoryEntry, MemoryId};
use serde::Serialize;

/// One grid tile; also the modal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub id: MemoryId,
    pub image_url: String,
    pub title: String,
    pub date: String,
}

/// Projects every entry, in collection order, into a grid tile.
pub fn project(entries: &[MemoryEntry]) -> Vec<GalleryItem> {
    entries
        .iter()
        .map(|entry| GalleryItem {
            id: entry.id,
            image_url: non_empty_or_placeholder(&entry.image_url),
            title: entry.title.clone(),
            date: entry.display_date.clone(),
        })
        .collect()
}

/// Modal selection state. Only one photo can be open at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryState {
    selected: Option<MemoryId>,
}

impl GalleryState {
    /// Opens the modal for `id` when it is one of `items`.
    pub fn open(&mut self, id: MemoryId, items: &[GalleryItem]) -> bool {
        if items.iter().any(|item| item.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<MemoryId> {
        self.selected
    }

    /// Item shown in the modal, if it is open and still present.
    pub fn modal<'a>(&self, items: &'a [GalleryItem]) -> Option<&'a GalleryItem> {
        let id = self.selected?;
        items.iter().find(|item| item.id == id)
    }
}

pub fn gallery_title(child_name: &str) -> String {
    format!("{} Gallery", possessive(child_name))
}
