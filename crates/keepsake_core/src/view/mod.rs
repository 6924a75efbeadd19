//! View-models for the Home, Timeline, Gallery and Admin screens.
//!
//! # Responsibility
//! - Derive display state from the store's current collection.
//! - Own purely local UI state (expanded months, selected photo, form fields).
//!
//! # Invariants
//! - View-models never call the repository directly; mutations go through
//!   `MemoryStore::add`.
//! - Local UI state changes never touch the store.

use serde::Serialize;

pub mod admin;
pub mod gallery;
pub mod home;
pub mod timeline;

/// Navigable screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Timeline,
    Gallery,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Timeline => "/timeline",
            Self::Gallery => "/gallery",
            Self::Admin => "/admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Timeline => "Timeline",
            Self::Gallery => "Gallery",
            Self::Admin => "Admin",
        }
    }

    /// Routes listed in the bottom navigation bar.
    pub fn navigation() -> [Route; 3] {
        [Self::Home, Self::Timeline, Self::Gallery]
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// User-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

/// Possessive form used in headlines (`Noah's`, `James'`).
pub fn possessive(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.ends_with('s') || trimmed.ends_with('S') {
        format!("{trimmed}'")
    } else {
        format!("{trimmed}'s")
    }
}

#[cfg(test)]
mod tests {
    use super::{possessive, Route};

    #[test]
    fn possessive_handles_trailing_s() {
        assert_eq!(possessive("Noah"), "Noah's");
        assert_eq!(possessive(" James "), "James'");
    }

    #[test]
    fn navigation_excludes_admin() {
        let paths = Route::navigation().map(Route::path);
        assert_eq!(paths, ["/", "/timeline", "/gallery"]);
    }
}
