//! Home screen: headline, featured (most recent) memory, navigation.

use super::{possessive, Route};
use crate::model::memory::MemoryEntry;
use crate::model::seed::PLACEHOLDER_IMAGE;
use serde::Serialize;

/// Card showing the featured memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeaturedCard {
    pub image_url: String,
    /// Image alt text.
    pub alt: String,
    /// Caption; `None` while nothing is loaded.
    pub title: Option<String>,
    pub date: Option<String>,
}

/// Navigation button shown below the welcome text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub route: Route,
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub headline: String,
    pub tagline: String,
    pub welcome: String,
    pub featured: FeaturedCard,
    pub links: Vec<NavLink>,
}

impl HomeView {
    pub fn build(entries: &[MemoryEntry], child_name: &str) -> Self {
        let name = child_name.trim();
        let owner = possessive(name);
        let featured = match latest_memory(entries) {
            Some(entry) => FeaturedCard {
                image_url: non_empty_or_placeholder(&entry.image_url),
                alt: entry.title.clone(),
                title: Some(entry.title.clone()),
                date: Some(entry.display_date.clone()),
            },
            None => FeaturedCard {
                image_url: PLACEHOLDER_IMAGE.to_string(),
                alt: format!("{owner} favorite recent memory"),
                title: None,
                date: None,
            },
        };

        Self {
            headline: format!("{owner} First Year"),
            tagline: format!("A collection of memories from {owner} first year"),
            welcome: format!(
                "Welcome to {owner} memory collection! Here you'll find all the special moments from the first year of adventures, milestones, and precious memories."
            ),
            featured,
            links: [Route::Timeline, Route::Gallery]
                .into_iter()
                .map(|route| NavLink {
                    route,
                    label: route.label(),
                    path: route.path(),
                })
                .collect(),
        }
    }
}

/// Returns the entry with the greatest date; the last one wins ties.
pub fn latest_memory(entries: &[MemoryEntry]) -> Option<&MemoryEntry> {
    entries.iter().max_by_key(|entry| entry.date)
}

pub(crate) fn non_empty_or_placeholder(url: &str) -> String {
    if url.trim().is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else {
        url.to_string()
    }
}
