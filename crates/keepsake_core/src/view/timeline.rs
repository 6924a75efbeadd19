//! Timeline screen: memories grouped by month label in collapsible sections.
//!
//! # Invariants
//! - Groups keep first-encounter order of their month label.
//! - Grouping uses the label only, so the same month of different years
//!   shares one section.
//! - On mount exactly the last group is expanded.

use super::possessive;
use crate::model::memory::MemoryEntry;
use serde::Serialize;
use std::collections::HashMap;

/// Entries sharing one month label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup<'a> {
    pub month: &'a str,
    pub entries: Vec<&'a MemoryEntry>,
}

/// One rendered section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSection<'a> {
    pub month: &'a str,
    pub expanded: bool,
    pub entries: Vec<&'a MemoryEntry>,
}

/// Groups entries by month label in first-encounter order.
pub fn group_by_month(entries: &[MemoryEntry]) -> Vec<MonthGroup<'_>> {
    let mut groups: Vec<MonthGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        match index.get(entry.month.as_str()) {
            Some(&position) => groups[position].entries.push(entry),
            None => {
                index.insert(entry.month.as_str(), groups.len());
                groups.push(MonthGroup {
                    month: entry.month.as_str(),
                    entries: vec![entry],
                });
            }
        }
    }
    groups
}

/// Local expand/collapse state. Independent of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineState {
    expanded: HashMap<String, bool>,
}

impl TimelineState {
    /// Initial state for a freshly shown timeline: last group expanded.
    pub fn mount(entries: &[MemoryEntry]) -> Self {
        let mut expanded = HashMap::new();
        if let Some(last) = group_by_month(entries).last() {
            expanded.insert(last.month.to_string(), true);
        }
        Self { expanded }
    }

    /// Flips one section. Unknown months start collapsed.
    pub fn toggle(&mut self, month: &str) -> bool {
        let flag = self.expanded.entry(month.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn is_expanded(&self, month: &str) -> bool {
        self.expanded.get(month).copied().unwrap_or(false)
    }

    /// Renders `entries` with the current expand flags.
    pub fn sections<'a>(&self, entries: &'a [MemoryEntry]) -> Vec<TimelineSection<'a>> {
        group_by_month(entries)
            .into_iter()
            .map(|group| TimelineSection {
                month: group.month,
                expanded: self.is_expanded(group.month),
                entries: group.entries,
            })
            .collect()
    }
}

/// Screen title, e.g. `Noah's Timeline`.
pub fn timeline_title(child_name: &str) -> String {
    format!("{} Timeline", possessive(child_name))
}
