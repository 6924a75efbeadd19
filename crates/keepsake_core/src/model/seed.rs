//! Built-in sample memories.
//!
//! Used as the initial state of the legacy snapshot store and as fixtures.

use crate::model::memory::{MemoryEntry, MemoryId};
use chrono::NaiveDate;

/// Image shown when an entry has no stored photo.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=400&width=600";

const SEED_ROWS: [(i64, &str, (i32, u32, u32), &str); 5] = [
    (
        1,
        "First Smile",
        (2023, 1, 15),
        "Noah smiled for the first time today! It was during his morning feeding, and it was the most precious thing we've ever seen.",
    ),
    (
        2,
        "Tummy Time Champion",
        (2023, 2, 3),
        "Noah held his head up during tummy time for a full minute today! He's getting stronger every day.",
    ),
    (
        3,
        "First Laugh",
        (2023, 2, 28),
        "Noah laughed out loud for the first time when playing peek-a-boo. The sound was magical!",
    ),
    (
        4,
        "Rolling Over",
        (2023, 3, 15),
        "Big milestone today! Noah rolled over from his back to his tummy all by himself.",
    ),
    (
        5,
        "First Solid Food",
        (2023, 4, 10),
        "Noah tried sweet potatoes today. His face was priceless - a mix of confusion and delight!",
    ),
];

/// Returns the five sample entries, sorted by date.
pub fn seed_memories() -> Vec<MemoryEntry> {
    SEED_ROWS
        .iter()
        .filter_map(|(id, title, (year, month, day), description)| {
            let date = NaiveDate::from_ymd_opt(*year, *month, *day)?;
            Some(MemoryEntry::new(
                MemoryId(*id),
                *title,
                date,
                *description,
                PLACEHOLDER_IMAGE,
            ))
        })
        .collect()
}
