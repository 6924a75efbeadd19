//! Memory entry domain model.
//!
//! # Responsibility
//! - Define the canonical milestone record rendered by Home/Timeline/Gallery.
//! - Define creation inputs (`MemoryDraft`, `ImagePayload`) and their validation.
//! - Derive month labels and long display dates from calendar dates.
//!
//! # Invariants
//! - `month` and `display_date` are always derived from `date`, never stored
//!   independently.
//! - Draft title/description are non-blank after trimming.
//! - Image payloads are never empty.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const LONG_DATE_FORMAT: &str = "%B %-d, %Y";
const DEFAULT_EXTENSION: &str = "bin";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{1,10}$").expect("valid extension regex"));

/// Server-assigned identifier of one memory entry.
///
/// Opaque to callers; only equality and display are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub i64);

impl Display for MemoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: MemoryId,
    pub title: String,
    /// Calendar date used as the collection sort key.
    pub date: NaiveDate,
    /// Long human-readable form of `date`, e.g. `May 2, 2023`.
    pub display_date: String,
    pub description: String,
    /// Publicly resolvable URL of the stored photo.
    pub image_url: String,
    /// Month name derived from `date`, used for timeline grouping.
    pub month: String,
}

impl MemoryEntry {
    /// Builds an entry and derives its display fields from `date`.
    pub fn new(
        id: MemoryId,
        title: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            date,
            display_date: format_long_date(date),
            description: description.into(),
            image_url: image_url.into(),
            month: month_label(date).to_string(),
        }
    }
}

/// Validated input for creating one memory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDraft {
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
}

impl MemoryDraft {
    /// Creates a draft with trimmed text fields.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyDescription` when a text field is blank.
    pub fn new(
        title: impl AsRef<str>,
        date: NaiveDate,
        description: impl AsRef<str>,
    ) -> Result<Self, MemoryValidationError> {
        let draft = Self {
            title: title.as_ref().trim().to_string(),
            date,
            description: description.as_ref().trim().to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Checks the draft text fields.
    pub fn validate(&self) -> Result<(), MemoryValidationError> {
        if self.title.trim().is_empty() {
            return Err(MemoryValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(MemoryValidationError::EmptyDescription);
        }
        Ok(())
    }
}

/// Raw image file handed over by the admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Original file name as picked by the user; only its extension is used.
    pub file_name: String,
    /// Content type reported by the picker, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Rejects empty payloads.
    pub fn validate(&self) -> Result<(), MemoryValidationError> {
        if self.bytes.is_empty() {
            return Err(MemoryValidationError::EmptyImage);
        }
        Ok(())
    }

    /// Lowercased file extension, or `bin` when missing or unusable.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| EXTENSION_RE.is_match(ext))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }

    /// Reported content type, falling back to an extension lookup.
    pub fn resolved_content_type(&self) -> String {
        if let Some(value) = self.content_type.as_deref() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        content_type_for_extension(&self.extension()).to_string()
    }

    /// Encodes the payload as a `data:` URL for instant previews.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.resolved_content_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Validation failures for creation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryValidationError {
    EmptyTitle,
    EmptyDescription,
    EmptyImage,
    InvalidDate(String),
}

impl Display for MemoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::EmptyDescription => write!(f, "description cannot be empty"),
            Self::EmptyImage => write!(f, "image payload cannot be empty"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`"),
        }
    }
}

impl Error for MemoryValidationError {}

/// Returns the English month name for `date`, independent of year.
pub fn month_label(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

/// Formats `date` as `January 15, 2023`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format(LONG_DATE_FORMAT).to_string()
}

/// Parses a stored or user-entered date.
///
/// Accepted shapes:
/// - `YYYY-MM-DD` (date inputs and `date` columns)
/// - RFC 3339 timestamps (`timestamptz` columns); the calendar date in the
///   timestamp's own offset is used
/// - `YYYY-MM-DDTHH:MM:SS[.fff]` without offset
/// - the long display form (`January 15, 2023`)
pub fn parse_entry_date(value: &str) -> Result<NaiveDate, MemoryValidationError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp.date());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%B %d, %Y")
        .map_err(|_| MemoryValidationError::InvalidDate(trimmed.to_string()))
}

fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
