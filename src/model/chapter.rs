use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `CHAPTER <digits>` anywhere in the name; the optional second group catches
/// fractional numbering so it can be rejected instead of truncated.
static ORDINAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CHAPTER (\d+)(\.\d+)?").expect("ordinal pattern is a valid regex")
});

/// A fetched chapter. Never revised once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number parsed from the display name
    pub ordinal: u64,

    /// Image locations (paths) in reading order
    pub images: Vec<String>,
}

impl Chapter {
    pub fn new(ordinal: u64, images: Vec<String>) -> Self {
        Self { ordinal, images }
    }
}

/// Extracts the chapter number from a display name
///
/// Matches `CHAPTER <integer>` case-insensitively. Names without a match,
/// with a fractional number (`CHAPTER 10.5`), or with a number too large for
/// `u64` yield `None`.
///
/// # Examples
///
/// ```
/// use comic_sync::model::extract_ordinal;
///
/// assert_eq!(extract_ordinal("Chapter 12"), Some(12));
/// assert_eq!(extract_ordinal("CHAPTER 10.5"), None);
/// assert_eq!(extract_ordinal("Extra"), None);
/// ```
pub fn extract_ordinal(name: &str) -> Option<u64> {
    let caps = ORDINAL_PATTERN.captures(name)?;
    if caps.get(2).is_some() {
        return None;
    }
    caps[1].parse().ok()
}

/// Sorts chapters by ordinal, highest first. Stable for equal ordinals.
pub fn sort_descending(chapters: &mut [Chapter]) {
    chapters.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));
}

pub fn is_sorted_descending(chapters: &[Chapter]) -> bool {
    chapters.windows(2).all(|w| w[0].ordinal >= w[1].ordinal)
}
