use crate::model::{Chapter, EpisodeIndex};
use serde::{Deserialize, Serialize};

/// Fields scraped from an item's detail page
///
/// Only `title` and the episode index are required by the parser; the other
/// fields are empty when the page does not carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub title: String,

    /// Path of the cover image
    #[serde(default)]
    pub banner: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub episodes: EpisodeIndex,
}

/// One stored item document, keyed by the item's site path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Site path uniquely identifying the item
    pub item_path: String,

    pub detail: ItemDetail,

    /// Fetched chapters, highest ordinal first
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl ItemRecord {
    pub fn new(item_path: impl Into<String>, detail: ItemDetail, chapters: Vec<Chapter>) -> Self {
        Self {
            item_path: item_path.into(),
            detail,
            chapters,
        }
    }

    pub fn title(&self) -> &str {
        &self.detail.title
    }

    pub fn episodes(&self) -> &EpisodeIndex {
        &self.detail.episodes
    }
}
