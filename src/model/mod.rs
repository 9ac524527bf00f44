//! Data model for catalog items
//!
//! - `ItemRecord`: one stored document, keyed by the item's site path
//! - `ItemDetail`: the fields scraped from an item's detail page
//! - `EpisodeIndex`: normalized chapter display name → chapter path
//! - `Chapter`: an ordinal plus its ordered image locations

mod chapter;
mod episode;
mod item;

pub use chapter::{extract_ordinal, is_sorted_descending, sort_descending, Chapter};
pub use episode::{normalize_episode_name, EpisodeIndex};
pub use item::{ItemDetail, ItemRecord};
