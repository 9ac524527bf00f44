//! State module for tracking refresh progress
//!
//! # Components
//!
//! - `RefreshState`: where a stored item is in a sync run (fetching detail,
//!   diffing, fetching new chapters, merging, or one of the terminal states)

mod refresh_state;

pub use refresh_state::RefreshState;
