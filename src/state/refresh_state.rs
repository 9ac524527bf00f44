/// Per-item refresh state definitions
///
/// A stored item moves through these states once per sync run.
use std::fmt;

/// Represents where a stored item is in its refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshState {
    // ===== Active States =====
    /// Re-fetching the item's detail page
    FetchingDetail,

    /// Comparing the live episode index against the stored one
    Diffing,

    /// Fetching only the chapters missing from the store
    FetchingNewChapters,

    /// Combining new chapters and episodes with the stored document
    Merging,

    // ===== Terminal States =====
    /// Nothing new was published
    NoOp,

    /// The merged document was written
    Persisted,

    /// The detail page could not be fetched or parsed
    SkippedError,
}

impl RefreshState {
    /// Returns true if the item needs no further work this run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoOp | Self::Persisted | Self::SkippedError)
    }

    /// Returns true if this transition is part of the refresh state machine
    ///
    /// `FetchingDetail → Diffing → (NoOp | FetchingNewChapters → Merging → Persisted)`,
    /// with `FetchingDetail → SkippedError` on failure.
    pub fn can_transition_to(&self, next: RefreshState) -> bool {
        matches!(
            (self, next),
            (Self::FetchingDetail, Self::Diffing)
                | (Self::FetchingDetail, Self::SkippedError)
                | (Self::Diffing, Self::NoOp)
                | (Self::Diffing, Self::FetchingNewChapters)
                | (Self::FetchingNewChapters, Self::Merging)
                | (Self::Merging, Self::Persisted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingDetail => "fetching_detail",
            Self::Diffing => "diffing",
            Self::FetchingNewChapters => "fetching_new_chapters",
            Self::Merging => "merging",
            Self::NoOp => "no_op",
            Self::Persisted => "persisted",
            Self::SkippedError => "skipped_error",
        }
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
