//! Pagination state of the history list
//!
//! [`HistoryState`] is only mutated by [`crate::core::update::update`]; every
//! other component reads it through the accessors below.

mod connectivity;
mod phase;

pub use connectivity::Connectivity;
pub use phase::{SyncMode, SyncPhase};

/// Default number of records requested per page
pub const LIMIT: u64 = 5;

/// Accumulated records plus the bookkeeping needed to fetch the next page
#[derive(Debug, Clone)]
pub struct HistoryState<T> {
    /// Records in arrival order
    pub(crate) items: Vec<T>,
    /// Offset of the next page; a multiple of the page size while idle
    pub(crate) cursor: u64,
    /// Total claimed by the remote, may be stale
    pub(crate) total: u64,
    pub(crate) has_more: bool,
    pub(crate) phase: SyncPhase,
    /// Tag of the most recently issued fetch
    pub(crate) generation: u64,
    /// A reset was requested while a request was in flight
    pub(crate) reset_queued: bool,
    pub(crate) connectivity: Connectivity,
    pub(crate) last_error: Option<String>,
}

impl<T> Default for HistoryState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            total: 0,
            has_more: false,
            phase: SyncPhase::Pending,
            generation: 0,
            reset_queued: false,
            connectivity: Connectivity::Disconnected,
            last_error: None,
        }
    }
}

impl<T> HistoryState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn loading_initial(&self) -> bool {
        self.phase.loading_initial()
    }

    pub fn loading_incremental(&self) -> bool {
        self.phase.loading_incremental()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_reset_queued(&self) -> bool {
        self.reset_queued
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Last failure reported by a fetch or delete, cleared by the next
    /// successful fetch
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
