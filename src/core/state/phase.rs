//! Sync phase of a history list
//!
//! The two busy flags the list exposes (initial load, incremental load) are
//! derived from a single phase so that overlapping operations cannot be
//! represented.

use serde::{Deserialize, Serialize};
use strum::Display;

/// How a sync merges its page into the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum SyncMode {
    /// Discard the list and fetch from offset 0
    Reset,
    /// Append the page at the current cursor
    Continue,
}

/// What the list is currently waiting for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Created, no fetch issued yet
    #[default]
    Pending,
    Idle,
    FetchingInitial { generation: u64, offset: u64 },
    FetchingMore { generation: u64, offset: u64 },
    /// Waiting for the remote to acknowledge a delete
    Deleting { id: String },
}

impl SyncPhase {
    /// Busy flag covering reset fetches; the list itself is not shown
    pub fn loading_initial(&self) -> bool {
        matches!(self, SyncPhase::Pending | SyncPhase::FetchingInitial { .. })
    }

    /// Busy flag covering continue fetches and deletes; the list stays visible
    pub fn loading_incremental(&self) -> bool {
        matches!(
            self,
            SyncPhase::FetchingMore { .. } | SyncPhase::Deleting { .. }
        )
    }

    /// Whether a remote request is in flight
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, SyncPhase::Pending | SyncPhase::Idle)
    }

    /// The fetch in flight, as `(mode, generation, offset)`
    pub fn fetch(&self) -> Option<(SyncMode, u64, u64)> {
        match *self {
            SyncPhase::FetchingInitial { generation, offset } => {
                Some((SyncMode::Reset, generation, offset))
            }
            SyncPhase::FetchingMore { generation, offset } => {
                Some((SyncMode::Continue, generation, offset))
            }
            _ => None,
        }
    }
}
