use serde::{Deserialize, Serialize};

use crate::{core::state::SyncMode, domain::RawPage};

/// Domain messages driving the history list
/// Intents come from the presentation layer or the connectivity watcher;
/// completions come back from the command executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Msg {
    /// Invoke the sync directly
    LoadHistory(SyncMode),
    /// Fetch the next page if the list allows it
    LoadMore,
    /// Delete a record, then reload from the start
    Delete(String),
    /// New value of the connectivity signal
    ConnectivityChanged(bool),

    /// A fetch finished
    PageLoaded {
        generation: u64,
        result: Result<RawPage, String>,
    },
    /// A delete finished
    DeleteCompleted {
        id: String,
        result: Result<(), String>,
    },
}
