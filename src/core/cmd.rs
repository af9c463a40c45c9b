use serde::{Deserialize, Serialize};

/// Elm-like command definitions
/// Side effects requested by the update function and carried out by the
/// command executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmd {
    /// Request one page from the remote source
    FetchPage {
        generation: u64,
        offset: u64,
        limit: u64,
    },
    /// Ask the remote source to delete a record
    DeleteRecord { id: String },
    /// Hand a failure to the observability sink
    ReportError { message: String },
}

impl Cmd {
    /// Short name for execution logs
    pub fn name(&self) -> &'static str {
        match self {
            Cmd::FetchPage { .. } => "FetchPage",
            Cmd::DeleteRecord { .. } => "DeleteRecord",
            Cmd::ReportError { .. } => "ReportError",
        }
    }
}
