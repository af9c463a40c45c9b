use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use crate::{
    core::{cmd::Cmd, msg::Msg},
    infrastructure::history_source::HistorySource,
};

/// Command executor that carries out remote requests on background tasks and
/// reports their outcome back as messages
#[derive(Clone)]
pub struct CmdExecutor {
    source: Arc<dyn HistorySource>,
    msg_sender: mpsc::UnboundedSender<Msg>,
}

impl CmdExecutor {
    pub fn new(source: Arc<dyn HistorySource>, msg_sender: mpsc::UnboundedSender<Msg>) -> Self {
        Self { source, msg_sender }
    }

    /// Execute a single command
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute_command(&self, cmd: &Cmd) -> Result<()> {
        match cmd {
            Cmd::FetchPage {
                generation,
                offset,
                limit,
            } => {
                let (generation, offset, limit) = (*generation, *offset, *limit);
                let source = Arc::clone(&self.source);
                let tx = self.msg_sender.clone();
                log::debug!("CmdExecutor: fetching page {generation} at {offset} (limit {limit})");
                tokio::spawn(async move {
                    let result = source
                        .list_page(offset, limit)
                        .await
                        .map_err(|e| format!("{e:#}"));
                    if tx.send(Msg::PageLoaded { generation, result }).is_err() {
                        log::warn!("CmdExecutor: runtime gone, dropping page {generation}");
                    }
                });
            }

            Cmd::DeleteRecord { id } => {
                let id = id.clone();
                let source = Arc::clone(&self.source);
                let tx = self.msg_sender.clone();
                log::debug!("CmdExecutor: deleting {id}");
                tokio::spawn(async move {
                    let result = source
                        .delete(id.clone())
                        .await
                        .map_err(|e| format!("{e:#}"));
                    if tx.send(Msg::DeleteCompleted { id, result }).is_err() {
                        log::warn!("CmdExecutor: runtime gone, dropping delete result");
                    }
                });
            }

            Cmd::ReportError { message } => {
                log::error!("{message}");
            }
        }

        Ok(())
    }

    /// Execute multiple commands
    pub fn execute_commands(&self, commands: &[Cmd]) -> Vec<String> {
        let mut execution_log = Vec::new();

        for cmd in commands {
            match self.execute_command(cmd) {
                Ok(()) => {
                    execution_log.push(format!("✓ Executed: {}", cmd.name()));
                }
                Err(e) => {
                    let error_msg = format!("✗ Failed to execute {}: {e}", cmd.name());
                    log::error!("{error_msg}");
                    execution_log.push(error_msg);
                }
            }
        }

        execution_log
    }
}
