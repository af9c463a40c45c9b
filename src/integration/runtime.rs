use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        cmd::Cmd,
        cmd_executor::CmdExecutor,
        msg::Msg,
        state::{HistoryState, SyncMode, SyncPhase},
        update::{update, UpdateContext},
    },
    domain::RecordParser,
    infrastructure::{connectivity::ConnectivityWatcher, history_source::HistorySource},
    presentation::HistoryView,
};

/// Owns the history state and applies messages to it one at a time.
///
/// Remote requests run on background tasks; their completions are queued on
/// the runtime's channel and applied by [`Runtime::process_next`],
/// [`Runtime::settle`] or [`Runtime::run`].
pub struct Runtime<P: RecordParser> {
    state: HistoryState<P::Item>,
    parser: P,
    page_size: u64,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    cmd_executor: CmdExecutor,
}

impl<P: RecordParser> Runtime<P> {
    pub fn new(parser: P, source: Arc<dyn HistorySource>, page_size: u64) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let cmd_executor = CmdExecutor::new(source, msg_tx.clone());

        Self {
            state: HistoryState::new(),
            parser,
            page_size: page_size.max(1),
            msg_tx,
            msg_rx,
            cmd_executor,
        }
    }

    /// Get sender for message transmission
    pub fn sender(&self) -> mpsc::UnboundedSender<Msg> {
        self.msg_tx.clone()
    }

    /// Get current state (read-only)
    pub fn state(&self) -> &HistoryState<P::Item> {
        &self.state
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Apply one message and execute the commands it produces
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn dispatch(&mut self, msg: Msg) -> Vec<Cmd> {
        let ctx = UpdateContext {
            parser: &self.parser,
            page_size: self.page_size,
        };
        let state = std::mem::take(&mut self.state);
        let (state, commands) = update(msg, state, &ctx);
        self.state = state;

        for line in self.cmd_executor.execute_commands(&commands) {
            log::trace!("{line}");
        }
        commands
    }

    /// Apply every message already queued, without waiting
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
            processed += 1;
        }
        processed
    }

    /// Wait for the next queued message and apply it
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Apply messages until no request is in flight
    pub async fn settle(&mut self) {
        self.process_pending();
        while self.state.phase().is_outstanding() {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Wait for the first load to be issued, then settle
    pub async fn settle_initial(&mut self) {
        while self.state.phase() == &SyncPhase::Pending {
            if !self.process_next().await {
                return;
            }
        }
        self.settle().await;
    }

    /// Forward `connectivity` into this runtime for as long as the returned
    /// watcher lives
    pub fn watch_connectivity(&self, connectivity: watch::Receiver<bool>) -> ConnectivityWatcher {
        ConnectivityWatcher::spawn(connectivity, self.sender())
    }

    /// Apply messages until `cancel_token` is cancelled
    pub async fn run(&mut self, cancel_token: CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    log::info!("Runtime received cancellation signal");
                    break;
                }
                processed = self.process_next() => {
                    if !processed {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    // Actions exposed to the presentation layer

    pub fn load_more(&mut self) {
        self.dispatch(Msg::LoadMore);
    }

    pub fn reload(&mut self) {
        self.dispatch(Msg::LoadHistory(SyncMode::Reset));
    }

    pub fn on_delete(&mut self, id: impl Into<String>) {
        self.dispatch(Msg::Delete(id.into()));
    }

    pub fn items(&self) -> &[P::Item] {
        self.state.items()
    }

    pub fn total(&self) -> u64 {
        self.state.total()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn loading_initial(&self) -> bool {
        self.state.loading_initial()
    }

    pub fn loading_incremental(&self) -> bool {
        self.state.loading_incremental()
    }

    pub fn view(&self) -> HistoryView {
        HistoryView::from_state(&self.state)
    }
}
