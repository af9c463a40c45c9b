use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::core::msg::Msg;

/// Forwards a connectivity signal into the runtime as
/// [`Msg::ConnectivityChanged`].
///
/// The subscription lives as long as the watcher: dropping it (or calling
/// [`ConnectivityWatcher::shutdown`]) stops forwarding.
pub struct ConnectivityWatcher {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ConnectivityWatcher {
    /// Subscribe to `connectivity`. The current value is forwarded right away,
    /// then every change.
    pub fn spawn(
        mut connectivity: watch::Receiver<bool>,
        msg_sender: mpsc::UnboundedSender<Msg>,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut last = *connectivity.borrow_and_update();
            if msg_sender.send(Msg::ConnectivityChanged(last)).is_err() {
                return;
            }

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        log::debug!("ConnectivityWatcher received cancellation signal");
                        break;
                    }
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            log::info!("Connectivity source closed");
                            break;
                        }
                        let connected = *connectivity.borrow_and_update();
                        if !forward(&msg_sender, last, connected) {
                            break;
                        }
                        last = connected;
                    }
                }
            }
        });

        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    /// Stop forwarding and wait for the subscription to be released
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("ConnectivityWatcher task failed: {e}");
            }
        }
    }
}

/// Send the messages for a change from `last` to `connected`.
///
/// `watch` only keeps the latest value, so a notification that carries the
/// value already forwarded means intermediate values were overwritten. For a
/// connected channel that is a missed disconnect, which is replayed so the
/// reconnect still triggers a reload. Returns `false` once the runtime is gone.
fn forward(msg_sender: &mpsc::UnboundedSender<Msg>, last: bool, connected: bool) -> bool {
    let messages: &[bool] = match (last, connected) {
        (true, true) => {
            log::debug!("Connectivity flapped while connected");
            &[false, true]
        }
        (false, false) => return true,
        _ => {
            log::debug!("Connectivity changed: {connected}");
            if connected {
                &[true]
            } else {
                &[false]
            }
        }
    };
    messages
        .iter()
        .all(|&c| msg_sender.send(Msg::ConnectivityChanged(c)).is_ok())
}

impl Drop for ConnectivityWatcher {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_initial_value_and_changes() {
        let (conn_tx, conn_rx) = watch::channel(false);
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let watcher = ConnectivityWatcher::spawn(conn_rx, msg_tx);

        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(false)));
        conn_tx.send_replace(true);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(true)));

        watcher.shutdown().await;
        conn_tx.send_replace(false);
        // The sender was moved into the finished task, so the channel closes
        assert_eq!(msg_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_flap_between_polls_is_replayed() {
        let (conn_tx, conn_rx) = watch::channel(true);
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let watcher = ConnectivityWatcher::spawn(conn_rx, msg_tx);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(true)));

        // Both sends land before the watcher task runs again
        conn_tx.send_replace(false);
        conn_tx.send_replace(true);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(false)));
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(true)));

        // Changes coalesced while disconnected collapse into the final value
        conn_tx.send_replace(false);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(false)));
        conn_tx.send_replace(true);
        conn_tx.send_replace(false);
        conn_tx.send_replace(true);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(true)));
        assert!(msg_rx.try_recv().is_err());

        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let (conn_tx, conn_rx) = watch::channel(true);
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let watcher = ConnectivityWatcher::spawn(conn_rx, msg_tx);
        assert_eq!(msg_rx.recv().await, Some(Msg::ConnectivityChanged(true)));

        drop(watcher);
        assert_eq!(msg_rx.recv().await, None);
        assert_eq!(conn_tx.receiver_count(), 0);
    }
}
