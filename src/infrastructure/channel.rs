//! Request/response channels to the machine holding the shot history

use color_eyre::eyre::{eyre, Result, WrapErr};
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::watch;

use crate::infrastructure::shot_store::ShotStore;

/// An already established request/response channel
pub trait ApiChannel: Send + Sync {
    /// Send one request and wait for its response
    fn request(&self, request: Value) -> BoxFuture<'_, Result<Value>>;

    /// Subscribe to the connectivity flag of the channel
    fn connectivity(&self) -> watch::Receiver<bool>;
}

/// In-process channel answering requests from a [`ShotStore`]
pub struct LocalChannel {
    store: ShotStore,
    connected: watch::Sender<bool>,
}

impl LocalChannel {
    /// Create a channel that starts out disconnected
    pub fn new(store: ShotStore) -> Self {
        Self {
            store,
            connected: watch::Sender::new(false),
        }
    }

    pub fn store(&self) -> &ShotStore {
        &self.store
    }

    /// Subscribers are only notified when the flag actually changes
    pub fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|current| {
            let modified = *current != connected;
            *current = connected;
            modified
        });
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }
}

impl ApiChannel for LocalChannel {
    fn request(&self, request: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(eyre!("channel is not connected"));
            }
            let store = self.store.clone();
            tokio::task::spawn_blocking(move || store.handle_request(&request))
                .await
                .wrap_err("shot store task failed")
        })
    }

    fn connectivity(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }
}
