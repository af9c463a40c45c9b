use std::sync::atomic::{AtomicU64, Ordering};

use color_eyre::eyre::{eyre, Result};
use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::{domain::RawPage, infrastructure::channel::ApiChannel};

/// The remote end of the history list
pub trait HistorySource: Send + Sync {
    /// Fetch `limit` records starting at `offset`
    fn list_page(&self, offset: u64, limit: u64) -> BoxFuture<'_, Result<RawPage>>;

    /// Delete one record; resolves once the remote has acknowledged it
    fn delete(&self, id: String) -> BoxFuture<'_, Result<()>>;

    /// Fetch one raw record
    fn get(&self, id: String) -> BoxFuture<'_, Result<Value>>;
}

/// [`HistorySource`] speaking the `req:history:*` protocol over an
/// [`ApiChannel`]
pub struct ApiHistorySource<C> {
    channel: C,
    next_rid: AtomicU64,
}

impl<C: ApiChannel> ApiHistorySource<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            next_rid: AtomicU64::new(1),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn rid(&self) -> u64 {
        self.next_rid.fetch_add(1, Ordering::Relaxed)
    }

    async fn call(&self, mut request: Value) -> Result<Value> {
        let rid = self.rid();
        request["rid"] = json!(rid.to_string());
        let tp = request["tp"].as_str().unwrap_or_default().to_string();
        log::debug!("Request {rid}: {tp}");

        let response = self.channel.request(request).await?;
        if let Some(error) = response.get("error") {
            let message = error.as_str().map_or_else(|| error.to_string(), str::to_string);
            return Err(eyre!("{tp} failed: {message}"));
        }
        Ok(response)
    }
}

impl<C: ApiChannel> HistorySource for ApiHistorySource<C> {
    fn list_page(&self, offset: u64, limit: u64) -> BoxFuture<'_, Result<RawPage>> {
        Box::pin(async move {
            let response = self
                .call(json!({
                    "tp": "req:history:list",
                    "offset": offset,
                    "limit": limit,
                }))
                .await?;
            Ok(RawPage::from_response(&response))
        })
    }

    fn delete(&self, id: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.call(json!({ "tp": "req:history:delete", "id": id }))
                .await?;
            Ok(())
        })
    }

    fn get(&self, id: String) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let response = self
                .call(json!({ "tp": "req:history:get", "id": id }))
                .await?;
            Ok(json!({
                "id": id,
                "history": response.get("history").cloned().unwrap_or(Value::Null),
            }))
        })
    }
}
