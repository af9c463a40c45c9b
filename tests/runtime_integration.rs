use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use color_eyre::eyre::{eyre, Result};
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::watch;

use shot_history::{
    core::state::SyncPhase,
    domain::{HistoryItem, RawPage, RecordParser},
    infrastructure::history_source::HistorySource,
    integration::Runtime,
};

#[derive(Debug, Clone, PartialEq)]
struct Entry(String);

impl HistoryItem for Entry {
    fn id(&self) -> &str {
        &self.0
    }
}

struct EntryParser;

impl RecordParser for EntryParser {
    type Item = Entry;

    fn parse(&self, raw: &Value) -> Option<Entry> {
        raw.get("id")?.as_str().map(|id| Entry(id.to_string()))
    }
}

/// In-memory remote with request counting
struct Simulated {
    records: Mutex<Vec<String>>,
    list_requests: AtomicUsize,
    fail_delete: AtomicBool,
    malformed: AtomicBool,
}

impl Simulated {
    fn with_records(n: usize) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new((0..n).map(|i| format!("r{i}")).collect()),
            list_requests: AtomicUsize::new(0),
            fail_delete: AtomicBool::new(false),
            malformed: AtomicBool::new(false),
        })
    }

    fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }
}

impl HistorySource for Simulated {
    fn list_page(&self, offset: u64, limit: u64) -> BoxFuture<'_, Result<RawPage>> {
        Box::pin(async move {
            self.list_requests.fetch_add(1, Ordering::SeqCst);
            if self.malformed.load(Ordering::SeqCst) {
                return Ok(RawPage {
                    history: json!("not a list"),
                    total: json!(-4),
                    has_more: json!(1),
                });
            }

            let records = self.records.lock().map_err(|e| eyre!("{e}"))?;
            let total = records.len() as u64;
            let page: Vec<Value> = records
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|id| json!({ "id": id }))
                .collect();
            Ok(RawPage {
                history: Value::Array(page),
                total: json!(total),
                has_more: json!(offset + limit < total),
            })
        })
    }

    fn delete(&self, id: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(eyre!("storage is read-only"));
            }
            let mut records = self.records.lock().map_err(|e| eyre!("{e}"))?;
            let before = records.len();
            records.retain(|r| *r != id);
            if records.len() == before {
                return Err(eyre!("not found"));
            }
            Ok(())
        })
    }

    fn get(&self, id: String) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move { Ok(json!({ "id": id })) })
    }
}

fn ids(runtime: &Runtime<EntryParser>) -> Vec<String> {
    runtime.items().iter().map(|e| e.0.clone()).collect()
}

fn expected(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("r{i}")).collect()
}

async fn loaded(source: &Arc<Simulated>) -> Runtime<EntryParser> {
    let mut runtime = Runtime::new(EntryParser, source.clone(), 5);
    runtime.reload();
    runtime.settle().await;
    runtime
}

#[tokio::test]
async fn test_pages_accumulate_until_exhausted() {
    let source = Simulated::with_records(13);
    let mut runtime = Runtime::new(EntryParser, source.clone(), 5);
    assert!(runtime.loading_initial());

    runtime.reload();
    runtime.settle().await;
    assert_eq!(ids(&runtime), expected(0..5));
    assert_eq!(runtime.total(), 13);
    assert!(runtime.has_more());
    assert!(!runtime.loading_initial());

    runtime.load_more();
    assert!(runtime.loading_incremental());
    runtime.settle().await;
    assert!(!runtime.loading_incremental());
    assert_eq!(ids(&runtime), expected(0..10));
    assert!(runtime.has_more());

    runtime.load_more();
    runtime.settle().await;
    assert_eq!(ids(&runtime), expected(0..13));
    assert!(!runtime.has_more());
    assert_eq!(runtime.state().cursor(), 15);

    // Nothing left to fetch
    runtime.load_more();
    runtime.settle().await;
    assert_eq!(source.list_requests(), 3);
    assert_eq!(runtime.view().header(), "Showing 13 of 13 shots");
}

#[tokio::test]
async fn test_double_load_more_issues_one_fetch() {
    let source = Simulated::with_records(13);
    let mut runtime = loaded(&source).await;

    runtime.load_more();
    runtime.load_more();
    runtime.settle().await;

    assert_eq!(source.list_requests(), 2);
    assert_eq!(ids(&runtime), expected(0..10));
}

#[tokio::test]
async fn test_malformed_response_is_sanitized() {
    let source = Simulated::with_records(3);
    source.malformed.store(true, Ordering::SeqCst);
    let runtime = loaded(&source).await;

    assert!(runtime.items().is_empty());
    assert_eq!(runtime.total(), 0);
    assert!(runtime.has_more());
    let view = runtime.view();
    assert!(view.show_empty);
    assert!(!view.show_load_more);
    assert_eq!(view.remaining, 0);
}

#[tokio::test]
async fn test_delete_resyncs_from_start() {
    let source = Simulated::with_records(13);
    let mut runtime = loaded(&source).await;
    runtime.load_more();
    runtime.settle().await;

    runtime.on_delete("r1");
    assert!(runtime.loading_incremental());
    runtime.settle().await;

    assert_eq!(
        ids(&runtime),
        vec!["r0", "r2", "r3", "r4", "r5"]
    );
    assert_eq!(runtime.total(), 12);
    assert_eq!(runtime.state().cursor(), 5);
    assert_eq!(source.list_requests(), 3);
}

#[tokio::test]
async fn test_failed_delete_keeps_list() {
    let source = Simulated::with_records(13);
    source.fail_delete.store(true, Ordering::SeqCst);
    let mut runtime = loaded(&source).await;

    runtime.on_delete("r1");
    runtime.settle().await;

    assert_eq!(source.list_requests(), 1);
    assert_eq!(ids(&runtime), expected(0..5));
    assert_eq!(runtime.state().phase(), &SyncPhase::Idle);
    assert_eq!(
        runtime.view().error.as_deref(),
        Some("Failed to delete shot r1: storage is read-only")
    );
}

#[tokio::test]
async fn test_reset_while_continuing_discards_continue() {
    let source = Simulated::with_records(13);
    let mut runtime = loaded(&source).await;

    runtime.load_more();
    runtime.reload();
    assert!(runtime.state().is_reset_queued());
    runtime.settle().await;

    assert_eq!(source.list_requests(), 3);
    assert_eq!(ids(&runtime), expected(0..5));
    assert_eq!(runtime.state().cursor(), 5);
    assert!(!runtime.state().is_reset_queued());
}

#[tokio::test]
async fn test_reconnect_replaces_items() -> Result<()> {
    let source = Simulated::with_records(7);
    let mut runtime = Runtime::new(EntryParser, source.clone(), 5);
    let (connected, connectivity) = watch::channel(false);
    let watcher = runtime.watch_connectivity(connectivity);

    connected.send(true)?;
    runtime.settle_initial().await;
    assert_eq!(ids(&runtime), expected(0..5));

    connected.send(false)?;
    assert!(runtime.process_next().await);
    assert!(!runtime.state().connectivity().is_connected());

    source
        .records
        .lock()
        .map_err(|e| eyre!("{e}"))?
        .insert(0, "fresh".to_string());

    connected.send(true)?;
    assert!(runtime.process_next().await);
    assert!(runtime.loading_initial());
    assert!(runtime.items().is_empty());
    runtime.settle().await;

    assert_eq!(ids(&runtime), vec!["fresh", "r0", "r1", "r2", "r3"]);
    assert_eq!(runtime.total(), 8);
    assert_eq!(source.list_requests(), 2);

    watcher.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_fast_reconnect_still_reloads() -> Result<()> {
    let source = Simulated::with_records(7);
    let mut runtime = Runtime::new(EntryParser, source.clone(), 5);
    let (connected, connectivity) = watch::channel(false);
    let watcher = runtime.watch_connectivity(connectivity);

    connected.send(true)?;
    runtime.settle_initial().await;
    assert_eq!(source.list_requests(), 1);

    // Disconnect and reconnect before the watcher observes either
    connected.send(false)?;
    connected.send(true)?;
    assert!(runtime.process_next().await);
    assert!(!runtime.state().connectivity().is_connected());
    assert!(runtime.process_next().await);
    assert!(runtime.loading_initial());
    runtime.settle().await;

    assert_eq!(source.list_requests(), 2);
    assert_eq!(ids(&runtime), expected(0..5));

    watcher.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn test_run_until_cancelled() -> Result<()> {
    let source = Simulated::with_records(3);
    let mut runtime = Runtime::new(EntryParser, source.clone(), 5);
    runtime.reload();

    let cancel_token = tokio_util::sync::CancellationToken::new();
    let token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        token.cancel();
    });
    runtime.run(cancel_token).await?;

    assert_eq!(ids(&runtime), expected(0..3));
    assert!(!runtime.has_more());
    Ok(())
}
