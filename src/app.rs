use std::{io::Write, sync::Arc};

use color_eyre::eyre::{eyre, Result};

use crate::{
    domain::{RecordParser, ShotParser},
    infrastructure::{
        channel::{ApiChannel, LocalChannel},
        cli::Command,
        config::Config,
        connectivity::ConnectivityWatcher,
        history_source::{ApiHistorySource, HistorySource},
        shot_store::ShotStore,
    },
    integration::Runtime,
    presentation::HistoryView,
};

/// Run one CLI command against the shot store configured in `config`
pub async fn run(command: Command, config: Config) -> Result<()> {
    let stdout = std::io::stdout();
    run_with(command, config, &mut stdout.lock()).await
}

/// Same as [`run`], writing the output to `out`
pub async fn run_with(command: Command, config: Config, out: &mut impl Write) -> Result<()> {
    log::info!(
        "Using shot history at {} (page size {})",
        config.history_dir.display(),
        config.page_size
    );
    let source = Arc::new(ApiHistorySource::new(LocalChannel::new(ShotStore::new(
        &config.history_dir,
    ))));

    match command {
        Command::Show { id } => {
            source.channel().set_connected(true);
            let raw = source.get(id.clone()).await?;
            let shot = ShotParser
                .parse(&raw)
                .ok_or_else(|| eyre!("shot {id} has an unreadable log"))?;
            writeln!(out, "{shot}")?;
            writeln!(out, "{} samples", shot.samples.len())?;
        }
        Command::List { pages } => {
            let (mut runtime, _watcher) = connect(source, config.page_size).await;
            for _ in 1..pages {
                if !runtime.has_more() {
                    break;
                }
                runtime.load_more();
                runtime.settle().await;
            }
            print_history(&runtime, out)?;
        }
        Command::Delete { id } => {
            let (mut runtime, _watcher) = connect(source, config.page_size).await;
            runtime.on_delete(id);
            runtime.settle().await;
            print_history(&runtime, out)?;
        }
    }
    Ok(())
}

/// Build the runtime, bring the channel up and wait for the first page.
///
/// The watcher must be kept alive for reconnects to trigger a resync.
async fn connect(
    source: Arc<ApiHistorySource<LocalChannel>>,
    page_size: u64,
) -> (Runtime<ShotParser>, ConnectivityWatcher) {
    let mut runtime = Runtime::new(ShotParser, source.clone(), page_size);
    let watcher = runtime.watch_connectivity(source.channel().connectivity());
    source.channel().set_connected(true);
    runtime.settle_initial().await;
    (runtime, watcher)
}

fn print_history(runtime: &Runtime<ShotParser>, out: &mut impl Write) -> Result<()> {
    for line in HistoryView::render(runtime.state()) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    const LOG: &str = "1,Classic 9 bar,1704091367\n25000,93,92.8,9,8.9,2.1,0,1.9,1.8,36.5,35.0\n";

    fn setup(count: usize) -> Result<(tempfile::TempDir, Config)> {
        let dir = tempfile::tempdir()?;
        let store = ShotStore::new(dir.path());
        for i in 1..=count {
            store.insert(&format!("{i:06}"), LOG)?;
        }
        let config = Config {
            page_size: 2,
            history_dir: dir.path().to_path_buf(),
        };
        Ok((dir, config))
    }

    async fn output(command: Command, config: Config) -> Result<Vec<String>> {
        let mut out = Vec::new();
        run_with(command, config, &mut out).await?;
        Ok(String::from_utf8(out)?.lines().map(str::to_string).collect())
    }

    #[tokio::test]
    async fn test_list_pages() -> Result<()> {
        let (_dir, config) = setup(5)?;
        let lines = output(Command::List { pages: 2 }, config).await?;
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Showing 4 of 5 shots");
        assert!(lines[1].starts_with("#000005  "));
        assert!(lines[4].starts_with("#000002  "));
        assert_eq!(lines[5], "Load More (1 remaining)");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_empty_store() -> Result<()> {
        let (_dir, config) = setup(0)?;
        let lines = output(Command::List { pages: 3 }, config).await?;
        assert_eq!(lines, vec!["Showing 0 of 0 shots", "No shots available"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reloads() -> Result<()> {
        let (_dir, config) = setup(3)?;
        let lines = output(Command::Delete { id: "000003".into() }, config).await?;
        assert_eq!(lines[0], "Showing 2 of 2 shots");
        assert!(lines[1].starts_with("#000002  "));
        assert_eq!(lines.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_reports_error() -> Result<()> {
        let (_dir, config) = setup(1)?;
        let lines = output(Command::Delete { id: "000009".into() }, config).await?;
        assert_eq!(lines[0], "Showing 1 of 1 shots");
        assert!(lines
            .last()
            .is_some_and(|l| l.starts_with("Error: ") && l.contains("not found")));
        Ok(())
    }

    #[tokio::test]
    async fn test_show() -> Result<()> {
        let (_dir, config) = setup(1)?;
        let lines = output(Command::Show { id: "000001".into() }, config.clone()).await?;
        assert_eq!(
            lines,
            vec![
                "#000001  2024-01-01 06:42  Classic 9 bar  25.0s  36.5g",
                "1 samples"
            ]
        );
        assert!(output(Command::Show { id: "000002".into() }, config)
            .await
            .is_err());
        Ok(())
    }
}
