use clap::Parser;
use color_eyre::eyre::Result;

use shot_history::{
    app,
    infrastructure::{cli::Cli, config::Config},
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    // Load configuration (file-based), then apply CLI overrides
    let mut config = Config::new()?;
    if let Some(dir) = args.dir {
        config.history_dir = dir;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    app::run(args.command, config).await
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
