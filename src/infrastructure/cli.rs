use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Directory holding the shot logs (overrides history_dir)"
    )]
    pub dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "N",
        help = "Records per page (overrides page_size)",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub page_size: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the history and print it
    List {
        #[arg(long, default_value_t = 1, help = "Number of pages to load")]
        pages: u32,
    },
    /// Delete one shot and print the reloaded history
    Delete { id: String },
    /// Print a single shot
    Show { id: String },
}
