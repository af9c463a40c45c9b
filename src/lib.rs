//! # Shot History
//!
//! A paginated, remotely backed list of espresso shot logs.
//! This library implements an Elm-like architecture for predictable state management.
//!
//! ## Architecture Overview
//!
//! - **Model** (`core::state`): History list state and its sync phase
//! - **Message** (`core::msg`): Requests and request completions
//! - **Update** (`core::update`): Pure function that transforms state
//! - **Command** (`core::cmd`): Side effects (remote fetch, delete)
//! - **View** (`presentation`): Render-ready data derived from state
//!
//! ## Example Usage
//!
//! ```rust
//! use shot_history::{
//!     core::{msg::Msg, state::{HistoryState, SyncMode}, update::{update, UpdateContext}},
//!     domain::ShotParser,
//!     Cmd,
//! };
//!
//! let ctx = UpdateContext { parser: &ShotParser, page_size: 5 };
//! let (state, commands) = update(Msg::LoadHistory(SyncMode::Reset), HistoryState::new(), &ctx);
//!
//! assert!(state.loading_initial());
//! assert!(matches!(commands.as_slice(), [Cmd::FetchPage { offset: 0, limit: 5, .. }]));
//! ```
//!
//! ## Modules
//!
//! - [`core`] - State, messages, update logic and command execution
//! - [`domain`] - Records, shot logs and validation of remote values
//! - [`infrastructure`] - Channels, history source, shot store, config and CLI
//! - [`integration`] - Runtime driving the update loop
//! - [`presentation`] - View model for the history list

pub mod app;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod integration;
pub mod presentation;
pub mod utils;

// Re-exports for convenience
pub use crate::core::{cmd::Cmd, msg::Msg, state::HistoryState, update::update};
pub use integration::Runtime;

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
