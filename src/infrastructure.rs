//! Infrastructure layer
//!
//! This module handles external integrations and services:
//! - CLI argument processing
//! - Configuration
//! - Request channels and the history source built on them
//! - The local shot store
//! - Connectivity watching

pub mod channel;
pub mod cli;
pub mod config;
pub mod connectivity;
pub mod history_source;
pub mod shot_store;
