//! Domain logic
//!
//! This module contains domain-specific business logic:
//! - Sanitation of untrusted response fields
//! - Raw pages and record mapping
//! - Shot log parsing

pub mod record;
pub mod shot;
pub mod validate;

pub use record::{map_records, HistoryItem, RawPage, RecordParser};
pub use shot::{ShotParser, ShotSample, ShotSummary};
