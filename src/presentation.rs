//! Presentation layer
//!
//! Render-ready data derived from the history state.

pub mod view;

pub use view::HistoryView;
