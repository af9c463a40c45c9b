//! Render-ready summary of the history list
//!
//! Everything a list widget needs to decide what to draw, computed from the
//! state with the same guards the list applies to untrusted totals.

use std::fmt::Display;

use crate::{
    core::state::HistoryState,
    domain::{validate, HistoryItem},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    pub showing: usize,
    pub total: u64,
    /// Records not loaded yet, never negative
    pub remaining: u64,
    /// Initial load in progress; the list is hidden
    pub show_spinner: bool,
    pub show_empty: bool,
    pub show_load_more: bool,
    /// Load more button is disabled and shows a busy indicator
    pub load_more_busy: bool,
    /// Busy indicator shown without a button
    pub show_trailing_spinner: bool,
    pub error: Option<String>,
}

impl HistoryView {
    pub fn from_state<T>(state: &HistoryState<T>) -> Self {
        let showing = state.len();
        let total = state.total();
        Self {
            showing,
            total,
            remaining: validate::remaining(total, showing),
            show_spinner: state.loading_initial(),
            show_empty: showing == 0 && !state.loading_initial(),
            show_load_more: state.has_more() && total > showing as u64,
            load_more_busy: state.loading_incremental(),
            show_trailing_spinner: state.loading_incremental() && !state.has_more(),
            error: state.last_error().map(str::to_string),
        }
    }

    pub fn header(&self) -> String {
        format!("Showing {} of {} shots", self.showing, self.total)
    }

    /// Plain text rendering, one line per row
    pub fn render<T: HistoryItem + Display>(state: &HistoryState<T>) -> Vec<String> {
        let view = Self::from_state(state);
        if view.show_spinner {
            return vec!["Loading...".to_string()];
        }

        let mut lines = vec![view.header()];
        lines.extend(state.items().iter().map(ToString::to_string));
        if view.show_empty {
            lines.push("No shots available".to_string());
        }
        if view.show_load_more {
            lines.push(if view.load_more_busy {
                "Loading...".to_string()
            } else {
                format!("Load More ({} remaining)", view.remaining)
            });
        }
        if view.show_trailing_spinner {
            lines.push("Loading...".to_string());
        }
        if let Some(error) = &view.error {
            lines.push(format!("Error: {error}"));
        }
        lines
    }
}
