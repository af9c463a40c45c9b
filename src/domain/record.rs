//! Raw pages and the mapping of raw records into typed history items

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value that can be shown in the history list.
///
/// The pagination core only needs a stable identifier, used both as the list
/// key and as the argument of a delete request.
pub trait HistoryItem: Clone + std::fmt::Debug {
    fn id(&self) -> &str;
}

/// Turns one raw record into a typed item.
///
/// Implementations must not panic; any failure is signalled as `None` and the
/// record is dropped from the page.
pub trait RecordParser {
    type Item: HistoryItem;

    fn parse(&self, raw: &Value) -> Option<Self::Item>;
}

/// One page as returned by the remote source, before any sanitation.
///
/// Every field is kept as raw JSON; absent fields deserialize to `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub history: Value,
    #[serde(default)]
    pub total: Value,
    #[serde(default, rename = "hasMore")]
    pub has_more: Value,
}

impl RawPage {
    /// Decode a list response leniently. Anything that is not an object
    /// yields an empty page.
    pub fn from_response(response: &Value) -> Self {
        match response {
            Value::Object(map) => Self {
                history: map.get("history").cloned().unwrap_or(Value::Null),
                total: map.get("total").cloned().unwrap_or(Value::Null),
                has_more: map.get("hasMore").cloned().unwrap_or(Value::Null),
            },
            _ => Self::default(),
        }
    }
}

/// Parse every record, silently dropping the ones the parser rejects.
pub fn map_records<P: RecordParser>(parser: &P, raw: &[Value]) -> Vec<P::Item> {
    let items: Vec<P::Item> = raw.iter().filter_map(|r| parser.parse(r)).collect();
    if items.len() < raw.len() {
        log::debug!(
            "Dropped {} of {} records that failed to parse",
            raw.len() - items.len(),
            raw.len()
        );
    }
    items
}
