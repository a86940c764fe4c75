//! Transaction log entries as returned by the change feed of a cube

use cubeline_core::{CollectionQuery, Continuation, FetchError, Page};
use serde::Deserialize;

/// One logged cell change
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionLogEntry {
    #[serde(rename = "ChangeSetID", default)]
    pub change_set_id: String,
    /// Kept as text: the server omits seconds when they are zero
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub replication_time: String,
    #[serde(default)]
    pub user: String,
    pub cube: String,
    #[serde(default)]
    pub tuple: Vec<String>,
    #[serde(default)]
    pub old_value: serde_json::Value,
    #[serde(default)]
    pub new_value: serde_json::Value,
    #[serde(default)]
    pub status_message: String,
}

/// Log entries of `cube`, suitable as the initial change-tracking target
pub fn entries_query(cube: &str) -> CollectionQuery {
    CollectionQuery::new("TransactionLogEntries").filter(&format!(
        "Cube eq '{}'",
        crate::payload::key(cube)
    ))
}

/// Decode one change-feed response.
pub fn decode_entries(body: &str) -> Result<(Vec<TransactionLogEntry>, Continuation), FetchError> {
    let page: Page<TransactionLogEntry> = Page::decode(body, "decode transaction log entries")?;
    let continuation = page.continuation();
    Ok((page.value, continuation))
}

/// `timestamp cube['e1','e2']: old => new`
pub fn format_entry(entry: &TransactionLogEntry) -> String {
    format!(
        "{} {}['{}']: {} => {}",
        entry.time_stamp,
        entry.cube,
        entry.tuple.join("','"),
        entry.old_value,
        entry.new_value
    )
}
