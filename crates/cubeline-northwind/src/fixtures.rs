//! Canned OData pages for adapter tests

use serde_json::{Value, json};

/// Collection page body; `count` only belongs on the first page
pub fn page(count: Option<u64>, value: Value) -> String {
    let mut body = json!({ "value": value });
    if let Some(count) = count {
        body["@odata.count"] = json!(count);
    }
    body.to_string()
}
