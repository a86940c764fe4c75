//! OData collection queries and response envelopes

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::FetchError;
use crate::paging::PageInfo;
use crate::tracking::Continuation;

/// Collection path plus system query options (`$select`, `$orderby`, ...).
///
/// Paging options (`$count`, `$skip`, `$top`) are added by
/// [`PagedFetcher`](crate::paging::PagedFetcher) and must not be set here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    path: String,
    options: Vec<(String, String)>,
}

impl CollectionQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: Vec::new(),
        }
    }

    /// Add an arbitrary query option; `value` is percent-encoded
    pub fn option(mut self, name: impl Into<String>, value: &str) -> Self {
        self.options.push((name.into(), encode(value)));
        self
    }

    pub fn select(self, fields: &str) -> Self {
        self.option("$select", fields)
    }

    /// Sort keys; must match the level order a `HierarchyBuilder` expects
    pub fn order_by(self, keys: &str) -> Self {
        self.option("$orderby", keys)
    }

    pub fn filter(self, expression: &str) -> Self {
        self.option("$filter", expression)
    }

    pub fn expand(self, expression: &str) -> Self {
        self.option("$expand", expression)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Target without paging options
    pub fn target(&self) -> String {
        self.with_extra(&[])
    }

    /// Target for one page: `$count=true` on the first page, `$skip` after it
    pub fn page(&self, skip: u64, top: u64, count: bool) -> String {
        let top_value = top.to_string();
        let skip_value = skip.to_string();
        let mut extra: Vec<(&str, &str)> = Vec::with_capacity(3);
        if count {
            extra.push(("$count", "true"));
        }
        if skip > 0 {
            extra.push(("$skip", skip_value.as_str()));
        }
        extra.push(("$top", top_value.as_str()));
        self.with_extra(&extra)
    }

    fn with_extra(&self, extra: &[(&str, &str)]) -> String {
        let params: Vec<String> = self
            .options
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .chain(extra.iter().map(|(k, v)| format!("{k}={v}")))
            .collect();
        if params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, params.join("&"))
        }
    }
}

/// Percent-encode the characters that would break a query string
pub fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            '+' => out.push_str("%2B"),
            '%' => out.push_str("%25"),
            _ => out.push(c),
        }
    }
    out
}

/// One response of an OData collection request
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
    #[serde(rename = "@odata.deltaLink", default)]
    pub delta_link: Option<String>,
}

impl<T: DeserializeOwned> Page<T> {
    pub fn decode(body: &str, operation: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::decode(operation, e))
    }
}

impl<T> Page<T> {
    /// Count and continuation as seen by a paged fetch
    pub fn info(&self) -> PageInfo {
        PageInfo {
            count: self.count,
            next_link: non_empty(&self.next_link),
        }
    }

    /// Forward and delta tokens as seen by a change tracker
    pub fn continuation(&self) -> Continuation {
        Continuation {
            next: non_empty(&self.next_link),
            delta: non_empty(&self.delta_link),
        }
    }
}

fn non_empty(link: &Option<String>) -> Option<String> {
    link.as_ref().filter(|s| !s.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(rename = "CustomerID")]
        id: String,
    }

    #[test]
    fn target_keeps_option_order() {
        let q = CollectionQuery::new("Customers")
            .order_by("Country asc,Region asc,City asc")
            .select("CustomerID,CompanyName");
        assert_eq!(
            q.target(),
            "Customers?$orderby=Country%20asc,Region%20asc,City%20asc&$select=CustomerID,CompanyName"
        );
    }

    #[test]
    fn first_page_asks_for_count() {
        let q = CollectionQuery::new("Orders").select("OrderID");
        assert_eq!(q.page(0, 10, true), "Orders?$select=OrderID&$count=true&$top=10");
        assert_eq!(q.page(20, 10, false), "Orders?$select=OrderID&$skip=20&$top=10");
    }

    #[test]
    fn page_without_options() {
        let q = CollectionQuery::new("Categories");
        assert_eq!(q.page(0, 5, true), "Categories?$count=true&$top=5");
        assert_eq!(q.target(), "Categories");
    }

    #[test]
    fn encode_special_characters() {
        assert_eq!(encode("Cube eq 'Sales & Ops'"), "Cube%20eq%20'Sales%20%26%20Ops'");
        assert_eq!(encode("a+b#c%"), "a%2Bb%23c%25");
    }

    #[test]
    fn decode_first_page() {
        let body = r#"{
            "@odata.context": "$metadata#Customers",
            "@odata.count": 91,
            "value": [{"CustomerID": "ALFKI"}, {"CustomerID": "ANATR"}],
            "@odata.nextLink": "Customers?$skip=2"
        }"#;
        let page: Page<Row> = Page::decode(body, "test").unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.value[1].id, "ANATR");
        let info = page.info();
        assert_eq!(info.count, Some(91));
        assert_eq!(info.next_link.as_deref(), Some("Customers?$skip=2"));
    }

    #[test]
    fn empty_links_are_absent() {
        let body = r#"{"value": [], "@odata.nextLink": "", "@odata.deltaLink": "d1"}"#;
        let page: Page<Row> = Page::decode(body, "test").unwrap();
        let cont = page.continuation();
        assert_eq!(cont.next, None);
        assert_eq!(cont.delta.as_deref(), Some("d1"));
        assert_eq!(page.info().count, None);
    }

    #[test]
    fn decode_failure_is_decode_error() {
        let err = Page::<Row>::decode("{not json", "page 1 of Customers").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
