//! Raw transport responses and pagination cursors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::TransportError;

/// A prebuilt request that can be issued again to fetch an adjacent page.
#[async_trait]
pub trait PageQuery: fmt::Debug + Send + Sync {
    async fn get(&self) -> Result<Response, TransportError>;
}

/// Opaque, re-executable handle to the next or previous page.
pub type Cursor = Arc<dyn PageQuery>;

/// Pagination links attached to a response.
#[derive(Debug, Clone, Default)]
pub struct Links {
    pub next: Option<Cursor>,
    pub prev: Option<Cursor>,
}

/// What a transport call hands back: body, headers and optional links.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub body: Value,
    headers: HashMap<String, String>,
    pub links: Links,
}

impl Response {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: HashMap::new(),
            links: Links::default(),
        }
    }

    /// Add a header. Names are stored lowercased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_next(mut self, cursor: Cursor) -> Self {
        self.links.next = Some(cursor);
        self
    }

    pub fn with_prev(mut self, cursor: Cursor) -> Self {
        self.links.prev = Some(cursor);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_ignores_case() {
        let resp = Response::new(json!({})).with_header("Content-Location", "/v0/pets/a/refs/b");
        assert_eq!(resp.header("content-location"), Some("/v0/pets/a/refs/b"));
        assert_eq!(resp.header("CONTENT-LOCATION"), Some("/v0/pets/a/refs/b"));
        assert_eq!(resp.header("location"), None);
    }

    #[test]
    fn default_has_no_links() {
        let resp = Response::new(Value::Null);
        assert!(resp.links.next.is_none());
        assert!(resp.links.prev.is_none());
    }
}
