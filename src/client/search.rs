//! Search request builder.

use std::fmt;

/// Direction of a sort pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A search against one collection.
///
/// Sort pairs are kept in the order they were added; the first pair is the
/// primary sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub collection: String,
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    pub sort: Vec<(String, SortDirection)>,
}

impl SearchRequest {
    pub fn builder() -> Self {
        Self {
            query: "*".to_string(),
            limit: 10,
            ..Self::default()
        }
    }

    pub fn collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push((field.to_string(), direction));
        self
    }

    /// Set the query term. Last step of the builder chain.
    pub fn query(mut self, term: &str) -> Self {
        self.query = term.to_string();
        self
    }
}
