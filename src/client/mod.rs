//! Client - the transport boundary the model layer talks to.
//!
//! Everything below this trait (HTTP verbs, TLS, retries, connection pooling)
//! belongs to the transport. Model operations only ever see a [`Response`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orchestrate_model::{Client, InMemoryClient, SearchRequest, SortDirection};
//!
//! let client: Arc<dyn Client> = Arc::new(InMemoryClient::new());
//! let request = SearchRequest::builder()
//!     .collection("pets")
//!     .limit(10)
//!     .sort("name", SortDirection::Asc)
//!     .query("name:Rex");
//! let response = client.search(request).await?;
//! ```

mod graph;
mod in_memory;
mod response;
mod search;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use graph::{RelationEdge, RelationQuery};
pub use in_memory::InMemoryClient;
pub use response::{Cursor, Links, PageQuery, Response};
pub use search::{SearchRequest, SortDirection};

/// Error produced by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Shared handle to a client, bound into a model at declaration time.
pub type ClientHandle = Arc<dyn Client>;

/// Precondition attached to a keyed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Write regardless of the current server-side ref.
    Unconditional,
    /// Write only if the current server-side ref equals this one.
    IfMatch(String),
    /// Write only if no item exists under the key.
    IfAbsent,
}

/// Operations the remote document/search/graph service exposes.
#[async_trait]
pub trait Client: Send + Sync {
    /// Read the current value of an item.
    async fn get(&self, collection: &str, key: &str) -> Result<Response, TransportError>;

    /// Write an item under a caller-chosen key.
    async fn put(
        &self,
        collection: &str,
        key: &str,
        document: Value,
        condition: WriteCondition,
    ) -> Result<Response, TransportError>;

    /// Write an item under a server-generated key.
    async fn post(&self, collection: &str, document: Value) -> Result<Response, TransportError>;

    /// Delete an item. `purge` also drops its history on the server.
    async fn remove(
        &self,
        collection: &str,
        key: &str,
        purge: bool,
    ) -> Result<Response, TransportError>;

    /// Run a search request.
    async fn search(&self, request: SearchRequest) -> Result<Response, TransportError>;

    /// Create a labelled edge between two items.
    async fn create_relation(&self, edge: RelationEdge) -> Result<Response, TransportError>;

    /// Read the items reachable from one item through a labelled edge.
    async fn get_relations(&self, query: RelationQuery) -> Result<Response, TransportError>;
}
