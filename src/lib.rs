//! Object mapping for a remote document, search and graph service.
//!
//! Raw transport responses become typed [`Instance`]s and paginated
//! [`Collection`]s; model operations become the right sequence of transport
//! calls, carrying refs so concurrent writers are caught by the server.
//!
//! ```ignore
//! use std::sync::Arc;
//! use orchestrate_model::{InMemoryClient, Model};
//!
//! let pets = Model::<Pet>::declare("pets", Arc::new(InMemoryClient::new()));
//! let mut rex = pets.create(&Pet { name: "Rex".into() }, Some("rex")).await?;
//! rex.document_mut().name = "Rex II".into();
//! rex.save(false).await?; // fails with VersionConflict if someone wrote in between
//! ```

mod client;
mod error;
mod model;
mod parse;

pub use client::{
    Client, ClientHandle, Cursor, InMemoryClient, Links, PageQuery, RelationEdge, RelationQuery,
    Response, SearchRequest, SortDirection, TransportError, WriteCondition,
};
pub use error::{ModelError, ValidationError, VERSION_MISMATCH_CODE};
pub use model::{
    materialize, AcceptAll, Collection, Document, Instance, Materialized, Model, ModelBuilder,
    RelationTarget, SearchOptions, Validate,
};
pub use parse::{parse_response, Parsed, ParsedRecord, ParsedResponse};
