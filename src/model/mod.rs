//! Models - typed documents bound to one collection on one client.
//!
//! A [`Model<D>`] is declared once with a collection name, a client handle
//! and an optional validation hook. Every [`Instance<D>`] it produces shares
//! that binding; operations never take it as a parameter.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orchestrate_model::{InMemoryClient, Model, SearchOptions, ValidationError};
//!
//! #[derive(Serialize, Deserialize, Clone)]
//! struct Pet {
//!     name: String,
//! }
//!
//! let pets = Model::<Pet>::builder("pets", Arc::new(InMemoryClient::new()))
//!     .validator(|pet: &Pet| {
//!         if pet.name.is_empty() {
//!             return Err(ValidationError::new("name is required"));
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! let mut rex = pets.create(&Pet { name: "Rex".into() }, None).await?;
//! rex.document_mut().name = "Rex II".into();
//! rex.save(false).await?;
//!
//! let page = pets.find("name:Rex", SearchOptions::default()).await?;
//! ```

mod collection;
mod instance;
mod materializer;
mod repository;
mod validate;

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::client::{ClientHandle, SortDirection};

pub use collection::Collection;
pub use instance::{Instance, RelationTarget};
pub use materializer::{materialize, Materialized};
pub use validate::{AcceptAll, Validate};

/// Types that can be stored as model documents.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Binding shared by a model and all of its instances.
struct Binding<D> {
    collection: String,
    client: ClientHandle,
    validator: Arc<dyn Validate<D>>,
}

/// A declared model type: collection name, client handle and validation hook.
///
/// Cheap to clone; clones share the same binding.
pub struct Model<D> {
    binding: Arc<Binding<D>>,
}

impl<D> Clone for Model<D> {
    fn clone(&self) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
        }
    }
}

impl<D> fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("collection", &self.binding.collection)
            .finish_non_exhaustive()
    }
}

impl<D: Document> Model<D> {
    /// Declare a model with the default (accept-all) validator.
    pub fn declare(collection: &str, client: ClientHandle) -> Self {
        Self::builder(collection, client).build()
    }

    pub fn builder(collection: &str, client: ClientHandle) -> ModelBuilder<D> {
        ModelBuilder {
            collection: collection.to_string(),
            client,
            validator: Arc::new(AcceptAll),
        }
    }

    pub fn collection(&self) -> &str {
        &self.binding.collection
    }

    pub fn client(&self) -> &ClientHandle {
        &self.binding.client
    }

    /// Build an unpersisted instance (no ref) of this model.
    pub fn new_instance(&self, document: D, key: Option<&str>) -> Instance<D> {
        Instance::from_parts(self.clone(), document, key.map(str::to_string), None)
    }
}

/// Builder for [`Model`].
pub struct ModelBuilder<D> {
    collection: String,
    client: ClientHandle,
    validator: Arc<dyn Validate<D>>,
}

impl<D: Document> ModelBuilder<D> {
    /// Hook run on the candidate document before every write.
    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: Validate<D> + 'static,
    {
        self.validator = Arc::new(validator);
        self
    }

    pub fn build(self) -> Model<D> {
        Model {
            binding: Arc::new(Binding {
                collection: self.collection,
                client: self.client,
                validator: self.validator,
            }),
        }
    }
}

/// Paging and sorting for [`Model::find`] and [`Model::find_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub offset: usize,
    pub limit: usize,
    /// `(field, direction)` pairs, applied in order.
    pub sort: Vec<(String, SortDirection)>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
            sort: Vec::new(),
        }
    }
}

impl SearchOptions {
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push((field.to_string(), direction));
        self
    }
}
