//! Instance - one document of a declared model, with its key and ref.

use tracing::debug;

use super::{Collection, Document, Model};
use crate::client::{RelationEdge, RelationQuery, WriteCondition};
use crate::error::ModelError;
use crate::parse::parse_response;

/// A document bound to its model, key and ref.
///
/// `ref_` is `None` until the instance has been persisted. Instances read
/// from the server always carry a key.
#[derive(Debug, Clone)]
pub struct Instance<D> {
    document: D,
    key: Option<String>,
    ref_: Option<String>,
    model: Model<D>,
}

/// The other end of a relationship: a collection and a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTarget {
    pub collection: String,
    pub key: Option<String>,
}

impl RelationTarget {
    pub fn new(collection: &str, key: &str) -> Self {
        Self {
            collection: collection.to_string(),
            key: Some(key.to_string()),
        }
    }
}

impl From<(&str, &str)> for RelationTarget {
    fn from((collection, key): (&str, &str)) -> Self {
        RelationTarget::new(collection, key)
    }
}

impl<T: Document> From<&Instance<T>> for RelationTarget {
    fn from(instance: &Instance<T>) -> Self {
        Self {
            collection: instance.collection().to_string(),
            key: instance.key.clone(),
        }
    }
}

impl<D> Instance<D> {
    pub(crate) fn from_parts(
        model: Model<D>,
        document: D,
        key: Option<String>,
        ref_: Option<String>,
    ) -> Self {
        Self {
            document,
            key,
            ref_,
            model,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn ref_(&self) -> Option<&str> {
        self.ref_.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.ref_.is_some()
    }

    pub fn model(&self) -> &Model<D> {
        &self.model
    }

    fn require_key(&self) -> Result<&str, ModelError> {
        self.key.as_deref().ok_or(ModelError::MissingKey)
    }
}

impl<D: Document> Instance<D> {
    pub fn collection(&self) -> &str {
        self.model.collection()
    }

    /// Persist the local document.
    ///
    /// An instance that was never persisted is created (with its key, if it
    /// has one). Otherwise the write is conditioned on the local ref unless
    /// `overwrite` is set. On success the instance takes the document, key and
    /// ref read back from the server; on failure it is left as it was.
    pub async fn save(&mut self, overwrite: bool) -> Result<(), ModelError> {
        let model = self.model.clone();

        let current_ref = match self.ref_.clone() {
            Some(r) => r,
            None => {
                *self = model.create(&self.document, self.key.as_deref()).await?;
                return Ok(());
            }
        };

        model.validate(&self.document).await?;

        let key = self.require_key()?;
        let condition = if overwrite {
            WriteCondition::Unconditional
        } else {
            WriteCondition::IfMatch(current_ref)
        };
        debug!(collection = model.collection(), key, ?condition, "saving instance");

        let value = serde_json::to_value(&self.document)?;
        let resp = model
            .client()
            .put(model.collection(), key, value, condition)
            .await
            .map_err(ModelError::Transport)?;
        let written = parse_response(resp)?;
        let written_key = written.parsed.key().unwrap_or(key).to_string();

        *self = model.refetch(&written_key).await?;
        Ok(())
    }

    /// Create an edge labelled `relationship` from this instance to `target`.
    ///
    /// `target` is either another instance or an explicit
    /// `(collection, key)` pair.
    pub async fn relate(
        &self,
        target: impl Into<RelationTarget>,
        relationship: &str,
    ) -> Result<(), ModelError> {
        let target = target.into();
        let key = self.require_key()?;
        let target_key = target.key.as_deref().ok_or(ModelError::MissingKey)?;

        let edge = RelationEdge::create()
            .from(self.collection(), key)
            .related(relationship)
            .to(&target.collection, target_key);
        debug!(?edge, "creating relation");

        let resp = self
            .model
            .client()
            .create_relation(edge)
            .await
            .map_err(ModelError::Transport)?;
        parse_response(resp)?;
        Ok(())
    }

    /// Items related through `relationship`, read as this instance's model.
    pub async fn get_relation(&self, relationship: &str) -> Result<Collection<D>, ModelError> {
        self.get_relation_as(relationship, &self.model).await
    }

    /// Items related through `relationship`, read as `target`.
    pub async fn get_relation_as<T: Document>(
        &self,
        relationship: &str,
        target: &Model<T>,
    ) -> Result<Collection<T>, ModelError> {
        let key = self.require_key()?;
        let query = RelationQuery::get()
            .from(self.collection(), key)
            .related(relationship);
        debug!(?query, target = target.collection(), "reading relations");

        let resp = self
            .model
            .client()
            .get_relations(query)
            .await
            .map_err(ModelError::Transport)?;
        Collection::from_response(target, parse_response(resp)?)
    }

    /// Delete this instance on the server. `purge` also drops its history.
    pub async fn remove(self, purge: bool) -> Result<(), ModelError> {
        let key = self.require_key()?;
        self.model.remove_by_key(key, purge).await
    }
}
