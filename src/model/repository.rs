//! Model-level CRUD and search operations.
//!
//! Every operation runs validate → transport call → parse → (refetch) →
//! materialize, in that order and one step at a time.

use tracing::debug;

use super::{materialize, Collection, Document, Instance, Model, SearchOptions};
use crate::client::{SearchRequest, WriteCondition};
use crate::error::ModelError;
use crate::parse::parse_response;

impl<D: Document> Model<D> {
    /// Run the validation hook on a candidate document.
    pub async fn validate(&self, document: &D) -> Result<(), ModelError> {
        self.binding.validator.validate(document).await?;
        Ok(())
    }

    /// Read one item. `Ok(None)` when the server has no data for the key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Instance<D>>, ModelError> {
        debug!(collection = self.collection(), key, "find_by_key");
        let resp = self
            .client()
            .get(self.collection(), key)
            .await
            .map_err(ModelError::Transport)?;
        let parsed = parse_response(resp)?;
        Ok(materialize(self, parsed.parsed, None, None)?.into_instance())
    }

    /// Search the collection and return one page of results.
    pub async fn find(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Collection<D>, ModelError> {
        let request = self.search_request(query, &options);
        debug!(?request, "find");
        let resp = self
            .client()
            .search(request)
            .await
            .map_err(ModelError::Transport)?;
        Collection::from_response(self, parse_response(resp)?)
    }

    /// Search the collection and keep only the first hit.
    pub async fn find_one(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Option<Instance<D>>, ModelError> {
        let request = self.search_request(query, &options);
        debug!(?request, "find_one");
        let resp = self
            .client()
            .search(request)
            .await
            .map_err(ModelError::Transport)?;
        let first = parse_response(resp)?.parsed.first();
        Ok(materialize(self, first, None, None)?.into_instance())
    }

    /// Validate and write a new item, then read it back.
    ///
    /// With a key the write only succeeds if nothing exists under that key;
    /// without one the server generates the key. The returned instance is
    /// always the server's copy.
    pub async fn create(&self, document: &D, key: Option<&str>) -> Result<Instance<D>, ModelError> {
        self.validate(document).await?;

        let value = serde_json::to_value(document)?;
        let resp = match key {
            Some(key) => {
                debug!(collection = self.collection(), key, "create");
                self.client()
                    .put(self.collection(), key, value, WriteCondition::IfAbsent)
                    .await
            }
            None => {
                debug!(collection = self.collection(), "create with generated key");
                self.client().post(self.collection(), value).await
            }
        }
        .map_err(ModelError::Transport)?;

        let written = parse_response(resp)?;
        let written_key = written
            .parsed
            .key()
            .or(key)
            .ok_or(ModelError::MissingKey)?
            .to_string();

        self.refetch(&written_key).await
    }

    /// Delete an item. `purge` also drops its history.
    pub async fn remove_by_key(&self, key: &str, purge: bool) -> Result<(), ModelError> {
        debug!(collection = self.collection(), key, purge, "remove_by_key");
        let resp = self
            .client()
            .remove(self.collection(), key, purge)
            .await
            .map_err(ModelError::Transport)?;
        parse_response(resp)?;
        Ok(())
    }

    /// Read back an item that was just written.
    pub(crate) async fn refetch(&self, key: &str) -> Result<Instance<D>, ModelError> {
        self.find_by_key(key)
            .await?
            .ok_or_else(|| ModelError::NotFound {
                collection: self.collection().to_string(),
                key: key.to_string(),
            })
    }

    fn search_request(&self, query: &str, options: &SearchOptions) -> SearchRequest {
        let mut request = SearchRequest::builder()
            .collection(self.collection())
            .limit(options.limit)
            .offset(options.offset);
        for (field, direction) in &options.sort {
            request = request.sort(field, *direction);
        }
        request.query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryClient, SortDirection};
    use crate::error::ValidationError;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pet {
        name: String,
        age: u32,
    }

    fn pet(name: &str, age: u32) -> Pet {
        Pet {
            name: name.into(),
            age,
        }
    }

    fn pets() -> Model<Pet> {
        Model::declare("pets", Arc::new(InMemoryClient::new()))
    }

    #[test]
    fn search_request_applies_options_in_order() {
        let options = SearchOptions::default()
            .offset(20)
            .limit(10)
            .sort("name.last", SortDirection::Desc)
            .sort("age", SortDirection::Asc);
        let request = pets().search_request("name:Rex", &options);

        assert_eq!(request.collection, "pets");
        assert_eq!(request.offset, 20);
        assert_eq!(request.limit, 10);
        assert_eq!(request.query, "name:Rex");
        assert_eq!(
            request.sort,
            vec![
                ("name.last".to_string(), SortDirection::Desc),
                ("age".to_string(), SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn default_search_options() {
        let request = pets().search_request("*", &SearchOptions::default());
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 100);
        assert!(request.sort.is_empty());
    }

    #[tokio::test]
    async fn create_then_find_by_key() {
        let pets = pets();
        let rex = pets.create(&pet("Rex", 3), Some("rex")).await.unwrap();

        assert_eq!(rex.key(), Some("rex"));
        assert!(rex.is_persisted());

        let loaded = pets.find_by_key("rex").await.unwrap().unwrap();
        assert_eq!(loaded.document(), &pet("Rex", 3));
        assert_eq!(loaded.ref_(), rex.ref_());
    }

    #[tokio::test]
    async fn create_with_existing_key_fails() {
        let pets = pets();
        pets.create(&pet("Rex", 3), Some("rex")).await.unwrap();

        let err = pets.create(&pet("Rex", 4), Some("rex")).await.unwrap_err();
        assert!(matches!(err, ModelError::Server { ref code, .. } if code == "item_already_present"));
    }

    #[tokio::test]
    async fn find_by_missing_key_is_none() {
        assert!(pets().find_by_key("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let client = Arc::new(InMemoryClient::new());
        let pets = Model::<Pet>::builder("pets", client.clone())
            .validator(|p: &Pet| {
                if p.name.is_empty() {
                    Err(ValidationError::new("name is required"))
                } else {
                    Ok(())
                }
            })
            .build();

        let err = pets.create(&pet("", 1), Some("nameless")).await.unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
        assert_eq!(client.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_by_key_deletes() {
        let pets = pets();
        pets.create(&pet("Rex", 3), Some("rex")).await.unwrap();

        pets.remove_by_key("rex", false).await.unwrap();
        assert!(pets.find_by_key("rex").await.unwrap().is_none());
    }
}
