//! Collection - an ordered page of instances with cursors to its neighbours.

use tracing::debug;

use super::{materialize, Document, Instance, Materialized, Model};
use crate::client::Cursor;
use crate::error::ModelError;
use crate::parse::{parse_response, ParsedResponse};

/// A page of materialized instances.
///
/// `next` / `prev` re-run the query that produced the page, shifted one page
/// forward or back. Either may be absent.
#[derive(Debug, Clone)]
pub struct Collection<D> {
    model: Model<D>,
    items: Vec<Instance<D>>,
    next: Option<Cursor>,
    prev: Option<Cursor>,
}

impl<D> Collection<D> {
    pub fn new(model: Model<D>, next: Option<Cursor>, prev: Option<Cursor>) -> Self {
        Self {
            model,
            items: Vec::new(),
            next,
            prev,
        }
    }

    /// Append an item; the page only ever grows.
    pub fn add_item(&mut self, item: Instance<D>) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Instance<D>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Instance<D>> {
        self.items
    }

    pub fn get(&self, index: usize) -> Option<&Instance<D>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance<D>> {
        self.items.iter()
    }

    pub fn model(&self) -> &Model<D> {
        &self.model
    }

    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev_page(&self) -> bool {
        self.prev.is_some()
    }

    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next.as_ref()
    }

    pub fn prev_cursor(&self) -> Option<&Cursor> {
        self.prev.as_ref()
    }
}

impl<D: Document> Collection<D> {
    /// Fetch the following page. `Ok(None)` when there is no next cursor.
    pub async fn next_page(&self) -> Result<Option<Collection<D>>, ModelError> {
        match &self.next {
            Some(cursor) => self.get_page(cursor).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch the preceding page. `Ok(None)` when there is no prev cursor.
    pub async fn prev_page(&self) -> Result<Option<Collection<D>>, ModelError> {
        match &self.prev {
            Some(cursor) => self.get_page(cursor).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_page(&self, cursor: &Cursor) -> Result<Collection<D>, ModelError> {
        debug!(collection = self.model.collection(), "fetching page");
        let resp = cursor.get().await.map_err(ModelError::Transport)?;
        Collection::from_response(&self.model, parse_response(resp)?)
    }

    /// Materialize a response as a page of `model`. A response without data
    /// is an empty page; a single record is a one-item page. Either way the
    /// response's cursors stay on the page.
    pub(crate) fn from_response(
        model: &Model<D>,
        response: ParsedResponse,
    ) -> Result<Collection<D>, ModelError> {
        let ParsedResponse { parsed, next, prev } = response;
        Ok(
            match materialize(model, parsed, next.clone(), prev.clone())? {
                Materialized::Many(collection) => collection,
                Materialized::One(instance) => {
                    let mut collection = Collection::new(model.clone(), next, prev);
                    collection.add_item(instance);
                    collection
                }
                Materialized::Empty => Collection::new(model.clone(), next, prev),
            },
        )
    }
}

impl<D> IntoIterator for Collection<D> {
    type Item = Instance<D>;
    type IntoIter = std::vec::IntoIter<Instance<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, D> IntoIterator for &'a Collection<D> {
    type Item = &'a Instance<D>;
    type IntoIter = std::slice::Iter<'a, Instance<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryClient, PageQuery, Response, TransportError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingPage {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageQuery for CountingPage {
        async fn get(&self) -> Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(json!({
                "count": 2,
                "results": [
                    { "path": { "key": "c", "ref": "r3" }, "value": { "n": 3 } },
                    { "path": { "key": "d", "ref": "r4" }, "value": { "n": 4 } }
                ]
            })))
        }
    }

    fn model() -> Model<Value> {
        Model::declare("numbers", Arc::new(InMemoryClient::new()))
    }

    #[test]
    fn add_item_tracks_length() {
        let model = model();
        let mut page = Collection::new(model.clone(), None, None);
        assert!(page.is_empty());

        page.add_item(model.new_instance(json!({ "n": 1 }), Some("a")));
        page.add_item(model.new_instance(json!({ "n": 2 }), Some("b")));
        assert_eq!(page.len(), 2);
        assert_eq!(page.get(1).and_then(|i| i.key()), Some("b"));
    }

    #[tokio::test]
    async fn missing_cursor_resolves_to_none() {
        let page = Collection::new(model(), None, None);
        assert!(page.next_page().await.unwrap().is_none());
        assert!(page.prev_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn next_page_reruns_cursor() {
        let cursor = Arc::new(CountingPage::default());
        let page = Collection::new(model(), Some(cursor.clone()), None);

        let next = page.next_page().await.unwrap().unwrap();
        assert_eq!(cursor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(next.len(), 2);
        let keys: Vec<_> = next.iter().filter_map(|i| i.key()).collect();
        assert_eq!(keys, vec!["c", "d"]);
        assert_eq!(next.model().collection(), "numbers");
    }

    #[tokio::test]
    async fn prev_page_uses_prev_cursor() {
        let cursor = Arc::new(CountingPage::default());
        let page = Collection::new(model(), None, Some(cursor.clone()));

        assert!(page.next_page().await.unwrap().is_none());
        let prev = page.prev_page().await.unwrap().unwrap();
        assert_eq!(prev.len(), 2);
        assert_eq!(cursor.calls.load(Ordering::SeqCst), 1);
    }
}
