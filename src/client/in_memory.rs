//! InMemoryClient - BTreeMap-backed client for testing and development.
//!
//! Speaks the same response dialect as the remote service: location headers
//! on writes and reads, `results` arrays for searches and relation reads,
//! error bodies with `code` / `message`, and page cursors on searches.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::trace;

use super::{
    Client, PageQuery, RelationEdge, RelationQuery, Response, SearchRequest, SortDirection,
    TransportError, WriteCondition,
};
use crate::error::VERSION_MISMATCH_CODE;

const ALREADY_PRESENT_CODE: &str = "item_already_present";
const NOT_FOUND_CODE: &str = "items_not_found";

/// Internal stored representation of an item.
struct StoredItem {
    value: Value,
    ref_: String,
}

/// (collection, key) of an item.
type ItemId = (String, String);

#[derive(Default)]
struct Storage {
    items: BTreeMap<ItemId, StoredItem>,
    /// Edges as (from, kind, to), in creation order.
    relations: Vec<(ItemId, String, ItemId)>,
    sequence: u64,
}

impl Storage {
    fn next_token(&mut self) -> String {
        self.sequence += 1;
        format!("{:016x}", self.sequence)
    }

    /// Store `value` under a fresh ref and return the ref.
    fn store(&mut self, collection: &str, key: &str, value: Value) -> String {
        let ref_ = self.next_token();
        self.items.insert(
            (collection.to_string(), key.to_string()),
            StoredItem {
                value,
                ref_: ref_.clone(),
            },
        );
        ref_
    }
}

/// In-memory client. Clone-friendly via Arc; clones share storage.
#[derive(Clone)]
pub struct InMemoryClient {
    storage: Arc<RwLock<Storage>>,
    api_version: Arc<str>,
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryClient")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(Storage::default())),
            api_version: Arc::from("v0"),
        }
    }

    /// Use a different API version prefix in location headers.
    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = Arc::from(version);
        self
    }

    /// Number of stored items across all collections.
    pub fn len(&self) -> Result<usize, TransportError> {
        Ok(self.read()?.items.len())
    }

    pub fn is_empty(&self) -> Result<bool, TransportError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Storage>, TransportError> {
        self.storage.read().map_err(|_| "lock poisoned".into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Storage>, TransportError> {
        self.storage.write().map_err(|_| "lock poisoned".into())
    }

    fn location(&self, collection: &str, key: &str, ref_: &str) -> String {
        format!("/{}/{}/{}/refs/{}", self.api_version, collection, key, ref_)
    }

    fn written(&self, collection: &str, key: &str, ref_: &str) -> Response {
        Response::new(Value::Null).with_header("location", self.location(collection, key, ref_))
    }

    fn result_entry(collection: &str, key: &str, item: &StoredItem) -> Value {
        json!({
            "path": { "collection": collection, "key": key, "ref": item.ref_ },
            "value": item.value,
        })
    }
}

fn error_body(code: &str, message: &str) -> Response {
    Response::new(json!({ "code": code, "message": message }))
}

#[async_trait]
impl Client for InMemoryClient {
    async fn get(&self, collection: &str, key: &str) -> Result<Response, TransportError> {
        let storage = self.read()?;
        let id = (collection.to_string(), key.to_string());
        Ok(match storage.items.get(&id) {
            Some(item) => Response::new(item.value.clone()).with_header(
                "content-location",
                self.location(collection, key, &item.ref_),
            ),
            None => Response::new(Value::Null),
        })
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        document: Value,
        condition: WriteCondition,
    ) -> Result<Response, TransportError> {
        trace!(collection, key, ?condition, "in-memory put");
        let mut storage = self.write()?;
        let current = storage
            .items
            .get(&(collection.to_string(), key.to_string()));

        match (&condition, current) {
            (WriteCondition::IfAbsent, Some(_)) => {
                return Ok(error_body(
                    ALREADY_PRESENT_CODE,
                    "The item is already present.",
                ));
            }
            (WriteCondition::IfMatch(_), None) => {
                return Ok(error_body(
                    NOT_FOUND_CODE,
                    "The requested items could not be found.",
                ));
            }
            (WriteCondition::IfMatch(expected), Some(item)) if *expected != item.ref_ => {
                return Ok(error_body(
                    VERSION_MISMATCH_CODE,
                    "The version of the item does not match.",
                ));
            }
            _ => {}
        }

        let ref_ = storage.store(collection, key, document);
        Ok(self.written(collection, key, &ref_))
    }

    async fn post(&self, collection: &str, document: Value) -> Result<Response, TransportError> {
        let mut storage = self.write()?;
        let key = storage.next_token();
        trace!(collection, key = %key, "in-memory post");
        let ref_ = storage.store(collection, &key, document);
        Ok(self.written(collection, &key, &ref_))
    }

    async fn remove(
        &self,
        collection: &str,
        key: &str,
        purge: bool,
    ) -> Result<Response, TransportError> {
        trace!(collection, key, purge, "in-memory remove");
        let mut storage = self.write()?;
        let id = (collection.to_string(), key.to_string());
        storage.items.remove(&id);
        if purge {
            storage
                .relations
                .retain(|(from, _, to)| *from != id && *to != id);
        }
        Ok(Response::new(Value::Null))
    }

    async fn search(&self, request: SearchRequest) -> Result<Response, TransportError> {
        let storage = self.read()?;

        let mut hits: Vec<(&String, &StoredItem)> = storage
            .items
            .iter()
            .filter(|((collection, _), _)| *collection == request.collection)
            .filter(|(_, item)| matches_query(&request.query, &item.value))
            .map(|((_, key), item)| (key, item))
            .collect();

        // Stable sort from the last pair to the first leaves the first pair
        // as the primary key.
        for (field, direction) in request.sort.iter().rev() {
            hits.sort_by(|(_, a), (_, b)| {
                compare_fields(lookup(&a.value, field), lookup(&b.value, field), *direction)
            });
        }

        let total = hits.len();
        let results: Vec<Value> = hits
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|(key, item)| Self::result_entry(&request.collection, key, item))
            .collect();

        let mut resp = Response::new(json!({
            "count": results.len(),
            "total_count": total,
            "results": results,
        }));

        // An empty page size never moves, so it gets no cursors.
        if request.limit == 0 {
            return Ok(resp);
        }

        let end = request.offset.saturating_add(request.limit);
        if end < total {
            let next = request.clone().offset(end);
            resp = resp.with_next(Arc::new(SearchPage {
                client: self.clone(),
                request: next,
            }));
        }
        if request.offset > 0 {
            let prev = request
                .clone()
                .offset(request.offset.saturating_sub(request.limit));
            resp = resp.with_prev(Arc::new(SearchPage {
                client: self.clone(),
                request: prev,
            }));
        }

        Ok(resp)
    }

    async fn create_relation(&self, edge: RelationEdge) -> Result<Response, TransportError> {
        let mut storage = self.write()?;
        let from = (edge.from_collection, edge.from_key);
        let to = (edge.to_collection, edge.to_key);

        if !storage.items.contains_key(&from) || !storage.items.contains_key(&to) {
            return Ok(error_body(
                NOT_FOUND_CODE,
                "The requested items could not be found.",
            ));
        }

        let exists = storage
            .relations
            .iter()
            .any(|(f, kind, t)| *f == from && *kind == edge.kind && *t == to);
        if !exists {
            storage.relations.push((from, edge.kind, to));
        }
        Ok(Response::new(Value::Null))
    }

    async fn get_relations(&self, query: RelationQuery) -> Result<Response, TransportError> {
        let storage = self.read()?;
        let from = (query.from_collection, query.from_key);

        let results: Vec<Value> = storage
            .relations
            .iter()
            .filter(|(f, kind, _)| *f == from && *kind == query.kind)
            .filter_map(|(_, _, to)| {
                storage
                    .items
                    .get(to)
                    .map(|item| Self::result_entry(&to.0, &to.1, item))
            })
            .collect();

        Ok(Response::new(json!({
            "count": results.len(),
            "results": results,
        })))
    }
}

/// A search re-issued against the same client with a shifted offset.
#[derive(Debug)]
struct SearchPage {
    client: InMemoryClient,
    request: SearchRequest,
}

#[async_trait]
impl PageQuery for SearchPage {
    async fn get(&self) -> Result<Response, TransportError> {
        self.client.search(self.request.clone()).await
    }
}

/// `*` matches everything, `field:value` compares one (dotted) field, a bare
/// term matches any string containing it. Comparisons ignore case.
fn matches_query(query: &str, value: &Value) -> bool {
    let query = query.trim();
    if query.is_empty() || query == "*" {
        return true;
    }

    match query.split_once(':') {
        Some((field, expected)) => {
            let expected = expected.trim().trim_matches('"');
            match lookup(value, field.trim()) {
                Some(_) if expected == "*" => true,
                Some(found) => scalar_text(found)
                    .map(|text| text.eq_ignore_ascii_case(expected))
                    .unwrap_or(false),
                None => false,
            }
        }
        None => contains_term(value, &query.to_lowercase()),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, segment| v.get(segment))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn contains_term(value: &Value, term: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(term),
        Value::Array(items) => items.iter().any(|v| contains_term(v, term)),
        Value::Object(map) => map.values().any(|v| contains_term(v, term)),
        _ => false,
    }
}

/// Missing fields sort last in either direction.
fn compare_fields(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
