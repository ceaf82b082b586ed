//! A scripted client: replays queued responses and records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use orchestrate_model::{
    Client, RelationEdge, RelationQuery, Response, SearchRequest, TransportError, WriteCondition,
};
use serde_json::{json, Value};

/// One call made against the stub, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get {
        collection: String,
        key: String,
    },
    Put {
        collection: String,
        key: String,
        document: Value,
        condition: WriteCondition,
    },
    Post {
        collection: String,
        document: Value,
    },
    Remove {
        collection: String,
        key: String,
        purge: bool,
    },
    Search(SearchRequest),
    CreateRelation(RelationEdge),
    GetRelations(RelationQuery),
}

/// Replays responses in the order they were queued. Once the queue is empty
/// every call gets an empty response (no data).
#[derive(Default)]
pub struct StubClient {
    responses: Mutex<VecDeque<Result<Response, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: Response) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a write acknowledgement carrying a location header.
    pub fn respond_written(&self, collection: &str, key: &str, ref_: &str) -> &Self {
        self.respond(
            Response::new(Value::Null)
                .with_header("Location", format!("/v0/{}/{}/refs/{}", collection, key, ref_)),
        )
    }

    /// Queue a read of one item.
    pub fn respond_item(&self, collection: &str, key: &str, ref_: &str, value: Value) -> &Self {
        self.respond(Response::new(value).with_header(
            "Content-Location",
            format!("/v0/{}/{}/refs/{}", collection, key, ref_),
        ))
    }

    /// Queue a `results` listing of `(key, ref, value)` entries.
    pub fn respond_results(&self, collection: &str, entries: &[(&str, &str, Value)]) -> &Self {
        let results: Vec<Value> = entries
            .iter()
            .map(|(key, ref_, value)| {
                json!({
                    "path": { "collection": collection, "key": key, "ref": ref_ },
                    "value": value,
                })
            })
            .collect();
        self.respond(Response::new(json!({
            "count": results.len(),
            "results": results,
        })))
    }

    pub fn respond_error(&self, code: &str, message: &str) -> &Self {
        self.respond(Response::new(json!({ "code": code, "message": message })))
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<Response, TransportError> {
        self.calls.lock().unwrap().push(call);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Ok(Response::new(Value::Null)),
        }
    }
}

#[async_trait]
impl Client for StubClient {
    async fn get(&self, collection: &str, key: &str) -> Result<Response, TransportError> {
        self.record(Call::Get {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        document: Value,
        condition: WriteCondition,
    ) -> Result<Response, TransportError> {
        self.record(Call::Put {
            collection: collection.to_string(),
            key: key.to_string(),
            document,
            condition,
        })
    }

    async fn post(&self, collection: &str, document: Value) -> Result<Response, TransportError> {
        self.record(Call::Post {
            collection: collection.to_string(),
            document,
        })
    }

    async fn remove(
        &self,
        collection: &str,
        key: &str,
        purge: bool,
    ) -> Result<Response, TransportError> {
        self.record(Call::Remove {
            collection: collection.to_string(),
            key: key.to_string(),
            purge,
        })
    }

    async fn search(&self, request: SearchRequest) -> Result<Response, TransportError> {
        self.record(Call::Search(request))
    }

    async fn create_relation(&self, edge: RelationEdge) -> Result<Response, TransportError> {
        self.record(Call::CreateRelation(edge))
    }

    async fn get_relations(&self, query: RelationQuery) -> Result<Response, TransportError> {
        self.record(Call::GetRelations(query))
    }
}
