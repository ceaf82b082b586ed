//! Graph request builders.
//!
//! ```ignore
//! let edge = RelationEdge::create()
//!     .from("pets", "rex")
//!     .related("friend")
//!     .to("pets", "fido");
//!
//! let query = RelationQuery::get().from("pets", "rex").related("friend");
//! ```

/// A labelled edge to create between two items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationEdge {
    pub from_collection: String,
    pub from_key: String,
    pub kind: String,
    pub to_collection: String,
    pub to_key: String,
}

impl RelationEdge {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn from(mut self, collection: &str, key: &str) -> Self {
        self.from_collection = collection.to_string();
        self.from_key = key.to_string();
        self
    }

    pub fn related(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    pub fn to(mut self, collection: &str, key: &str) -> Self {
        self.to_collection = collection.to_string();
        self.to_key = key.to_string();
        self
    }
}

/// A read of the items reachable from one item through a labelled edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationQuery {
    pub from_collection: String,
    pub from_key: String,
    pub kind: String,
}

impl RelationQuery {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn from(mut self, collection: &str, key: &str) -> Self {
        self.from_collection = collection.to_string();
        self.from_key = key.to_string();
        self
    }

    pub fn related(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }
}
