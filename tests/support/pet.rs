//! Test domain: pets and their owners.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Pet {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            age: None,
        }
    }

    pub fn aged(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age: Some(age),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub first: String,
    pub last: String,
}

impl Owner {
    pub fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
        }
    }
}
