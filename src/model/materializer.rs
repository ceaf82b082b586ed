//! Materialization - parsed records into typed instances and collections.

use tracing::trace;

use super::{Collection, Document, Instance, Model};
use crate::client::Cursor;
use crate::error::ModelError;
use crate::parse::{Parsed, ParsedRecord};

/// Result of materializing a parsed response.
#[derive(Debug)]
pub enum Materialized<T> {
    /// The response carried no data.
    Empty,
    One(Instance<T>),
    Many(Collection<T>),
}

impl<T> Materialized<T> {
    /// The single instance, or the first item of a collection.
    pub fn into_instance(self) -> Option<Instance<T>> {
        match self {
            Materialized::Empty => None,
            Materialized::One(instance) => Some(instance),
            Materialized::Many(collection) => collection.into_items().into_iter().next(),
        }
    }

    /// The collection, or a one-item collection around a single instance.
    /// `Materialized::One` holds no cursors, so that page has none.
    pub fn into_collection(self) -> Option<Collection<T>> {
        match self {
            Materialized::Empty => None,
            Materialized::One(instance) => {
                let mut collection = Collection::new(instance.model().clone(), None, None);
                collection.add_item(instance);
                Some(collection)
            }
            Materialized::Many(collection) => Some(collection),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Materialized::Empty)
    }
}

/// Build instances of `model` from parsed records.
///
/// The target model need not be the one that issued the request; relation
/// reads materialize into the model on the far side of the edge. Cursors are
/// attached to the collection only, never to its items.
pub fn materialize<T: Document>(
    model: &Model<T>,
    parsed: Parsed,
    next: Option<Cursor>,
    prev: Option<Cursor>,
) -> Result<Materialized<T>, ModelError> {
    match parsed {
        Parsed::Empty => Ok(Materialized::Empty),
        Parsed::Single(record) => Ok(Materialized::One(materialize_record(model, record)?)),
        Parsed::Many(records) => {
            let mut collection = Collection::new(model.clone(), next, prev);
            for record in records {
                collection.add_item(materialize_record(model, record)?);
            }
            trace!(
                collection = model.collection(),
                count = collection.len(),
                "materialized collection"
            );
            Ok(Materialized::Many(collection))
        }
    }
}

fn materialize_record<T: Document>(
    model: &Model<T>,
    record: ParsedRecord,
) -> Result<Instance<T>, ModelError> {
    let document: T = serde_json::from_value(record.value)?;
    Ok(Instance::from_parts(
        model.clone(),
        document,
        Some(record.key),
        record.ref_,
    ))
}
