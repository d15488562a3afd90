//! Record adapters: convert caller records into `TreeNode`s.
//!
//! Three variants share the `RecordAdapter` contract:
//! - `DefaultAdapter` for types implementing the `TreeRecord` convention
//! - `FnAdapter` for an arbitrary typed closure
//! - `JsonAdapter` for untyped JSON objects addressed by configured field names

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Attributes, TreeNode};
use crate::domain::tree_config::TreeConfig;

/// Converts one source record into a tree node.
///
/// Implementations must not mutate the record and must fail with
/// `DomainError::InvalidRecord` when no identifier can be determined.
pub trait RecordAdapter<R, K, W> {
    fn adapt(&self, record: &R) -> DomainResult<TreeNode<K, W>>;
}

/// Structural convention for records that already carry tree fields.
pub trait TreeRecord {
    type Id;
    type Weight;

    /// `None` marks the record as unusable.
    fn id(&self) -> Option<Self::Id>;
    fn parent_id(&self) -> Self::Id;
    fn weight(&self) -> Self::Weight;

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// Adapter for any `TreeRecord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl<R> RecordAdapter<R, R::Id, R::Weight> for DefaultAdapter
where
    R: TreeRecord,
{
    fn adapt(&self, record: &R) -> DomainResult<TreeNode<R::Id, R::Weight>> {
        let id = record
            .id()
            .ok_or_else(|| DomainError::invalid_record("record has no id"))?;
        let mut node = TreeNode::new(id, record.parent_id(), record.weight());
        node.attributes.extend(record.attributes());
        Ok(node)
    }
}

/// Adapter backed by a caller-supplied conversion function.
pub struct FnAdapter<F> {
    convert: F,
}

impl<F> FnAdapter<F> {
    pub fn new(convert: F) -> Self {
        Self { convert }
    }
}

impl<R, K, W, F> RecordAdapter<R, K, W> for FnAdapter<F>
where
    F: Fn(&R) -> DomainResult<TreeNode<K, W>>,
{
    fn adapt(&self, record: &R) -> DomainResult<TreeNode<K, W>> {
        (self.convert)(record)
    }
}

/// Ready-made record implementing `TreeRecord`, deserialisable from any serde format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleRecord<K, W> {
    pub id: Option<K>,
    pub parent_id: K,
    pub weight: W,
    #[serde(default, flatten)]
    pub attributes: Attributes,
}

impl<K: Clone, W: Clone> TreeRecord for SimpleRecord<K, W> {
    type Id = K;
    type Weight = W;

    fn id(&self) -> Option<K> {
        self.id.clone()
    }

    fn parent_id(&self) -> K {
        self.parent_id.clone()
    }

    fn weight(&self) -> W {
        self.weight.clone()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

/// Dynamic adapter for JSON objects, reading fields by their configured names.
///
/// Every key other than id, parent id and weight is carried as an attribute,
/// including the name field.
#[derive(Debug, Clone)]
pub struct JsonAdapter<K, W> {
    config: TreeConfig,
    _marker: PhantomData<fn() -> (K, W)>,
}

impl<K, W> JsonAdapter<K, W> {
    pub fn new(config: &TreeConfig) -> Self {
        Self {
            config: config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K, W> RecordAdapter<Value, K, W> for JsonAdapter<K, W>
where
    K: DeserializeOwned,
    W: DeserializeOwned + Default,
{
    fn adapt(&self, record: &Value) -> DomainResult<TreeNode<K, W>> {
        let object = record.as_object().ok_or_else(|| {
            DomainError::invalid_record(format!("expected JSON object, got: {}", record))
        })?;

        let id_field = self.config.id_field();
        let parent_field = self.config.parent_id_field();
        let weight_field = self.config.weight_field();

        let id: K = match object.get(id_field) {
            None | Some(Value::Null) => {
                return Err(DomainError::invalid_record(format!(
                    "missing '{}' field",
                    id_field
                )))
            }
            Some(value) => deserialize_field(id_field, value)?,
        };
        let parent_id: K = match object.get(parent_field) {
            None => {
                return Err(DomainError::invalid_record(format!(
                    "missing '{}' field",
                    parent_field
                )))
            }
            Some(value) => deserialize_field(parent_field, value)?,
        };
        let weight: W = match object.get(weight_field) {
            None | Some(Value::Null) => W::default(),
            Some(value) => deserialize_field(weight_field, value)?,
        };

        let mut node = TreeNode::new(id, parent_id, weight);
        node.attributes.extend(
            object
                .iter()
                .filter(|(key, _)| {
                    key.as_str() != id_field && key.as_str() != parent_field && key.as_str() != weight_field
                })
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Ok(node)
    }
}

fn deserialize_field<T: DeserializeOwned>(field: &str, value: &Value) -> DomainResult<T> {
    T::deserialize(value)
        .map_err(|e| DomainError::invalid_record(format!("field '{}': {}", field, e)))
}
