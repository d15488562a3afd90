//! Domain layer: tree nodes, configuration, adapters and the builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod adapter;
pub mod builder;
pub mod error;
pub mod node;
pub mod tree_config;
pub mod weight;

pub use adapter::{DefaultAdapter, FnAdapter, JsonAdapter, RecordAdapter, SimpleRecord, TreeRecord};
pub use builder::{build, build_from, TreeBuilder};
pub use error::{DomainError, DomainResult};
pub use node::{forest_to_json, Attributes, PostOrderIterator, TreeIterator, TreeNode};
pub use tree_config::{TreeConfig, TreeConfigBuilder};
pub use weight::JsonWeight;
