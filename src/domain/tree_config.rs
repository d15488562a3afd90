//! Tree configuration: logical field names and the depth bound.

use std::collections::HashSet;

use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_ID_FIELD: &str = "id";
pub const DEFAULT_PARENT_ID_FIELD: &str = "parentId";
pub const DEFAULT_NAME_FIELD: &str = "name";
pub const DEFAULT_WEIGHT_FIELD: &str = "weight";
pub const DEFAULT_CHILDREN_FIELD: &str = "children";

/// Immutable configuration for a single build.
///
/// The field names only matter to dynamic adapters (`JsonAdapter`) and to
/// `TreeNode::to_json`; statically typed adapters ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    id_field: String,
    parent_id_field: String,
    name_field: String,
    weight_field: String,
    children_field: String,
    /// `None` means unlimited, `Some(0)` means roots only
    max_depth: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.into(),
            parent_id_field: DEFAULT_PARENT_ID_FIELD.into(),
            name_field: DEFAULT_NAME_FIELD.into(),
            weight_field: DEFAULT_WEIGHT_FIELD.into(),
            children_field: DEFAULT_CHILDREN_FIELD.into(),
            max_depth: None,
        }
    }
}

impl TreeConfig {
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn parent_id_field(&self) -> &str {
        &self.parent_id_field
    }

    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    pub fn weight_field(&self) -> &str {
        &self.weight_field
    }

    pub fn children_field(&self) -> &str {
        &self.children_field
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// True if a node at `depth` may not have children attached.
    pub(crate) fn depth_exhausted(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }
}

/// Validating builder for `TreeConfig`.
///
/// Every check runs in `build()`, so an invalid configuration never reaches
/// `TreeBuilder::build`.
#[derive(Debug, Clone, Default)]
pub struct TreeConfigBuilder {
    id_field: Option<String>,
    parent_id_field: Option<String>,
    name_field: Option<String>,
    weight_field: Option<String>,
    children_field: Option<String>,
    max_depth: Option<i64>,
}

impl TreeConfigBuilder {
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = Some(name.into());
        self
    }

    pub fn parent_id_field(mut self, name: impl Into<String>) -> Self {
        self.parent_id_field = Some(name.into());
        self
    }

    pub fn name_field(mut self, name: impl Into<String>) -> Self {
        self.name_field = Some(name.into());
        self
    }

    pub fn weight_field(mut self, name: impl Into<String>) -> Self {
        self.weight_field = Some(name.into());
        self
    }

    pub fn children_field(mut self, name: impl Into<String>) -> Self {
        self.children_field = Some(name.into());
        self
    }

    /// Negative values are rejected in `build()`.
    pub fn max_depth(mut self, depth: i64) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Apply an optional depth; `None` keeps the depth unlimited.
    pub fn max_depth_opt(mut self, depth: Option<i64>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn build(self) -> DomainResult<TreeConfig> {
        let defaults = TreeConfig::default();

        let max_depth = match self.max_depth {
            None => None,
            Some(d) if d < 0 => {
                return Err(DomainError::Configuration(format!(
                    "max_depth must be >= 0, got {}",
                    d
                )))
            }
            Some(d) => Some(usize::try_from(d).map_err(|e| {
                DomainError::Configuration(format!("max_depth out of range: {}", e))
            })?),
        };

        let config = TreeConfig {
            id_field: self.id_field.unwrap_or(defaults.id_field),
            parent_id_field: self.parent_id_field.unwrap_or(defaults.parent_id_field),
            name_field: self.name_field.unwrap_or(defaults.name_field),
            weight_field: self.weight_field.unwrap_or(defaults.weight_field),
            children_field: self.children_field.unwrap_or(defaults.children_field),
            max_depth,
        };
        validate_field_names(&config)?;
        Ok(config)
    }
}

fn validate_field_names(config: &TreeConfig) -> DomainResult<()> {
    let fields = [
        ("id_field", config.id_field()),
        ("parent_id_field", config.parent_id_field()),
        ("name_field", config.name_field()),
        ("weight_field", config.weight_field()),
        ("children_field", config.children_field()),
    ];

    let mut seen = HashSet::new();
    for (label, name) in fields {
        if name.trim().is_empty() {
            return Err(DomainError::Configuration(format!("{} must not be empty", label)));
        }
        if !seen.insert(name) {
            return Err(DomainError::Configuration(format!(
                "field name '{}' used for more than one field",
                name
            )));
        }
    }
    Ok(())
}
