//! Tree node: the output unit of a build.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::tree_config::TreeConfig;

/// Free-form payload carried through a build unchanged.
pub type Attributes = BTreeMap<String, Value>;

/// A node in a built forest.
///
/// Each node exclusively owns its `children`; there is no back-reference to the
/// parent object, only the `parent_id` value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<K, W> {
    pub id: K,
    pub parent_id: K,
    /// Orders siblings; ties keep input order
    pub weight: W,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode<K, W>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

// Iterative: dropping a deep chain must not recurse once per level.
impl<K, W> Drop for TreeNode<K, W> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl<K, W> TreeNode<K, W> {
    pub fn new(id: K, parent_id: K, weight: W) -> Self {
        Self {
            id,
            parent_id,
            weight,
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Display name stored under the configured name field, if it is a string.
    pub fn name(&self, config: &TreeConfig) -> Option<&str> {
        self.attribute(config.name_field()).and_then(Value::as_str)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> TreeIterator<'_, K, W> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, K, W> {
        PostOrderIterator::new(self)
    }
}

impl<K: PartialEq, W> TreeNode<K, W> {
    /// First node in this subtree (pre-order) with the given id.
    pub fn find(&self, id: &K) -> Option<&TreeNode<K, W>> {
        self.iter().find(|node| node.id == *id)
    }

    /// Move the first node (pre-order) with the given id out of this subtree.
    pub fn into_find(self, id: &K) -> Option<TreeNode<K, W>> {
        let mut stack = vec![self];
        while let Some(mut node) = stack.pop() {
            if node.id == *id {
                return Some(node);
            }
            let children = std::mem::take(&mut node.children);
            stack.extend(children.into_iter().rev());
        }
        None
    }

    /// Chain of nodes from `self` down to the node with `id`, both ends included.
    pub fn path_to(&self, id: &K) -> Option<Vec<&TreeNode<K, W>>> {
        if self.id == *id {
            return Some(vec![self]);
        }
        self.children.iter().find_map(|child| {
            child.path_to(id).map(|mut path| {
                path.insert(0, self);
                path
            })
        })
    }
}

impl<K: Clone, W> TreeNode<K, W> {
    /// Ids of all leaves, left to right.
    pub fn leaf_ids(&self) -> Vec<K> {
        self.iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.id.clone())
            .collect()
    }
}

impl<K: Serialize, W: Serialize> TreeNode<K, W> {
    /// Render this subtree as JSON using the configured field names.
    ///
    /// Attributes share the object with the structural keys; on a name clash the
    /// structural key wins. The children key is omitted for leaves.
    pub fn to_json(&self, config: &TreeConfig) -> serde_json::Result<Value> {
        let mut object = Map::new();
        for (name, value) in &self.attributes {
            object.insert(name.clone(), value.clone());
        }
        object.insert(config.id_field().to_string(), serde_json::to_value(&self.id)?);
        object.insert(
            config.parent_id_field().to_string(),
            serde_json::to_value(&self.parent_id)?,
        );
        object.insert(
            config.weight_field().to_string(),
            serde_json::to_value(&self.weight)?,
        );
        if !self.children.is_empty() {
            let children = self
                .children
                .iter()
                .map(|child| child.to_json(config))
                .collect::<serde_json::Result<Vec<_>>>()?;
            object.insert(config.children_field().to_string(), Value::Array(children));
        }
        Ok(Value::Object(object))
    }
}

/// Render a whole forest as a JSON array.
pub fn forest_to_json<K: Serialize, W: Serialize>(
    forest: &[TreeNode<K, W>],
    config: &TreeConfig,
) -> serde_json::Result<Value> {
    forest
        .iter()
        .map(|root| root.to_json(config))
        .collect::<serde_json::Result<Vec<_>>>()
        .map(Value::Array)
}

/// Pre-order traversal, children left to right.
pub struct TreeIterator<'a, K, W> {
    stack: Vec<&'a TreeNode<K, W>>,
}

impl<'a, K, W> TreeIterator<'a, K, W> {
    fn new(root: &'a TreeNode<K, W>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a, K, W> Iterator for TreeIterator<'a, K, W> {
    type Item = &'a TreeNode<K, W>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in current.children.iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

/// Post-order traversal: every child is yielded before its parent.
pub struct PostOrderIterator<'a, K, W> {
    stack: Vec<(&'a TreeNode<K, W>, bool)>,
}

impl<'a, K, W> PostOrderIterator<'a, K, W> {
    fn new(root: &'a TreeNode<K, W>) -> Self {
        Self {
            stack: vec![(root, false)],
        }
    }
}

impl<'a, K, W> Iterator for PostOrderIterator<'a, K, W> {
    type Item = &'a TreeNode<K, W>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for child in current.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
