//! Conversion of built trees into `termtree` renderings.

use std::fmt::Display;

use termtree::Tree;

use crate::domain::{TreeConfig, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, config: &TreeConfig) -> Tree<String>;
}

impl<K: Display, W: Display> TreeNodeConvert for TreeNode<K, W> {
    fn to_tree_string(&self, config: &TreeConfig) -> Tree<String> {
        let label = match self.name(config) {
            Some(name) => format!("{} ({}) [{}]", name, self.id, self.weight),
            None => format!("{} [{}]", self.id, self.weight),
        };

        // Recursively construct the children
        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|c| c.to_tree_string(config))
            .collect();

        Tree::new(label).with_leaves(leaves)
    }
}
