//! Tree builder: turns a flat record sequence into a sorted forest.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::slice;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::adapter::{DefaultAdapter, RecordAdapter, TreeRecord};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;
use crate::domain::tree_config::TreeConfig;

/// Builds forests from flat records using one configuration and one adapter.
///
/// Holds no mutable state, so a single builder can serve any number of builds,
/// including from several threads when the adapter is `Sync`.
pub struct TreeBuilder<'c, A> {
    config: &'c TreeConfig,
    adapter: A,
}

impl<'c> TreeBuilder<'c, DefaultAdapter> {
    /// Builder for records implementing `TreeRecord`.
    pub fn with_default_adapter(config: &'c TreeConfig) -> Self {
        Self::new(config, DefaultAdapter)
    }
}

impl<'c, A> TreeBuilder<'c, A> {
    pub fn new(config: &'c TreeConfig, adapter: A) -> Self {
        Self { config, adapter }
    }

    pub fn config(&self) -> &TreeConfig {
        self.config
    }

    /// Build the forest rooted at every record whose parent id equals `root_sentinel`.
    ///
    /// Siblings at every level, and the returned roots, are sorted by weight; equal
    /// weights keep input order. Records whose parent never appears are omitted.
    /// An adapter error aborts the whole build and reports the record's input index.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn build<R, K, W>(&self, records: &[R], root_sentinel: &K) -> DomainResult<Vec<TreeNode<K, W>>>
    where
        A: RecordAdapter<R, K, W>,
        K: Clone + Eq + Hash + Debug,
        W: Ord + Clone,
    {
        let mut arena = Arena::new();
        let mut order = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let node = self.adapter.adapt(record).map_err(|e| e.at_index(index))?;
            order.push(arena.insert(node));
        }

        let roots: Vec<Index> = order
            .iter()
            .copied()
            .filter(|&idx| arena[idx].parent_id == *root_sentinel)
            .collect();
        let forest = Attach::new(&arena, &order, self.config).forest(&roots)?;

        let attached: usize = forest.iter().map(TreeNode::len).sum();
        debug!(
            roots = forest.len(),
            attached,
            omitted = order.len().saturating_sub(attached),
            "forest built"
        );
        Ok(forest)
    }

    /// Build the forest and return the subtree of the first node with `id`.
    ///
    /// Lookup is pre-order across the sorted roots; `None` if `id` is not reachable.
    pub fn build_single<R, K, W>(
        &self,
        records: &[R],
        root_sentinel: &K,
        id: &K,
    ) -> DomainResult<Option<TreeNode<K, W>>>
    where
        A: RecordAdapter<R, K, W>,
        K: Clone + Eq + Hash + Debug,
        W: Ord + Clone,
    {
        let forest = self.build(records, root_sentinel)?;
        Ok(forest.into_iter().find_map(|root| root.into_find(id)))
    }
}

/// Build a forest in one call with an explicit configuration and adapter.
pub fn build<R, K, W, A>(
    records: &[R],
    root_sentinel: &K,
    config: &TreeConfig,
    adapter: A,
) -> DomainResult<Vec<TreeNode<K, W>>>
where
    A: RecordAdapter<R, K, W>,
    K: Clone + Eq + Hash + Debug,
    W: Ord + Clone,
{
    TreeBuilder::new(config, adapter).build(records, root_sentinel)
}

/// Build a forest from records that follow the `TreeRecord` convention.
pub fn build_from<R>(
    records: &[R],
    root_sentinel: &R::Id,
    config: &TreeConfig,
) -> DomainResult<Vec<TreeNode<R::Id, R::Weight>>>
where
    R: TreeRecord,
    R::Id: Clone + Eq + Hash + Debug,
    R::Weight: Ord + Clone,
{
    TreeBuilder::with_default_adapter(config).build(records, root_sentinel)
}

/// Attachment pass over the adapted nodes.
///
/// Children are looked up over the full input sequence, so with duplicate ids a
/// node is attached (as an independent copy) under each matching parent.
/// Descent uses an explicit stack; input depth is bounded only by memory.
struct Attach<'a, K, W> {
    arena: &'a Arena<TreeNode<K, W>>,
    /// Arena indices of the records naming each parent id, in input order
    children_of: HashMap<&'a K, Vec<Index>>,
    config: &'a TreeConfig,
}

/// A node whose children are still being attached.
struct Frame<'s, K, W> {
    idx: Index,
    node: TreeNode<K, W>,
    pending: slice::Iter<'s, Index>,
    depth: usize,
}

impl<'a, K, W> Attach<'a, K, W>
where
    K: Clone + Eq + Hash + Debug,
    W: Ord + Clone,
{
    fn new(arena: &'a Arena<TreeNode<K, W>>, order: &[Index], config: &'a TreeConfig) -> Self {
        let mut children_of: HashMap<&'a K, Vec<Index>> = HashMap::new();
        for &idx in order {
            children_of.entry(&arena[idx].parent_id).or_default().push(idx);
        }
        Self {
            arena,
            children_of,
            config,
        }
    }

    /// Attach the subtrees of `roots` and return them sorted by weight.
    ///
    /// Without a depth bound, a node met again on its own ancestor path is a
    /// cycle. With a bound, descent ends at the bound instead.
    fn forest(&self, roots: &[Index]) -> DomainResult<Vec<TreeNode<K, W>>> {
        let guard_cycles = self.config.max_depth().is_none();
        let mut on_path = HashSet::new();
        let mut forest = Vec::with_capacity(roots.len());

        for &root in roots {
            if guard_cycles {
                on_path.insert(root);
            }
            let mut stack = vec![self.frame(root, 0)];

            while let Some(mut frame) = stack.pop() {
                if let Some(&child_idx) = frame.pending.next() {
                    let depth = frame.depth + 1;
                    if guard_cycles && !on_path.insert(child_idx) {
                        return Err(DomainError::CycleDetected(format!(
                            "{:?}",
                            self.arena[child_idx].id
                        )));
                    }
                    trace!(parent = ?frame.node.id, child = ?self.arena[child_idx].id, depth, "attach");
                    stack.push(frame);
                    stack.push(self.frame(child_idx, depth));
                    continue;
                }

                if guard_cycles {
                    on_path.remove(&frame.idx);
                }
                let mut node = frame.node;
                node.children = sort_by_weight(std::mem::take(&mut node.children));
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(node),
                    None => forest.push(node),
                }
            }
        }
        Ok(sort_by_weight(forest))
    }

    fn frame(&self, idx: Index, depth: usize) -> Frame<'_, K, W> {
        let node = self.arena[idx].clone();
        let pending: &[Index] = if self.config.depth_exhausted(depth) {
            &[]
        } else {
            self.children_of
                .get(&node.id)
                .map(Vec::as_slice)
                .unwrap_or(&[])
        };
        Frame {
            idx,
            node,
            pending: pending.iter(),
            depth,
        }
    }
}

/// Stable sort: equal weights keep their relative input order.
fn sort_by_weight<K, W: Ord>(nodes: Vec<TreeNode<K, W>>) -> Vec<TreeNode<K, W>> {
    nodes
        .into_iter()
        .sorted_by(|a, b| compare_weight(a, b))
        .collect()
}

fn compare_weight<K, W: Ord>(a: &TreeNode<K, W>, b: &TreeNode<K, W>) -> Ordering {
    a.weight.cmp(&b.weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adapter::FnAdapter;

    type Row = (u32, u32, i32);

    fn adapter() -> FnAdapter<impl Fn(&Row) -> DomainResult<TreeNode<u32, i32>>> {
        FnAdapter::new(|r: &Row| Ok::<_, DomainError>(TreeNode::new(r.0, r.1, r.2)))
    }

    fn ids(nodes: &[TreeNode<u32, i32>]) -> Vec<u32> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn given_unlimited_depth_when_building_then_attaches_all_levels() {
        let rows: Vec<Row> = vec![(1, 0, 0), (2, 1, 0), (3, 2, 0), (4, 3, 0)];
        let config = TreeConfig::default();

        let forest = TreeBuilder::new(&config, adapter()).build(&rows, &0).unwrap();

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(forest[0].depth(), 4);
    }

    #[test]
    fn given_depth_bound_two_when_building_then_stops_below_grandchildren() {
        let rows: Vec<Row> = vec![(1, 0, 0), (2, 1, 0), (3, 2, 0), (4, 3, 0)];
        let config = TreeConfig::builder().max_depth(2).build().unwrap();

        let forest = TreeBuilder::new(&config, adapter()).build(&rows, &0).unwrap();

        assert_eq!(forest[0].depth(), 3);
        assert_eq!(forest[0].leaf_ids(), vec![3]);
    }

    #[test]
    fn given_self_parented_root_when_building_then_cycle_detected() {
        let rows: Vec<Row> = vec![(0, 0, 0)];
        let config = TreeConfig::default();

        let result = TreeBuilder::new(&config, adapter()).build(&rows, &0);

        assert_eq!(result, Err(DomainError::CycleDetected("0".to_string())));
    }

    #[test]
    fn given_self_parented_root_under_depth_bound_when_building_then_bound_ends_descent() {
        let rows: Vec<Row> = vec![(0, 0, 0)];
        let config = TreeConfig::builder().max_depth(1).build().unwrap();

        let forest = TreeBuilder::new(&config, adapter()).build(&rows, &0).unwrap();

        assert_eq!(ids(&forest), vec![0]);
        assert_eq!(ids(&forest[0].children), vec![0]);
        assert!(forest[0].children[0].is_leaf());
    }

    #[test]
    fn given_failing_record_when_building_then_error_carries_input_index() {
        let rows: Vec<Row> = vec![(1, 0, 0), (2, 1, 0), (3, 1, 0)];
        let config = TreeConfig::default();
        let failing = FnAdapter::new(|r: &Row| {
            if r.0 == 2 {
                Err(DomainError::invalid_record("bad"))
            } else {
                Ok(TreeNode::new(r.0, r.1, r.2))
            }
        });

        let result = TreeBuilder::new(&config, failing).build(&rows, &0);

        assert_eq!(
            result,
            Err(DomainError::InvalidRecord {
                index: Some(1),
                reason: "bad".to_string()
            })
        );
    }

    #[test]
    fn given_known_id_when_building_single_then_returns_subtree() {
        let rows: Vec<Row> = vec![(1, 0, 0), (2, 1, 0), (3, 2, 0)];
        let config = TreeConfig::default();
        let builder = TreeBuilder::new(&config, adapter());

        let single = builder.build_single(&rows, &0, &2).unwrap().unwrap();
        assert_eq!(single.id, 2);
        assert_eq!(ids(&single.children), vec![3]);

        assert!(builder.build_single(&rows, &0, &42).unwrap().is_none());
    }
}
