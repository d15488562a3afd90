//! rstree: build sorted, depth-bounded forests from flat parent-referencing records.
//!
//! ```
//! use rstree::domain::{build, FnAdapter, TreeConfig, TreeNode, DomainError};
//!
//! let rows = vec![(1u32, 0u32, 2i32), (2, 0, 1), (3, 1, 0)];
//! let adapter = FnAdapter::new(|r: &(u32, u32, i32)| {
//!     Ok::<_, DomainError>(TreeNode::new(r.0, r.1, r.2))
//! });
//!
//! let forest = build(&rows, &0, &TreeConfig::default(), adapter).unwrap();
//! assert_eq!(forest.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1]);
//! assert_eq!(forest[1].children[0].id, 3);
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
