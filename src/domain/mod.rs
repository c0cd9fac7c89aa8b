//! Domain layer: tree model, tip selection and MRCA resolution
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod mrca;
pub mod select;
pub mod subset;
pub mod tree;

pub use error::{DomainError, DomainResult};
pub use mrca::{check_preconditions, label_mrca, resolve_mrca, Mrca, MrcaLabel};
pub use select::{select_tips, select_tips_by, TipSet};
pub use subset::is_subset;
pub use tree::{NodeData, NodeId, PostOrderIterator, Tree, TreeNode};
