//! Tip selection: narrows the tree's tips down to the ones a predicate accepts.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::{DomainError, DomainResult, NodeId, Tree, TreeNode};

/// Set of selected tips, keyed by node identity.
pub type TipSet = HashSet<NodeId>;

/// Returns the tips for which `predicate` holds.
///
/// The first failure aborts the whole selection; no partial set is handed
/// back. An id that is not a tip of `tree` fails with
/// [`DomainError::ForeignTip`].
#[instrument(level = "debug", skip(tree, predicate), fields(tips = tips.len()))]
pub fn select_tips<F, E>(tree: &Tree, tips: &[NodeId], mut predicate: F) -> Result<TipSet, E>
where
    F: FnMut(&TreeNode) -> Result<bool, E>,
    E: From<DomainError>,
{
    let mut selected = TipSet::new();
    for &tip in tips {
        let node = tree
            .get(tip)
            .filter(|node| node.is_tip())
            .ok_or(DomainError::ForeignTip(tip))?;
        if predicate(node)? {
            selected.insert(tip);
        }
    }
    debug!("selected {} of {} tips", selected.len(), tips.len());
    Ok(selected)
}

/// Variant for predicates that cannot fail.
pub fn select_tips_by<F>(tree: &Tree, tips: &[NodeId], mut predicate: F) -> DomainResult<TipSet>
where
    F: FnMut(&TreeNode) -> bool,
{
    select_tips(tree, tips, |node| Ok::<_, DomainError>(predicate(node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeData;
    use generational_arena::Index;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Boom,
        Domain(DomainError),
    }

    impl From<DomainError> for TestError {
        fn from(e: DomainError) -> Self {
            TestError::Domain(e)
        }
    }

    fn star(names: &[&str]) -> Tree {
        let mut tree = Tree::new();
        let root = tree.add_root(NodeData::default());
        for name in names {
            tree.add_child(root, NodeData::named(*name)).unwrap();
        }
        tree
    }

    #[test]
    fn test_selects_matching_tips_only() {
        let tree = star(&["human", "chimp", "mouse"]);
        let selected = select_tips_by(&tree, &tree.tips(), |n| n.name().contains('h')).unwrap();
        let mut names: Vec<_> = selected.iter().filter_map(|&id| tree.name(id)).collect();
        names.sort();
        assert_eq!(names, vec!["chimp", "human"]);
    }

    #[test]
    fn test_predicate_failure_aborts_selection() {
        let tree = star(&["a", "bad", "c"]);
        let mut seen = 0;
        let result = select_tips(&tree, &tree.tips(), |n| {
            seen += 1;
            if n.name() == "bad" {
                Err(TestError::Boom)
            } else {
                Ok(true)
            }
        });
        assert_eq!(result, Err(TestError::Boom));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_no_match_yields_empty_set() {
        let tree = star(&["a", "b"]);
        assert!(select_tips_by(&tree, &tree.tips(), |_| false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_id_outside_tree_fails_selection() {
        let tree = star(&["a", "b", "c", "d"]);
        let stranger = Index::from_raw_parts(999, 0);
        let mut input = tree.tips();
        input.push(stranger);

        let result = select_tips_by(&tree, &input, |_| true);

        assert_eq!(result, Err(DomainError::ForeignTip(stranger)));
    }

    #[test]
    fn test_only_foreign_input_is_not_an_empty_selection() {
        let tree = star(&["a", "b"]);
        let stranger = Index::from_raw_parts(999, 0);

        let result = select_tips(&tree, &[stranger], |_| Ok::<_, TestError>(true));

        assert_eq!(
            result,
            Err(TestError::Domain(DomainError::ForeignTip(stranger)))
        );
    }

    #[test]
    fn test_interior_node_fails_selection() {
        let tree = star(&["a", "b"]);
        let root = tree.root().unwrap();

        let result = select_tips_by(&tree, &[root], |_| true);

        assert_eq!(result, Err(DomainError::ForeignTip(root)));
    }
}
