//! Most recent common ancestor resolution.
//!
//! One post-order walk appends every tip to a shared buffer, so the
//! descendant tips of each node form a contiguous range of it. Every node
//! whose range covers the selection is recorded as a candidate; the candidate
//! with the fewest descendant tips is the MRCA.

use std::collections::HashMap;
use std::ops::Range;

use tracing::{debug, instrument, trace};

use crate::domain::{is_subset, DomainError, DomainResult, NodeId, TipSet, Tree};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mrca {
    /// The most recent common ancestor
    pub node: NodeId,
    /// All tips below `node`, in post-order
    pub descendants: Vec<NodeId>,
}

/// How a resolved node is reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MrcaLabel {
    Named(String),
    /// Unnamed root; the caller picks the sentinel text
    Root,
}

/// Checks everything the resolver relies on, before any traversal starts.
#[instrument(level = "debug", skip_all)]
pub fn check_preconditions(tree: &Tree, selection: &TipSet) -> DomainResult<()> {
    let root = tree.root().ok_or(DomainError::EmptyTree)?;
    let degree = tree.neighbors(root).len();
    if degree != 2 {
        return Err(DomainError::NotRooted { degree });
    }
    // A non-root node of degree 2 has exactly one child; it would tie with
    // that child on descendant count.
    if let Some((_, node)) = tree
        .iter()
        .find(|&(idx, node)| idx != root && node.degree() == 2)
    {
        return Err(DomainError::UnaryNode {
            name: node.name().to_string(),
        });
    }
    if selection.is_empty() {
        return Err(DomainError::EmptySelection);
    }
    if !is_subset(selection, &tree.tips()) {
        if let Some(&foreign) = selection.iter().find(|&&tip| !tree.is_tip(tip)) {
            return Err(DomainError::ForeignTip(foreign));
        }
    }
    Ok(())
}

/// Resolves the MRCA of `selection` in `tree`.
///
/// Once the selection is known to consist of tips of `tree`, a node's
/// descendant tips contain the selection exactly when they hold
/// `selection.len()` selected tips. Those counts are summed bottom-up, so the
/// walk stays linear in the size of the tree.
#[instrument(level = "debug", skip_all, fields(selected = selection.len(), nodes = tree.len()))]
pub fn resolve_mrca(tree: &Tree, selection: &TipSet) -> DomainResult<Mrca> {
    check_preconditions(tree, selection)?;

    let wanted = selection.len();
    let mut buffer: Vec<NodeId> = Vec::new();
    // Finished subtrees whose parent has not been visited yet:
    // (range of their tips in `buffer`, selected tips in that range)
    let mut pending: Vec<(Range<usize>, usize)> = Vec::new();
    let mut candidates: HashMap<NodeId, Range<usize>> = HashMap::new();

    for (node, came_from) in tree.iter_postorder() {
        let children = tree
            .neighbors(node)
            .iter()
            .filter(|&&next| Some(next) != came_from)
            .count();

        let (range, hits) = if children == 0 {
            buffer.push(node);
            let hits = usize::from(selection.contains(&node));
            (buffer.len() - 1..buffer.len(), hits)
        } else {
            let first = pending.len().saturating_sub(children);
            let start = pending
                .get(first)
                .map_or(buffer.len(), |(range, _)| range.start);
            let hits = pending.drain(first..).map(|(_, hits)| hits).sum::<usize>();
            (start..buffer.len(), hits)
        };

        if hits == wanted {
            trace!(?node, tips = range.len(), "candidate");
            candidates.insert(node, range.clone());
        }
        pending.push((range, hits));
    }
    debug!("{} candidates", candidates.len());

    // The root always qualifies once the preconditions hold.
    let (node, range) = candidates
        .into_iter()
        .min_by_key(|(_, range)| range.len())
        .ok_or(DomainError::EmptySelection)?;

    Ok(Mrca {
        node,
        descendants: buffer[range].to_vec(),
    })
}

/// Names the resolved node.
pub fn label_mrca(tree: &Tree, node: NodeId) -> DomainResult<MrcaLabel> {
    match tree.name(node) {
        Some(name) if !name.is_empty() => Ok(MrcaLabel::Named(name.to_string())),
        _ if tree.root() == Some(node) => Ok(MrcaLabel::Root),
        _ => Err(DomainError::UnnamedMrca),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeData;

    struct Fixture {
        tree: Tree,
        root: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        d: NodeId,
        x: NodeId,
    }

    /// ((A,B)X,(C,D)Y)root;
    fn fixture() -> Fixture {
        let mut tree = Tree::new();
        let root = tree.add_root(NodeData::named("root"));
        let x = tree.add_child(root, NodeData::named("X")).unwrap();
        let a = tree.add_child(x, NodeData::named("A")).unwrap();
        let b = tree.add_child(x, NodeData::named("B")).unwrap();
        let y = tree.add_child(root, NodeData::named("Y")).unwrap();
        let c = tree.add_child(y, NodeData::named("C")).unwrap();
        let d = tree.add_child(y, NodeData::named("D")).unwrap();
        Fixture {
            tree,
            root,
            a,
            b,
            c,
            d,
            x,
        }
    }

    fn set(ids: &[NodeId]) -> TipSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_cherry_resolves_to_its_parent() {
        let f = fixture();
        let mrca = resolve_mrca(&f.tree, &set(&[f.a, f.b])).unwrap();
        assert_eq!(mrca.node, f.x);
        assert_eq!(mrca.descendants, vec![f.a, f.b]);
    }

    #[test]
    fn test_tips_across_the_root_resolve_to_root() {
        let f = fixture();
        let mrca = resolve_mrca(&f.tree, &set(&[f.a, f.c])).unwrap();
        assert_eq!(mrca.node, f.root);
        assert_eq!(mrca.descendants.len(), 4);
    }

    #[test]
    fn test_single_tip_resolves_to_itself() {
        let f = fixture();
        let mrca = resolve_mrca(&f.tree, &set(&[f.d])).unwrap();
        assert_eq!(mrca.node, f.d);
        assert_eq!(mrca.descendants, vec![f.d]);
    }

    #[test]
    fn test_interior_node_in_selection_is_rejected() {
        let f = fixture();
        let result = resolve_mrca(&f.tree, &set(&[f.a, f.x]));
        assert_eq!(result, Err(DomainError::ForeignTip(f.x)));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let f = fixture();
        assert_eq!(
            resolve_mrca(&f.tree, &TipSet::new()),
            Err(DomainError::EmptySelection)
        );
    }

    #[test]
    fn test_unary_interior_node_is_rejected() {
        let mut tree = Tree::new();
        let root = tree.add_root(NodeData::default());
        let u = tree.add_child(root, NodeData::named("U")).unwrap();
        let a = tree.add_child(u, NodeData::named("A")).unwrap();
        tree.add_child(root, NodeData::named("B")).unwrap();
        assert_eq!(
            resolve_mrca(&tree, &set(&[a])),
            Err(DomainError::UnaryNode {
                name: "U".to_string()
            })
        );
    }

    #[test]
    fn test_descendants_follow_input_order() {
        let f = fixture();
        let mrca = resolve_mrca(&f.tree, &set(&[f.b, f.c])).unwrap();
        assert_eq!(mrca.node, f.root);
        assert_eq!(mrca.descendants, vec![f.a, f.b, f.c, f.d]);
    }

    #[test]
    fn test_label_mrca() {
        let mut tree = Tree::new();
        let root = tree.add_root(NodeData::default());
        let inner = tree.add_child(root, NodeData::default()).unwrap();
        let a = tree.add_child(inner, NodeData::named("A")).unwrap();
        assert_eq!(label_mrca(&tree, a), Ok(MrcaLabel::Named("A".into())));
        assert_eq!(label_mrca(&tree, root), Ok(MrcaLabel::Root));
        assert_eq!(label_mrca(&tree, inner), Err(DomainError::UnnamedMrca));
    }
}
