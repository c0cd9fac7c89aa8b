//! Tree rendering for `mrca show`

use colored::Colorize;
use termtree::Tree as TermTree;

use crate::domain::{NodeId, TipSet, Tree};

/// Renders `tree` from its root, marking selected tips and the MRCA.
///
/// Built bottom-up from the post-order walk, so building itself does not
/// recurse.
pub fn render_tree(tree: &Tree, selected: &TipSet, mrca: Option<NodeId>) -> TermTree<String> {
    if tree.is_empty() {
        return TermTree::new("(empty tree)".to_string());
    }
    let mut finished: Vec<TermTree<String>> = Vec::new();

    for (node, came_from) in tree.iter_postorder() {
        let children = tree
            .neighbors(node)
            .iter()
            .filter(|&&next| Some(next) != came_from)
            .count();
        let leaves = finished.split_off(finished.len().saturating_sub(children));
        finished.push(TermTree::new(node_label(tree, node, selected, mrca)).with_leaves(leaves));
    }

    // A non-empty tree always has a root, which is visited last.
    finished.pop().unwrap_or_else(|| TermTree::new(String::new()))
}

fn node_label(tree: &Tree, node: NodeId, selected: &TipSet, mrca: Option<NodeId>) -> String {
    let name = match tree.name(node) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "·".to_string(),
    };
    let mut label = if selected.contains(&node) {
        format!("{} {}", name.green().bold(), "*".green())
    } else {
        name
    };
    if let Some(length) = tree.get(node).and_then(|n| n.data.branch_length) {
        label = format!("{label} {}", format!(":{length}").dimmed());
    }
    if mrca == Some(node) {
        label = format!("{label} {}", "<- MRCA".cyan().bold());
    }
    label
}
