use std::collections::HashSet;

use crate::domain::{NodeId, TipSet};

/// Returns true if every member of `needle` occurs in `haystack`.
pub fn is_subset(needle: &TipSet, haystack: &[NodeId]) -> bool {
    if haystack.len() < needle.len() {
        return false;
    }
    let lookup: HashSet<&NodeId> = haystack.iter().collect();
    needle.iter().all(|node| lookup.contains(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Index;

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().map(|&i| Index::from_raw_parts(i, 0)).collect()
    }

    #[test]
    fn test_is_subset() {
        let needle: TipSet = ids(&[1, 3]).into_iter().collect();
        assert!(is_subset(&needle, &ids(&[0, 1, 2, 3])));
        assert!(is_subset(&needle, &ids(&[3, 1])));
        assert!(!is_subset(&needle, &ids(&[0, 1, 2])));
        assert!(!is_subset(&needle, &ids(&[1])));
    }

    #[test]
    fn test_empty_needle_is_subset_of_anything() {
        assert!(is_subset(&TipSet::new(), &[]));
        assert!(is_subset(&TipSet::new(), &ids(&[7])));
    }
}
