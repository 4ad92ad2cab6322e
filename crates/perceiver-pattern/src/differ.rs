use std::time::Instant;

use crate::events;
use crate::model::MergedNode;

/// Structural equality between two merged trees, used by the convergence
/// detector to tell whether the document settled between two cycles.
///
/// Leaves match on node identity and kind, composites on marker and region,
/// groups on their children in order. A group's own ancestor is not compared.
pub fn same_tree<N: PartialEq>(a: Option<&MergedNode<N>>, b: Option<&MergedNode<N>>) -> bool {
    let started = Instant::now();
    let equal = match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => nodes_equal(a, b),
        _ => false,
    };
    events::emit_compare(equal, started.elapsed());
    equal
}

fn nodes_equal<N: PartialEq>(a: &MergedNode<N>, b: &MergedNode<N>) -> bool {
    match (a, b) {
        (
            MergedNode::Leaf {
                node: left,
                kind: left_kind,
                ..
            },
            MergedNode::Leaf {
                node: right,
                kind: right_kind,
                ..
            },
        ) => left == right && left_kind == right_kind,
        (
            MergedNode::Composite {
                marker: left_marker,
                region: left_region,
            },
            MergedNode::Composite {
                marker: right_marker,
                region: right_region,
            },
        ) => left_marker == right_marker && left_region == right_region,
        (
            MergedNode::Group {
                children: left, ..
            },
            MergedNode::Group {
                children: right, ..
            },
        ) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(l, r)| nodes_equal(l, r))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkerKind;

    fn leaf(node: u32, kind: MarkerKind) -> MergedNode<u32> {
        MergedNode::Leaf {
            node,
            kind,
            ancestor: Some(node + 100),
        }
    }

    fn group(ancestor: u32, children: Vec<MergedNode<u32>>) -> MergedNode<u32> {
        MergedNode::Group { ancestor, children }
    }

    #[test]
    fn absent_trees_are_equal_only_to_each_other() {
        let tree = leaf(1, MarkerKind::Menu);
        assert!(same_tree::<u32>(None, None));
        assert!(!same_tree(Some(&tree), None));
        assert!(!same_tree(None, Some(&tree)));
    }

    #[test]
    fn tree_equals_itself() {
        let tree = group(
            1,
            vec![
                leaf(2, MarkerKind::Menu),
                MergedNode::Composite { marker: 3, region: 4 },
            ],
        );
        assert!(same_tree(Some(&tree), Some(&tree.clone())));
    }

    #[test]
    fn group_ancestor_is_not_compared() {
        let a = group(1, vec![leaf(2, MarkerKind::Menu), leaf(3, MarkerKind::Menu)]);
        let b = group(9, vec![leaf(2, MarkerKind::Menu), leaf(3, MarkerKind::Menu)]);
        assert!(same_tree(Some(&a), Some(&b)));
    }

    #[test]
    fn differing_shapes_and_identities_are_detected() {
        let base = group(1, vec![leaf(2, MarkerKind::Menu), leaf(3, MarkerKind::Menu)]);
        let reordered = group(1, vec![leaf(3, MarkerKind::Menu), leaf(2, MarkerKind::Menu)]);
        let longer = group(
            1,
            vec![
                leaf(2, MarkerKind::Menu),
                leaf(3, MarkerKind::Menu),
                leaf(4, MarkerKind::Menu),
            ],
        );
        let rekinded = group(1, vec![leaf(2, MarkerKind::Menu), leaf(3, MarkerKind::Sparkle)]);
        let promoted = group(
            1,
            vec![leaf(2, MarkerKind::Menu), MergedNode::Composite { marker: 3, region: 5 }],
        );
        for other in [reordered, longer, rekinded, promoted] {
            assert!(!same_tree(Some(&base), Some(&other)));
        }
    }

    #[test]
    fn composite_compares_marker_and_region() {
        let a = MergedNode::Composite { marker: 1, region: 2 };
        let b = MergedNode::Composite { marker: 1, region: 3 };
        assert!(!same_tree(Some(&a), Some(&b)));
    }
}
