use crate::model::{MergedNode, ScanNode};

/// Promotes composite regions in a freshly scanned tree.
pub fn merge<N>(tree: ScanNode<N>) -> MergedNode<N> {
    promote(MergedNode::from(tree))
}

/// Single top-down pass: a group whose direct children include a secondary
/// marker leaf becomes one composite anchored at the group's ancestor;
/// otherwise children are promoted recursively and a group left with a single
/// child collapses to it. Applying it to its own output changes nothing.
pub fn promote<N>(tree: MergedNode<N>) -> MergedNode<N> {
    match tree {
        MergedNode::Group { ancestor, children } => {
            let (secondary, children): (Vec<_>, Vec<_>) =
                children.into_iter().partition(is_secondary_leaf);
            if let Some(MergedNode::Leaf { node, .. }) = secondary.into_iter().next() {
                return MergedNode::Composite {
                    marker: node,
                    region: ancestor,
                };
            }

            let mut merged: Vec<MergedNode<N>> = children.into_iter().map(promote).collect();
            if merged.len() == 1 {
                merged.remove(0)
            } else {
                MergedNode::Group {
                    ancestor,
                    children: merged,
                }
            }
        }
        other => other,
    }
}

fn is_secondary_leaf<N>(node: &MergedNode<N>) -> bool {
    matches!(node, MergedNode::Leaf { kind, .. } if kind.is_secondary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::same_tree;
    use crate::model::MarkerKind;

    fn leaf(node: u32, kind: MarkerKind, ancestor: Option<u32>) -> ScanNode<u32> {
        ScanNode::Leaf {
            node,
            kind,
            ancestor,
        }
    }

    fn sample() -> ScanNode<u32> {
        ScanNode::Group {
            ancestor: 1,
            children: vec![
                ScanNode::Group {
                    ancestor: 10,
                    children: vec![
                        leaf(11, MarkerKind::Menu, None),
                        leaf(12, MarkerKind::Menu, Some(13)),
                    ],
                },
                ScanNode::Group {
                    ancestor: 20,
                    children: vec![
                        leaf(21, MarkerKind::Menu, Some(22)),
                        ScanNode::Group {
                            ancestor: 23,
                            children: vec![
                                leaf(24, MarkerKind::Sparkle, None),
                                leaf(25, MarkerKind::Menu, None),
                            ],
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn group_with_direct_secondary_leaf_becomes_composite() {
        let tree = ScanNode::Group {
            ancestor: 5,
            children: vec![
                leaf(6, MarkerKind::Menu, Some(7)),
                leaf(8, MarkerKind::Sparkle, Some(9)),
            ],
        };
        match merge(tree) {
            MergedNode::Composite { marker, region } => {
                assert_eq!(marker, 8);
                assert_eq!(region, 5);
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn nested_promotion_does_not_bubble_past_its_group() {
        let merged = merge(sample());
        let children = merged.children();
        assert_eq!(children.len(), 2);
        assert!(!children[0].contains_composite());
        match &children[1] {
            MergedNode::Group { ancestor, children } => {
                assert_eq!(*ancestor, 20);
                assert!(matches!(
                    children[1],
                    MergedNode::Composite {
                        marker: 24,
                        region: 23
                    }
                ));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn leaves_pass_through() {
        let merged = merge(leaf(3, MarkerKind::Sparkle, Some(4)));
        assert!(matches!(
            merged,
            MergedNode::Leaf {
                node: 3,
                kind: MarkerKind::Sparkle,
                ancestor: Some(4)
            }
        ));
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge(sample());
        let twice = promote(once.clone());
        assert!(same_tree(Some(&once), Some(&twice)));
    }

    #[test]
    fn single_remaining_child_collapses() {
        let tree = MergedNode::Group {
            ancestor: 1,
            children: vec![MergedNode::Leaf {
                node: 2,
                kind: MarkerKind::Menu,
                ancestor: None,
            }],
        };
        assert!(matches!(promote(tree), MergedNode::Leaf { node: 2, .. }));
    }
}
