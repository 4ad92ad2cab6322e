use serde::{Deserialize, Serialize};

/// Recognised marker leaf, identified by its exact drawable signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Vertical three-dot overflow menu icon.
    Menu,
    /// Four-point sparkle icon; signals a composite region.
    Sparkle,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 2] = [MarkerKind::Menu, MarkerKind::Sparkle];

    /// Whether finding this kind inside a group promotes the whole group.
    pub fn is_secondary(self) -> bool {
        matches!(self, MarkerKind::Sparkle)
    }

    pub fn label(self) -> &'static str {
        match self {
            MarkerKind::Menu => "menu",
            MarkerKind::Sparkle => "sparkle",
        }
    }
}

/// Owned copy of the marker-bearing part of one subtree.
///
/// Branches without markers are absent rather than empty. A level that ends up
/// with exactly one contribution does not produce a one-child group: the child
/// is promoted in place and its `ancestor` is rewritten to the current node,
/// which is how a single-descendant group is represented.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ScanNode<N> {
    Leaf {
        node: N,
        kind: MarkerKind,
        ancestor: Option<N>,
    },
    Group {
        ancestor: N,
        children: Vec<ScanNode<N>>,
    },
}

impl<N> ScanNode<N> {
    pub fn leaf(node: N, kind: MarkerKind) -> Self {
        ScanNode::Leaf {
            node,
            kind,
            ancestor: None,
        }
    }

    pub(crate) fn reparent(self, new_ancestor: N) -> Self {
        match self {
            ScanNode::Leaf { node, kind, .. } => ScanNode::Leaf {
                node,
                kind,
                ancestor: Some(new_ancestor),
            },
            ScanNode::Group { children, .. } => ScanNode::Group {
                ancestor: new_ancestor,
                children,
            },
        }
    }

    pub fn ancestor(&self) -> Option<&N> {
        match self {
            ScanNode::Leaf { ancestor, .. } => ancestor.as_ref(),
            ScanNode::Group { ancestor, .. } => Some(ancestor),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ScanNode::Group { .. })
    }
}

/// A scanned tree after composite promotion.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MergedNode<N> {
    Leaf {
        node: N,
        kind: MarkerKind,
        ancestor: Option<N>,
    },
    /// A whole group absorbed because one of its direct children was a
    /// secondary marker. `region` is the group's ancestor, `marker` the
    /// secondary leaf that triggered the promotion.
    Composite { marker: N, region: N },
    Group {
        ancestor: N,
        children: Vec<MergedNode<N>>,
    },
}

impl<N> MergedNode<N> {
    pub fn ancestor(&self) -> Option<&N> {
        match self {
            MergedNode::Leaf { ancestor, .. } => ancestor.as_ref(),
            MergedNode::Composite { region, .. } => Some(region),
            MergedNode::Group { ancestor, .. } => Some(ancestor),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, MergedNode::Group { .. })
    }

    pub fn children(&self) -> &[MergedNode<N>] {
        match self {
            MergedNode::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Depth-first search for a composite leaf at or below this node.
    pub fn contains_composite(&self) -> bool {
        match self {
            MergedNode::Composite { .. } => true,
            MergedNode::Group { children, .. } => {
                children.iter().any(MergedNode::contains_composite)
            }
            MergedNode::Leaf { .. } => false,
        }
    }

    pub fn shape(&self) -> TreeShape {
        let mut shape = TreeShape::default();
        self.accumulate(1, &mut shape);
        shape
    }

    fn accumulate(&self, depth: usize, shape: &mut TreeShape) {
        shape.depth = shape.depth.max(depth);
        match self {
            MergedNode::Leaf { .. } => shape.leaves += 1,
            MergedNode::Composite { .. } => shape.composites += 1,
            MergedNode::Group { children, .. } => {
                shape.groups += 1;
                for child in children {
                    child.accumulate(depth + 1, shape);
                }
            }
        }
    }
}

impl<N> From<ScanNode<N>> for MergedNode<N> {
    fn from(value: ScanNode<N>) -> Self {
        match value {
            ScanNode::Leaf {
                node,
                kind,
                ancestor,
            } => MergedNode::Leaf {
                node,
                kind,
                ancestor,
            },
            ScanNode::Group { ancestor, children } => MergedNode::Group {
                ancestor,
                children: children.into_iter().map(MergedNode::from).collect(),
            },
        }
    }
}

/// Counts used in log lines and CLI summaries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TreeShape {
    pub groups: usize,
    pub leaves: usize,
    pub composites: usize,
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_counts_every_variant() {
        let tree = MergedNode::Group {
            ancestor: 1,
            children: vec![
                MergedNode::Leaf {
                    node: 2,
                    kind: MarkerKind::Menu,
                    ancestor: Some(3),
                },
                MergedNode::Group {
                    ancestor: 4,
                    children: vec![
                        MergedNode::Composite {
                            marker: 5,
                            region: 6,
                        },
                        MergedNode::Leaf {
                            node: 7,
                            kind: MarkerKind::Menu,
                            ancestor: None,
                        },
                    ],
                },
            ],
        };
        assert_eq!(
            tree.shape(),
            TreeShape {
                groups: 2,
                leaves: 2,
                composites: 1,
                depth: 3,
            }
        );
        assert!(tree.contains_composite());
        assert!(!tree.children()[0].contains_composite());
    }

    #[test]
    fn reparent_overwrites_ancestor_for_both_shapes() {
        let leaf = ScanNode::leaf(1, MarkerKind::Sparkle).reparent(9);
        assert_eq!(leaf.ancestor(), Some(&9));
        let group = ScanNode::Group {
            ancestor: 2,
            children: vec![ScanNode::leaf(3, MarkerKind::Menu), ScanNode::leaf(4, MarkerKind::Menu)],
        }
        .reparent(8);
        assert_eq!(group.ancestor(), Some(&8));
        assert!(group.is_group());
    }
}
