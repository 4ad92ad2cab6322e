use document_adapter::DocumentTree;

use crate::model::ScanNode;
use crate::policy::PatternProfile;

/// Walks the children of `root` in document order and copies out every branch
/// that leads to a marker leaf.
///
/// Marker children are taken as leaves without looking inside them. Any other
/// child is recursed into and contributes its result, re-parented to that
/// child. Zero contributions yield `None`, one is promoted and re-parented to
/// `root`, two or more become a group anchored at `root`.
pub fn scan<D: DocumentTree>(
    doc: &D,
    root: &D::Node,
    profile: &PatternProfile,
) -> Option<ScanNode<D::Node>> {
    let mut results = Vec::new();
    for child in doc.children(root) {
        if let Some(kind) = profile.classify(doc, &child) {
            results.push(ScanNode::leaf(child, kind));
        } else if let Some(found) = scan(doc, &child, profile) {
            results.push(found.reparent(child));
        }
    }

    match results.len() {
        0 => None,
        1 => results.pop().map(|single| single.reparent(root.clone())),
        _ => Some(ScanNode::Group {
            ancestor: root.clone(),
            children: results,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkerKind;
    use document_adapter::{DocumentFixture, InMemoryDocument};

    fn marker(kind: MarkerKind) -> DocumentFixture {
        let profile = PatternProfile::default();
        DocumentFixture::element("path").with_attr("d", profile.signature(kind).unwrap())
    }

    fn icon(kind: MarkerKind) -> DocumentFixture {
        DocumentFixture::element("svg").with_child(marker(kind))
    }

    #[test]
    fn tree_without_markers_scans_to_nothing() {
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("div").with_id("main").with_children([
                DocumentFixture::element("p"),
                DocumentFixture::element("div").with_child(
                    DocumentFixture::element("path").with_attr("d", "M0 0L1 1"),
                ),
            ]),
        );
        let root = PatternProfile::default().scan_root(&*doc);
        assert!(scan(&*doc, &root, &PatternProfile::default()).is_none());
    }

    #[test]
    fn single_chain_collapses_to_leaf_parented_at_root() {
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("div").with_id("main").with_child(
                DocumentFixture::element("div")
                    .with_child(DocumentFixture::element("span").with_child(icon(MarkerKind::Menu))),
            ),
        );
        let profile = PatternProfile::default();
        let root = profile.scan_root(&*doc);
        match scan(&*doc, &root, &profile) {
            Some(ScanNode::Leaf { kind, ancestor, .. }) => {
                assert_eq!(kind, MarkerKind::Menu);
                assert_eq!(ancestor, Some(root));
            }
            other => panic!("expected collapsed leaf, got {other:?}"),
        }
    }

    #[test]
    fn siblings_form_group_with_children_parented_at_their_branch() {
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("div").with_id("main").with_children([
                DocumentFixture::element("section").with_id("a").with_child(icon(MarkerKind::Menu)),
                DocumentFixture::element("section").with_id("b").with_child(icon(MarkerKind::Sparkle)),
            ]),
        );
        let profile = PatternProfile::default();
        let root = profile.scan_root(&*doc);
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        match scan(&*doc, &root, &profile) {
            Some(ScanNode::Group { ancestor, children }) => {
                assert_eq!(ancestor, root);
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].ancestor(), Some(&a));
                assert_eq!(children[1].ancestor(), Some(&b));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn direct_marker_leaves_inside_group_keep_no_ancestor() {
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("div")
                .with_id("main")
                .with_child(DocumentFixture::element("svg").with_children([
                    marker(MarkerKind::Menu),
                    marker(MarkerKind::Sparkle),
                ])),
        );
        let profile = PatternProfile::default();
        let root = profile.scan_root(&*doc);
        match scan(&*doc, &root, &profile) {
            // The svg group is the root's only contribution, so it is lifted.
            Some(ScanNode::Group { ancestor, children }) => {
                assert_eq!(ancestor, root);
                assert!(children.iter().all(|child| child.ancestor().is_none()));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn groups_never_have_fewer_than_two_children() {
        fn check(node: &ScanNode<document_adapter::NodeId>) {
            if let ScanNode::Group { children, .. } = node {
                assert!(children.len() >= 2);
                children.iter().for_each(check);
            }
        }
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("div").with_id("main").with_children([
                DocumentFixture::element("div").with_child(
                    DocumentFixture::element("div")
                        .with_child(icon(MarkerKind::Menu))
                        .with_child(DocumentFixture::element("div").with_child(icon(MarkerKind::Menu))),
                ),
                DocumentFixture::element("div").with_child(DocumentFixture::element("p")),
                DocumentFixture::element("div").with_child(icon(MarkerKind::Sparkle)),
            ]),
        );
        let profile = PatternProfile::default();
        let root = profile.scan_root(&*doc);
        let tree = scan(&*doc, &root, &profile).expect("markers present");
        check(&tree);
    }
}
