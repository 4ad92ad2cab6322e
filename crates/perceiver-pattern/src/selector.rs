use std::fmt::Debug;

use document_adapter::DocumentTree;
use tracing::trace;

use crate::events;
use crate::model::MergedNode;
use crate::policy::PatternProfile;

/// Decision taken over the top level of a merged tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<N> {
    /// First top-level branch holding a composite; its ancestor gets hidden.
    Target(N),
    /// The first qualifying branch tripped the guard; the whole cycle is off.
    Vetoed(N),
    NoMatch,
    /// The tree has no fan-out at the top, so there is no container to act on.
    NotApplicable,
}

/// Picks the region to suppress without touching the document.
///
/// Only the first top-level child containing a composite is considered. If
/// the guard matches inside its ancestor, later children are not examined.
pub fn select<D: DocumentTree>(
    doc: &D,
    tree: &MergedNode<D::Node>,
    profile: &PatternProfile,
) -> Selection<D::Node> {
    let MergedNode::Group { children, .. } = tree else {
        return Selection::NotApplicable;
    };

    for child in children {
        trace!(target: "pattern.selector", ancestor = ?child.ancestor(), "inspecting branch");
        if !child.contains_composite() {
            continue;
        }
        let Some(region) = child.ancestor() else {
            return Selection::NoMatch;
        };
        if profile.guard.matches_within(doc, region) {
            return Selection::Vetoed(region.clone());
        }
        return Selection::Target(region.clone());
    }
    Selection::NoMatch
}

/// Runs [`select`] and hides the chosen region with `display: none`.
///
/// Returns the region that was hidden. A vetoed selection, no match, or a
/// style write the document rejects all leave the document untouched.
pub fn select_and_act<D: DocumentTree>(
    doc: &D,
    tree: &MergedNode<D::Node>,
    profile: &PatternProfile,
) -> Option<D::Node>
where
    D::Node: Debug,
{
    match select(doc, tree, profile) {
        Selection::Target(region) => match doc.set_style(&region, "display", "none") {
            Ok(()) => {
                events::emit_suppressed(&region);
                Some(region)
            }
            Err(err) => {
                events::emit_suppress_failed(&region, &err);
                None
            }
        },
        Selection::Vetoed(region) => {
            events::emit_vetoed(&region);
            None
        }
        Selection::NoMatch | Selection::NotApplicable => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::merge;
    use crate::model::MarkerKind;
    use crate::scanner::scan;
    use document_adapter::{DocumentFixture, InMemoryDocument, NodeId};
    use std::sync::Arc;

    fn icon(kind: MarkerKind) -> DocumentFixture {
        let profile = PatternProfile::default();
        DocumentFixture::element("svg").with_child(
            DocumentFixture::element("path").with_attr("d", profile.signature(kind).unwrap()),
        )
    }

    // Two top-level branches; the second holds a menu/sparkle pair three
    // levels down, which merges into a composite.
    fn page(with_form: bool) -> Arc<InMemoryDocument> {
        let mut overview = DocumentFixture::element("div").with_id("overview").with_child(
            DocumentFixture::element("div").with_child(
                DocumentFixture::element("div").with_children([
                    icon(MarkerKind::Menu),
                    icon(MarkerKind::Sparkle),
                ]),
            ),
        );
        if with_form {
            overview = overview.with_child(
                DocumentFixture::element("form").with_attr("action", "/search"),
            );
        }
        InMemoryDocument::from_fixture(
            &DocumentFixture::element("div").with_id("main").with_children([
                DocumentFixture::element("div")
                    .with_id("results")
                    .with_children([icon(MarkerKind::Menu), icon(MarkerKind::Menu)]),
                overview,
            ]),
        )
    }

    fn merged(doc: &InMemoryDocument, profile: &PatternProfile) -> MergedNode<NodeId> {
        let root = profile.scan_root(doc);
        merge(scan(doc, &root, profile).expect("markers present"))
    }

    #[test]
    fn hides_ancestor_of_first_branch_with_composite() {
        let doc = page(false);
        let profile = PatternProfile::default();
        let tree = merged(&doc, &profile);
        assert!(tree.is_group());

        let overview = doc.element_by_id("overview").unwrap();
        assert_eq!(select_and_act(&*doc, &tree, &profile), Some(overview));
        assert!(doc.is_hidden(overview));
        assert_eq!(doc.styled_nodes(), vec![overview]);
    }

    #[test]
    fn search_form_under_region_vetoes_selection() {
        let doc = page(true);
        let profile = PatternProfile::default();
        let tree = merged(&doc, &profile);

        let overview = doc.element_by_id("overview").unwrap();
        assert_eq!(select(&*doc, &tree, &profile), Selection::Vetoed(overview));
        assert_eq!(select_and_act(&*doc, &tree, &profile), None);
        assert!(doc.styled_nodes().is_empty());
    }

    #[test]
    fn guard_aborts_before_later_branches() {
        let tree = MergedNode::Group {
            ancestor: NodeId(0),
            children: vec![
                MergedNode::Composite {
                    marker: NodeId(10),
                    region: NodeId(1),
                },
                MergedNode::Composite {
                    marker: NodeId(20),
                    region: NodeId(2),
                },
            ],
        };
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("body").with_children([
                DocumentFixture::element("div")
                    .with_child(DocumentFixture::element("form").with_attr("action", "/search")),
                DocumentFixture::element("div"),
            ]),
        );
        let first = doc.children(&doc.body())[0];
        assert_eq!(first, NodeId(1));
        assert_eq!(
            select(&*doc, &tree, &PatternProfile::default()),
            Selection::Vetoed(NodeId(1))
        );
        assert_eq!(select_and_act(&*doc, &tree, &PatternProfile::default()), None);
        assert!(doc.styled_nodes().is_empty());
    }

    #[test]
    fn non_group_tree_is_not_applicable() {
        let doc = InMemoryDocument::new();
        let tree = MergedNode::Composite {
            marker: NodeId(1),
            region: NodeId(0),
        };
        assert_eq!(
            select(&*doc, &tree, &PatternProfile::default()),
            Selection::NotApplicable
        );
    }

    #[test]
    fn group_without_composites_is_no_match() {
        let doc = InMemoryDocument::new();
        let tree = MergedNode::Group {
            ancestor: NodeId(0),
            children: vec![
                MergedNode::Leaf {
                    node: NodeId(1),
                    kind: MarkerKind::Menu,
                    ancestor: Some(NodeId(0)),
                },
                MergedNode::Leaf {
                    node: NodeId(2),
                    kind: MarkerKind::Menu,
                    ancestor: None,
                },
            ],
        };
        assert_eq!(select(&*doc, &tree, &PatternProfile::default()), Selection::NoMatch);
    }

    #[test]
    fn rejected_style_write_is_no_action() {
        let doc = InMemoryDocument::new();
        let tree = MergedNode::Group {
            ancestor: NodeId(0),
            children: vec![
                MergedNode::Composite {
                    marker: NodeId(98),
                    region: NodeId(99),
                },
                MergedNode::Leaf {
                    node: NodeId(1),
                    kind: MarkerKind::Menu,
                    ancestor: None,
                },
            ],
        };
        assert_eq!(select_and_act(&*doc, &tree, &PatternProfile::default()), None);
    }
}
