//! Diagnostics overlay: outlines what a cycle found so it can be inspected in
//! the page. Purely decorative; detection never reads these styles back.

use std::fmt::Debug;

use document_adapter::DocumentTree;
use tracing::debug;

use crate::events;
use crate::model::{MarkerKind, MergedNode};

const MENU_OUTLINE: &str = "1px solid #00ff00";
const SPARKLE_OUTLINE: &str = "1px solid #ff00ff";
const GROUP_OUTLINE: &str = "1px solid #0000ff";
const OUTLINE_OFFSET: &str = "2px";

/// Draws the overlay for `tree` and returns how many outlines were applied.
pub fn outline_tree<D: DocumentTree>(doc: &D, tree: &MergedNode<D::Node>) -> usize
where
    D::Node: Debug,
{
    let mut painter = Painter { doc, outlined: 0 };
    painter.visit(tree);
    events::emit_overlay(painter.outlined);
    painter.outlined
}

struct Painter<'a, D: DocumentTree> {
    doc: &'a D,
    outlined: usize,
}

impl<D: DocumentTree> Painter<'_, D>
where
    D::Node: Debug,
{
    fn visit(&mut self, tree: &MergedNode<D::Node>) {
        match tree {
            MergedNode::Leaf { node, kind, .. } => {
                let color = match kind {
                    MarkerKind::Menu => MENU_OUTLINE,
                    MarkerKind::Sparkle => SPARKLE_OUTLINE,
                };
                if let Some(parent) = self.doc.parent(node) {
                    self.outline(&parent, color);
                }
                self.write(node, "outline-offset", OUTLINE_OFFSET);
            }
            MergedNode::Composite { marker, .. } => {
                self.write(marker, "outline-offset", OUTLINE_OFFSET);
            }
            MergedNode::Group { ancestor, children } => {
                for child in self.doc.children(ancestor) {
                    self.outline(&child, GROUP_OUTLINE);
                    self.write(&child, "outline-offset", OUTLINE_OFFSET);
                }
                for child in children {
                    self.visit(child);
                }
            }
        }
    }

    fn outline(&mut self, node: &D::Node, color: &str) {
        if self.write(node, "outline", color) {
            self.outlined += 1;
        }
    }

    fn write(&self, node: &D::Node, property: &str, value: &str) -> bool {
        match self.doc.set_style(node, property, value) {
            Ok(()) => true,
            Err(err) => {
                debug!(target: "pattern.overlay", ?node, property, error = %err, "outline skipped");
                false
            }
        }
    }
}
