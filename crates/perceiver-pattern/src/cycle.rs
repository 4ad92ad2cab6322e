use std::fmt::Debug;
use std::time::Instant;

use document_adapter::DocumentTree;
use serde::Serialize;
use sweeper_core_types::ObserverConfig;

use crate::events;
use crate::merger::merge;
use crate::model::MergedNode;
use crate::overlay::outline_tree;
use crate::policy::PatternProfile;
use crate::scanner::scan;
use crate::selector::select_and_act;

/// What one detection cycle did to the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "region", rename_all = "snake_case")]
pub enum CycleAction<N> {
    /// No group at the top of the merged tree; selection was not attempted.
    NotApplicable,
    /// Suppression is switched off; selection was skipped.
    Disabled,
    NotFound,
    Suppressed(N),
}

impl<N> CycleAction<N> {
    pub fn label(&self) -> &'static str {
        match self {
            CycleAction::NotApplicable => "not_applicable",
            CycleAction::Disabled => "disabled",
            CycleAction::NotFound => "not_found",
            CycleAction::Suppressed(_) => "suppressed",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CycleOutcome<N> {
    pub tree: Option<MergedNode<N>>,
    pub action: CycleAction<N>,
}

impl<N> CycleOutcome<N> {
    pub fn suppressed(&self) -> Option<&N> {
        match &self.action {
            CycleAction::Suppressed(region) => Some(region),
            _ => None,
        }
    }
}

/// Scan, merge, optionally outline, then select against the live document.
pub fn run_cycle<D: DocumentTree>(
    doc: &D,
    profile: &PatternProfile,
    config: &ObserverConfig,
) -> CycleOutcome<D::Node>
where
    D::Node: Debug,
{
    let started = Instant::now();
    let root = profile.scan_root(doc);
    let tree = scan(doc, &root, profile).map(merge);

    let outcome = match tree {
        Some(tree) if tree.is_group() => {
            if config.diagnostics_enabled {
                outline_tree(doc, &tree);
            }
            let action = if config.globally_disabled {
                CycleAction::Disabled
            } else {
                match select_and_act(doc, &tree, profile) {
                    Some(region) => CycleAction::Suppressed(region),
                    None => CycleAction::NotFound,
                }
            };
            CycleOutcome {
                tree: Some(tree),
                action,
            }
        }
        tree => CycleOutcome {
            tree,
            action: CycleAction::NotApplicable,
        },
    };

    events::emit_cycle(
        !matches!(outcome.action, CycleAction::NotApplicable),
        outcome.tree.as_ref().map(MergedNode::shape),
        outcome.action.label(),
        started.elapsed(),
    );
    outcome
}
