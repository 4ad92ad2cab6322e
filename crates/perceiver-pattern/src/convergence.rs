use std::fmt::Debug;
use std::time::Duration;

use document_adapter::DocumentTree;
use serde::Serialize;
use sweeper_core_types::ObserverConfig;
use tokio::time::Instant;

use crate::cycle::{run_cycle, CycleAction, CycleOutcome};
use crate::differ::same_tree;
use crate::events;
use crate::model::MergedNode;
use crate::policy::PatternProfile;

/// Verdict of one convergence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    /// A region was suppressed in this or an earlier cycle of the episode.
    Resolved,
    /// Suppression is switched off while a candidate tree exists.
    Disabled,
    Changed,
    /// The tree has not changed for longer than the stability window.
    Stable,
    Unresolved,
}

impl Convergence {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Convergence::Resolved | Convergence::Disabled | Convergence::Stable
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Convergence::Resolved => "resolved",
            Convergence::Disabled => "disabled",
            Convergence::Changed => "changed",
            Convergence::Stable => "stable",
            Convergence::Unresolved => "unresolved",
        }
    }
}

/// Last merged tree and the instant it was first seen in this form.
#[derive(Clone, Debug)]
pub struct StabilitySnapshot<N> {
    pub tree: Option<MergedNode<N>>,
    pub since: Instant,
}

/// Repeats detection cycles and decides when an episode is over.
#[derive(Debug)]
pub struct ConvergenceDetector<N> {
    window: Duration,
    snapshot: Option<StabilitySnapshot<N>>,
    acted: Option<N>,
}

impl<N: Clone + PartialEq> ConvergenceDetector<N> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            snapshot: None,
            acted: None,
        }
    }

    /// Region suppressed during the current episode, if any.
    pub fn acted(&self) -> Option<&N> {
        self.acted.as_ref()
    }

    pub fn snapshot(&self) -> Option<&StabilitySnapshot<N>> {
        self.snapshot.as_ref()
    }

    /// Forgets the snapshot and any earlier action; called when a new episode
    /// starts.
    pub fn reset(&mut self) {
        self.snapshot = None;
        self.acted = None;
    }

    /// Runs one cycle unless the episode already acted, then classifies it.
    pub fn check<D>(
        &mut self,
        doc: &D,
        profile: &PatternProfile,
        config: &ObserverConfig,
        now: Instant,
    ) -> (Convergence, Option<CycleOutcome<N>>)
    where
        D: DocumentTree<Node = N>,
        N: Debug,
    {
        if self.acted.is_some() {
            return (Convergence::Resolved, None);
        }
        let outcome = run_cycle(doc, profile, config);
        let status = self.observe(&outcome, now);
        (status, Some(outcome))
    }

    /// Folds a cycle outcome observed at `now` into the detector state.
    pub fn observe(&mut self, outcome: &CycleOutcome<N>, now: Instant) -> Convergence {
        let status = self.classify(outcome, now);
        let stable_for = self
            .snapshot
            .as_ref()
            .map(|snapshot| now.saturating_duration_since(snapshot.since));
        events::emit_convergence(status.label(), stable_for);
        status
    }

    fn classify(&mut self, outcome: &CycleOutcome<N>, now: Instant) -> Convergence {
        if self.acted.is_some() {
            return Convergence::Resolved;
        }
        match &outcome.action {
            CycleAction::Suppressed(region) => {
                self.acted = Some(region.clone());
                return Convergence::Resolved;
            }
            CycleAction::Disabled => return Convergence::Disabled,
            CycleAction::NotApplicable | CycleAction::NotFound => {}
        }

        match &self.snapshot {
            Some(snapshot) if same_tree(snapshot.tree.as_ref(), outcome.tree.as_ref()) => {
                if now.saturating_duration_since(snapshot.since) > self.window {
                    Convergence::Stable
                } else {
                    Convergence::Unresolved
                }
            }
            _ => {
                self.snapshot = Some(StabilitySnapshot {
                    tree: outcome.tree.clone(),
                    since: now,
                });
                Convergence::Changed
            }
        }
    }
}
