use std::fmt::Debug;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::metrics;
use crate::model::TreeShape;

pub fn emit_cycle(applicable: bool, shape: Option<TreeShape>, action: &str, duration: Duration) {
    metrics::record_cycle(applicable, duration);
    let shape = shape.unwrap_or_default();
    debug!(
        target: "pattern.events",
        groups = shape.groups,
        leaves = shape.leaves,
        composites = shape.composites,
        depth = shape.depth,
        action,
        elapsed_us = duration.as_micros() as u64,
        "pattern.cycle.completed"
    );
}

pub fn emit_suppressed<N: Debug>(region: &N) {
    metrics::record_suppressed();
    info!(target: "pattern.events", ?region, "pattern.region.suppressed");
}

pub fn emit_vetoed<N: Debug>(region: &N) {
    metrics::record_vetoed();
    debug!(target: "pattern.events", ?region, "pattern.region.vetoed");
}

pub fn emit_suppress_failed<N: Debug>(region: &N, error: &dyn std::fmt::Display) {
    metrics::record_suppress_failed();
    warn!(
        target: "pattern.events",
        ?region,
        error = %error,
        "pattern.region.suppress_failed"
    );
}

pub fn emit_overlay(outlined: usize) {
    metrics::record_outlines(outlined);
    debug!(target: "pattern.events", outlined, "pattern.overlay.drawn");
}

pub fn emit_compare(equal: bool, duration: Duration) {
    metrics::record_compare(equal, duration);
}

pub fn emit_convergence(outcome: &str, stable_for: Option<Duration>) {
    if outcome == "stable" {
        metrics::record_stable();
    }
    debug!(
        target: "pattern.events",
        outcome,
        stable_for_ms = stable_for.map(|d| d.as_millis() as u64),
        "pattern.convergence.checked"
    );
}
