use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use perceiver_pattern::Convergence;

#[derive(Default)]
struct Counters {
    notices: AtomicU64,
    debounce_restarts: AtomicU64,
    episodes_started: AtomicU64,
    polls: AtomicU64,
    resolved: AtomicU64,
    stable: AtomicU64,
    disabled: AtomicU64,
    controls: AtomicU64,
}

static COUNTERS: Lazy<Counters> = Lazy::new(Counters::default);

fn increment(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub fn record_notice(restarted: bool) {
    increment(&COUNTERS.notices);
    if restarted {
        increment(&COUNTERS.debounce_restarts);
    }
}

pub fn record_episode_started() {
    increment(&COUNTERS.episodes_started);
}

pub fn record_poll() {
    increment(&COUNTERS.polls);
}

pub fn record_finished(outcome: Convergence) {
    match outcome {
        Convergence::Resolved => increment(&COUNTERS.resolved),
        Convergence::Stable => increment(&COUNTERS.stable),
        Convergence::Disabled => increment(&COUNTERS.disabled),
        Convergence::Changed | Convergence::Unresolved => {}
    }
}

pub fn record_control() {
    increment(&COUNTERS.controls);
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SchedulerMetricsSnapshot {
    pub notices: u64,
    pub debounce_restarts: u64,
    pub episodes_started: u64,
    pub polls: u64,
    pub resolved: u64,
    pub stable: u64,
    pub disabled: u64,
    pub controls: u64,
}

pub fn snapshot() -> SchedulerMetricsSnapshot {
    SchedulerMetricsSnapshot {
        notices: COUNTERS.notices.load(Ordering::Relaxed),
        debounce_restarts: COUNTERS.debounce_restarts.load(Ordering::Relaxed),
        episodes_started: COUNTERS.episodes_started.load(Ordering::Relaxed),
        polls: COUNTERS.polls.load(Ordering::Relaxed),
        resolved: COUNTERS.resolved.load(Ordering::Relaxed),
        stable: COUNTERS.stable.load(Ordering::Relaxed),
        disabled: COUNTERS.disabled.load(Ordering::Relaxed),
        controls: COUNTERS.controls.load(Ordering::Relaxed),
    }
}
