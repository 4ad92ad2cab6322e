//! Process-wide counters for detection cycles.
//!
//! Plain atomics so the CLI and the control server can report them without an
//! external metrics backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static CYCLE_TOTAL: AtomicU64 = AtomicU64::new(0);
static CYCLE_LAT_NS: AtomicU64 = AtomicU64::new(0);
static CYCLE_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);
static CYCLE_NOT_APPLICABLE: AtomicU64 = AtomicU64::new(0);

static REGION_SUPPRESSED: AtomicU64 = AtomicU64::new(0);
static REGION_VETOED: AtomicU64 = AtomicU64::new(0);
static REGION_FAILED: AtomicU64 = AtomicU64::new(0);

static OUTLINE_TOTAL: AtomicU64 = AtomicU64::new(0);

static COMPARE_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMPARE_CHANGED: AtomicU64 = AtomicU64::new(0);
static COMPARE_LAT_NS: AtomicU64 = AtomicU64::new(0);
static COMPARE_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);

static CONVERGED_STABLE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricCounter {
    pub total: u64,
    pub avg_ms: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegionMetric {
    pub suppressed: u64,
    pub vetoed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub cycle: MetricCounter,
    pub not_applicable: u64,
    pub region: RegionMetric,
    pub outlines: u64,
    pub compare: MetricCounter,
    pub compare_changed: u64,
    pub stable: u64,
}

pub fn record_cycle(applicable: bool, duration: Duration) {
    CYCLE_TOTAL.fetch_add(1, Ordering::Relaxed);
    if !applicable {
        CYCLE_NOT_APPLICABLE.fetch_add(1, Ordering::Relaxed);
    }
    record_latency(&CYCLE_LAT_NS, &CYCLE_LAT_SAMPLES, duration);
}

pub fn record_suppressed() {
    REGION_SUPPRESSED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_vetoed() {
    REGION_VETOED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_suppress_failed() {
    REGION_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_outlines(count: usize) {
    OUTLINE_TOTAL.fetch_add(count as u64, Ordering::Relaxed);
}

pub fn record_compare(equal: bool, duration: Duration) {
    COMPARE_TOTAL.fetch_add(1, Ordering::Relaxed);
    if !equal {
        COMPARE_CHANGED.fetch_add(1, Ordering::Relaxed);
    }
    record_latency(&COMPARE_LAT_NS, &COMPARE_LAT_SAMPLES, duration);
}

pub fn record_stable() {
    CONVERGED_STABLE.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    MetricSnapshot {
        cycle: make_counter(
            CYCLE_TOTAL.load(Ordering::Relaxed),
            CYCLE_LAT_NS.load(Ordering::Relaxed),
            CYCLE_LAT_SAMPLES.load(Ordering::Relaxed),
        ),
        not_applicable: CYCLE_NOT_APPLICABLE.load(Ordering::Relaxed),
        region: RegionMetric {
            suppressed: REGION_SUPPRESSED.load(Ordering::Relaxed),
            vetoed: REGION_VETOED.load(Ordering::Relaxed),
            failed: REGION_FAILED.load(Ordering::Relaxed),
        },
        outlines: OUTLINE_TOTAL.load(Ordering::Relaxed),
        compare: make_counter(
            COMPARE_TOTAL.load(Ordering::Relaxed),
            COMPARE_LAT_NS.load(Ordering::Relaxed),
            COMPARE_LAT_SAMPLES.load(Ordering::Relaxed),
        ),
        compare_changed: COMPARE_CHANGED.load(Ordering::Relaxed),
        stable: CONVERGED_STABLE.load(Ordering::Relaxed),
    }
}

fn make_counter(total: u64, nanos: u64, samples: u64) -> MetricCounter {
    let avg_ms = if samples == 0 {
        0.0
    } else {
        (nanos as f64 / samples as f64) / 1_000_000.0
    };
    MetricCounter { total, avg_ms }
}

fn record_latency(total_ns: &AtomicU64, samples: &AtomicU64, duration: Duration) {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    total_ns.fetch_add(nanos, Ordering::Relaxed);
    samples.fetch_add(1, Ordering::Relaxed);
}
