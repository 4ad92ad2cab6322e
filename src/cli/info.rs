use anyhow::Result;
use serde::Serialize;

use super::output::{emit, OutputFormat};
use super::runtime::LoadedConfig;
use crate::config::SweeperConfig;

#[derive(Debug, Serialize)]
struct BuildInfo {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
}

#[derive(Debug, Serialize)]
struct InfoReport {
    build: BuildInfo,
    config_path: Option<String>,
    settings_path: Option<String>,
    config: SweeperConfig,
    perceiver: perceiver_pattern::metrics::MetricSnapshot,
    scheduler: sweeper_scheduler::metrics::SchedulerMetricsSnapshot,
}

pub async fn cmd_info(loaded: &LoadedConfig, format: OutputFormat) -> Result<()> {
    let report = InfoReport {
        build: BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            build_date: option_env!("SWEEPER_BUILD_DATE").unwrap_or("unknown"),
            git_hash: option_env!("SWEEPER_GIT_HASH").unwrap_or("unknown"),
        },
        config_path: loaded.path.as_ref().map(|path| path.display().to_string()),
        settings_path: loaded
            .config
            .resolved_settings_path()
            .map(|path| path.display().to_string()),
        config: loaded.config.clone(),
        perceiver: perceiver_pattern::metrics::snapshot(),
        scheduler: sweeper_scheduler::metrics::snapshot(),
    };
    emit(format, &report, print_human)
}

fn print_human(report: &InfoReport) {
    println!("Sweeper System Information");
    println!("==========================");
    println!("Version: {}", report.build.version);
    println!("Build Date: {}", report.build.build_date);
    println!("Git Commit: {}", report.build.git_hash);
    println!();

    let config = &report.config;
    println!("Configuration:");
    println!(
        "- Source: {}",
        report.config_path.as_deref().unwrap_or("(defaults and environment)")
    );
    println!("- Container: #{}", config.container_id);
    println!("- Debounce: {}ms", config.debounce_ms);
    println!("- Poll Interval: {}ms", config.poll_interval_ms);
    println!("- Stability Window: {}ms", config.stability_window_ms);
    println!(
        "- Settings File: {}",
        report.settings_path.as_deref().unwrap_or("(in memory)")
    );
    if config.control_port == 0 {
        println!("- Control Server: disabled");
    } else {
        println!("- Control Server: 127.0.0.1:{}", config.control_port);
    }
    println!();

    // Per-process counters.
    let perceiver = &report.perceiver;
    println!("Perceiver:");
    println!("- Cycles: {}", perceiver.cycle.total);
    println!("- Regions suppressed: {}", perceiver.region.suppressed);
    println!("- Regions vetoed: {}", perceiver.region.vetoed);
    let scheduler = &report.scheduler;
    println!("Scheduler:");
    println!("- Episodes started: {}", scheduler.episodes_started);
    println!("- Polls: {}", scheduler.polls);
}
