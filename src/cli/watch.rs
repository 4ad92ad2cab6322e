use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use document_adapter::{DocumentFixture, DocumentTree, InMemoryDocument, NodeId};
use perceiver_pattern::Convergence;
use serde::Serialize;
use sweeper_event_bus::{EventBus, InMemoryBus};
use sweeper_scheduler::{Observer, ObserverEvent, SchedulerPhase};
use sweeper_state_center::{InMemorySettingsStore, JsonFileSettingsStore, SettingsStore};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::output::{emit, OutputFormat};
use super::scan::ElementRef;
use crate::config::SweeperConfig;
use crate::errors::SweeperError;
use crate::server;

const EVENT_CAPACITY: usize = 256;

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    /// Fixture frames (JSON array). The first frame seeds the document; the
    /// children of every later frame replace the container's children.
    #[arg(value_name = "FRAMES")]
    pub frames: PathBuf,

    /// Delay between applying consecutive frames
    #[arg(long, default_value_t = 200)]
    pub frame_delay_ms: u64,

    /// Keep running with the control surface until interrupted
    #[arg(long)]
    pub serve: bool,

    /// Keep toggles in memory instead of the settings file
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Serialize)]
pub struct WatchReport {
    pub frames: usize,
    pub episodes: u64,
    pub last_outcome: Option<Convergence>,
    pub suppressed: Vec<ElementRef>,
    pub diagnostics_enabled: bool,
    pub globally_disabled: bool,
}

pub async fn cmd_watch(args: WatchArgs, config: &SweeperConfig, format: OutputFormat) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.frames)
        .await
        .with_context(|| format!("Failed to read frames {}", args.frames.display()))?;
    let frames = DocumentFixture::sequence_from_json(&raw).map_err(SweeperError::from)?;
    let Some((first, rest)) = frames.split_first() else {
        return Err(SweeperError::EmptyFrames { path: args.frames }.into());
    };

    let doc = InMemoryDocument::from_fixture(first);
    let settings = settings_store(config, args.ephemeral);
    let bus: Arc<InMemoryBus<ObserverEvent<NodeId>>> = InMemoryBus::new(EVENT_CAPACITY);
    let mut events = bus.subscribe();
    let options = config.observer_options();
    let debounce = options.timings.debounce;
    let observer = Observer::spawn(Arc::clone(&doc), settings, bus, options);

    let server_shutdown = CancellationToken::new();
    let server_task = if config.control_port != 0 {
        let handle = observer.clone();
        let port = config.control_port;
        let token = server_shutdown.clone();
        Some(tokio::spawn(async move { server::serve(handle, port, token).await }))
    } else {
        None
    };

    observer.ready().await?;
    if rest.is_empty() {
        warn!("only one frame given; nothing will mutate the container");
    }
    for (index, frame) in rest.iter().enumerate() {
        sleep(Duration::from_millis(args.frame_delay_ms)).await;
        let container = doc
            .element_by_id(&config.container_id)
            .unwrap_or_else(|| doc.body());
        doc.replace_children(container, &frame.children)
            .map_err(SweeperError::from)?;
        info!(frame = index + 1, "frame applied");
    }

    sleep(debounce).await;
    let mut phase = observer.phase_watch();
    tokio::select! {
        settled = phase.wait_for(|phase| *phase == SchedulerPhase::Idle) => {
            settled.context("observer stopped before settling")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted before the document settled");
        }
    }

    let status = observer.status().await?;
    let suppressed = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            ObserverEvent::RegionSuppressed { region, .. } => {
                Some(ElementRef::describe(&doc, region))
            }
            _ => None,
        })
        .collect();
    let report = WatchReport {
        frames: frames.len(),
        episodes: status.episodes,
        last_outcome: status.last_outcome,
        suppressed,
        diagnostics_enabled: status.diagnostics_enabled,
        globally_disabled: status.globally_disabled,
    };
    emit(format, &report, print_human)?;

    if args.serve && server_task.is_some() {
        info!(port = config.control_port, "serving control surface, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    }

    server_shutdown.cancel();
    if let Some(task) = server_task {
        task.await.context("control server task panicked")??;
    }
    observer.shutdown().await;
    Ok(())
}

fn settings_store(config: &SweeperConfig, ephemeral: bool) -> Arc<dyn SettingsStore> {
    match config.resolved_settings_path() {
        Some(path) if !ephemeral => {
            info!(path = %path.display(), "persisting toggles");
            JsonFileSettingsStore::new(path) as Arc<dyn SettingsStore>
        }
        _ => InMemorySettingsStore::new(),
    }
}

fn drain(events: &mut broadcast::Receiver<ObserverEvent<NodeId>>) -> Vec<ObserverEvent<NodeId>> {
    let mut out = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "observer events dropped before summary");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    out
}

fn print_human(report: &WatchReport) {
    println!("Frames applied: {}", report.frames);
    println!("Polling episodes: {}", report.episodes);
    match report.last_outcome {
        Some(outcome) => println!("Last outcome: {}", outcome.label()),
        None => println!("Last outcome: none"),
    }
    if report.suppressed.is_empty() {
        println!("Suppressed: nothing");
    } else {
        for region in &report.suppressed {
            println!("Suppressed: {}", region.label());
        }
    }
    println!(
        "Toggles: diagnostics={} disabled={}",
        report.diagnostics_enabled, report.globally_disabled
    );
}
