use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use document_adapter::{DocumentFixture, DocumentTree, InMemoryDocument, NodeId};
use perceiver_pattern::{run_cycle, CycleAction, TreeShape};
use serde::Serialize;
use sweeper_core_types::ObserverConfig;
use tracing::info;

use super::output::{emit, OutputFormat};
use crate::config::SweeperConfig;

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// Document fixture (JSON element tree)
    #[arg(value_name = "FIXTURE")]
    pub fixture: PathBuf,

    /// Container element id, overriding the configuration
    #[arg(long)]
    pub container: Option<String>,

    /// Report what would be suppressed without hiding anything
    #[arg(long)]
    pub disabled: bool,

    /// Draw the diagnostics overlay
    #[arg(long)]
    pub highlight: bool,
}

#[derive(Debug, Serialize)]
pub struct ElementRef {
    pub node: u64,
    pub tag: String,
    pub id: Option<String>,
}

impl ElementRef {
    pub fn describe(doc: &InMemoryDocument, node: NodeId) -> Self {
        Self {
            node: node.0,
            tag: doc.tag_name(&node).unwrap_or_default(),
            id: doc.attribute(&node, "id"),
        }
    }

    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{}#{}", self.tag, id),
            None => format!("{} ({})", self.tag, NodeId(self.node)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub fixture: PathBuf,
    pub container: String,
    pub container_found: bool,
    pub action: &'static str,
    pub region: Option<ElementRef>,
    pub shape: Option<TreeShape>,
    pub styled_nodes: usize,
}

pub async fn cmd_scan(args: ScanArgs, config: &SweeperConfig, format: OutputFormat) -> Result<()> {
    let fixture = DocumentFixture::load(&args.fixture)
        .with_context(|| format!("Failed to load fixture {}", args.fixture.display()))?;
    let doc = InMemoryDocument::from_fixture(&fixture);

    let mut profile = config.profile();
    if let Some(container) = args.container {
        profile = profile.with_container(container);
    }
    let observer_config = ObserverConfig::default()
        .with_diagnostics(args.highlight)
        .with_disabled(args.disabled);

    let outcome = run_cycle(&*doc, &profile, &observer_config);
    let region = match &outcome.action {
        CycleAction::Suppressed(region) => Some(ElementRef::describe(&doc, *region)),
        _ => None,
    };
    info!(action = outcome.action.label(), "scan finished");

    let report = ScanReport {
        fixture: args.fixture,
        container_found: doc.element_by_id(&profile.container_id).is_some(),
        container: profile.container_id,
        action: outcome.action.label(),
        region,
        shape: outcome.tree.as_ref().map(|tree| tree.shape()),
        styled_nodes: doc.styled_nodes().len(),
    };
    emit(format, &report, print_human)
}

fn print_human(report: &ScanReport) {
    println!("Fixture: {}", report.fixture.display());
    if report.container_found {
        println!("Container: #{}", report.container);
    } else {
        println!("Container: #{} (missing, scanned body)", report.container);
    }
    match &report.shape {
        Some(shape) => println!(
            "Tree: {} groups, {} leaves, {} composites, depth {}",
            shape.groups, shape.leaves, shape.composites, shape.depth
        ),
        None => println!("Tree: no markers"),
    }
    println!("Action: {}", report.action);
    if let Some(region) = &report.region {
        println!("Suppressed: {}", region.label());
    }
}
