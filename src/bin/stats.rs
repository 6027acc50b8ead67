use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use kingraph::config::{LayoutStrategy, RenderConfig};
use kingraph::dataset::Dataset;
use kingraph::graph::{
    Entity, NetworkStats, Relationship, RelationshipId, RenderOptions, Scene, TrustTier, ViewState,
};
use kingraph::{Error, Result};
use serde::Serialize;

/// Summary statistics for a family network
#[derive(Parser, Debug)]
#[command(name = "kingraph-stats")]
#[command(version)]
#[command(about = "Print family-network statistics as JSON", long_about = None)]
struct Args {
    /// Dataset file: .json, .yaml or .toml ("-" reads JSON from stdin).
    /// Omit for the built-in sample network
    #[arg(value_name = "DATASET")]
    dataset: Option<PathBuf>,

    /// Render configuration (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Layout used to decide which connections can be drawn
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<LayoutStrategy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    #[serde(flatten)]
    stats: NetworkStats,
    layout: LayoutStrategy,
    placed_families: usize,
    families_by_tier: BTreeMap<&'static str, usize>,
    connections_by_category: BTreeMap<&'static str, usize>,
    skipped_connections: &'a [RelationshipId],
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(layout) = args.layout {
        config.layout.strategy = layout;
    }

    let dataset = match &args.dataset {
        Some(path) => Dataset::load(path)?,
        None => Dataset::sample(),
    };
    let network = dataset.into_network()?;

    let coords = config
        .layout
        .provider(&config.canvas, network.authored.as_ref())
        .layout(&network.entities);
    let entities: Vec<&Entity> = network.entities.iter().collect();
    let relationships: Vec<&Relationship> = network.relationships.iter().collect();
    let scene = Scene::build(
        &entities,
        &relationships,
        &coords,
        &ViewState::new(),
        &config,
        RenderOptions::default(),
    );

    let mut families_by_tier = BTreeMap::new();
    for entity in &entities {
        *families_by_tier
            .entry(TrustTier::from_score(entity.trust_score).as_str())
            .or_insert(0) += 1;
    }
    let mut connections_by_category = BTreeMap::new();
    for rel in &relationships {
        *connections_by_category.entry(rel.category.as_str()).or_insert(0) += 1;
    }

    let report = Report {
        stats: NetworkStats::compute(&network.entities, &network.relationships),
        layout: config.layout.strategy,
        placed_families: scene.nodes.len(),
        families_by_tier,
        connections_by_category,
        skipped_connections: &scene.skipped,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::Export(format!("Failed to serialize report: {}", e)))?;
    println!("{}", json);

    Ok(())
}
