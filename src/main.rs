use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;
use kingraph::config::{LayoutStrategy, RenderConfig};
use kingraph::dataset::Dataset;
use kingraph::export::write_output;
use kingraph::fonts::CosmicTextMeasure;
use kingraph::graph::curve::CurveProfile;
use kingraph::graph::style::{DecorationThresholds, NodeVariant, StrokeMapping};
use kingraph::graph::{
    CategoryFilter, ConnectionReveal, EntityId, GraphRenderer, RenderOptions, ViewState,
    filter_view,
};
use kingraph::theme::Theme;
use kingraph::{Error, Result};

/// A pure Rust family-network renderer
#[derive(Parser, Debug)]
#[command(name = "kingraph")]
#[command(version)]
#[command(about = "Render family relationship networks to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Dataset file: .json, .yaml or .toml ("-" reads JSON from stdin).
    /// Omit to render the built-in sample network
    #[arg(value_name = "DATASET")]
    dataset: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Built-in theme name or path to an Alacritty theme file (YAML or TOML)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Render configuration (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Layout strategy: authored, cluster or globe
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<LayoutStrategy>,

    /// Node style: badge, tiered or house
    #[arg(long, default_value = "tiered")]
    variant: NodeVariant,

    /// Show one relationship category: all, blood, marriage, friendship or community
    #[arg(long, default_value = "all")]
    filter: CategoryFilter,

    /// Keep only families whose name or city contains TERM
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Select a family by id, highlighting its relationships
    #[arg(long, value_name = "ID")]
    select: Option<String>,

    /// Draw only the first N connections, as a reveal frame
    #[arg(long, value_name = "N")]
    phase: Option<usize>,

    /// Draw the reveal frame reached after MS milliseconds, using the
    /// [animation] interval and loop settings
    #[arg(long, value_name = "MS", conflicts_with = "phase")]
    reveal_at: Option<u64>,

    /// Draw clickable category markers on connections
    #[arg(long)]
    interactive: bool,

    /// Draw a key for the category colors and the verified/unverified dash
    #[arg(long)]
    legend: bool,

    /// Thinner strokes and uniform curvature
    #[arg(long)]
    classic: bool,

    /// Minimum canvas width in pixels
    #[arg(short, long)]
    width: Option<f64>,

    /// Minimum canvas height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// More log output (-v info, -vv debug); KINGRAPH_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "kingraph", &mut std::io::stdout());
        return Ok(());
    }

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("KINGRAPH_LOG", level))
        .init();

    let output = args
        .output
        .clone()
        .ok_or_else(|| Error::Config("an output path is required".to_string()))?;

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::vivid(),
    };
    if args.classic {
        config.connections.stroke = StrokeMapping::classic();
        config.connections.decorations = DecorationThresholds::classic();
        config.curvature = CurveProfile::classic();
    }
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(layout) = args.layout {
        config.layout.strategy = layout;
    }

    let theme = match &args.theme {
        Some(name) => Theme::resolve(name)?,
        None => Theme::default(),
    };

    let dataset = match &args.dataset {
        Some(path) => Dataset::load(path)?,
        None => {
            log::info!("no dataset given, rendering the built-in sample");
            Dataset::sample()
        }
    };
    let network = dataset.into_network()?;

    let mut view = ViewState::new();
    view.set_filter(args.filter);
    if let Some(term) = &args.search {
        view.set_search(term.as_str());
    }
    if let Some(id) = &args.select {
        let id = EntityId::new(id.as_str());
        if network.entities.contains(&id) {
            view.select(&id);
        } else {
            log::warn!("--select {}: no family with that id", id);
        }
    }

    let layout = config
        .layout
        .provider(&config.canvas, network.authored.as_ref());
    log::info!("layout: {}", config.layout.strategy);

    let visible = match (args.phase, args.reveal_at) {
        (Some(n), _) => Some(n),
        (None, Some(ms)) => {
            let shown = filter_view(&network.entities, &network.relationships, &view);
            let count = ConnectionReveal::visible_at(
                &config.animation,
                shown.relationships.len(),
                Duration::from_millis(ms),
            );
            log::info!(
                "reveal at {}ms: {} of {} connections",
                ms,
                count,
                shown.relationships.len()
            );
            Some(count)
        }
        (None, None) => None,
    };

    let mut renderer = GraphRenderer::new(theme, config, CosmicTextMeasure::new())
        .with_options(RenderOptions {
            variant: args.variant,
            interactive: args.interactive,
            legend: args.legend,
        });
    let rendered = renderer.render(
        &network.entities,
        &network.relationships,
        layout.as_ref(),
        &view,
        visible,
    );
    for id in &rendered.skipped {
        log::warn!("connection {} not drawn: an endpoint has no position", id);
    }

    let format = write_output(&rendered.svg, &output, args.png_scale)?;
    eprintln!("{} saved to: {}", format.label(), output.display());

    Ok(())
}
