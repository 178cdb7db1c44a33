mod app;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use corr_graph::dataset::load_dataset;
use corr_graph::{Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset JSON: a nodes/links graph or an analysis response keyed by symbol; `-` reads stdin
    input: PathBuf,

    /// Symbol to show when the dataset holds several graphs
    #[arg(long)]
    symbol: Option<String>,

    /// Seed for initial node placement
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 960.0)]
    width: f64,

    #[arg(long, default_value_t = 640.0)]
    height: f64,

    #[arg(long, default_value_t = 50.0)]
    link_distance: f64,

    /// Many-body strength; negative repels
    #[arg(long, default_value_t = -200.0, allow_negative_numbers = true)]
    charge: f64,

    /// Barnes-Hut opening angle; 0 computes every pair exactly
    #[arg(long, default_value_t = 0.0)]
    theta: f64,

    /// Run this many steps without a window and print the final positions as JSON
    #[arg(long, value_name = "STEPS")]
    headless: Option<u32>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            link_distance: self.link_distance,
            charge: self.charge,
            theta: self.theta.max(0.0),
            seed: self.seed,
            ..SimulationConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.simulation_config();
    tracing::debug!(?config, "simulation config");

    if let Some(steps) = args.headless {
        return run_headless(&args, config, steps);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let settings = app::ViewerSettings {
        input: args.input.clone(),
        symbol: args.symbol.clone(),
        config,
        width: args.width,
        height: args.height,
    };
    eframe::run_native(
        "corr-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CorrGraphApp::new(cc, settings)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn run_headless(args: &Args, config: SimulationConfig, steps: u32) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    let graph = dataset.graph(args.symbol.as_deref())?;
    let mut simulation = Simulation::build(
        config,
        graph.nodes.iter().cloned(),
        graph.links.iter().cloned(),
        args.width,
        args.height,
    )
    .context("dataset rejected by the layout engine")?;

    let mut tick = simulation.snapshot();
    for _ in 0..steps {
        tick = simulation.step();
    }
    tracing::info!(
        steps,
        alpha = tick.alpha,
        settled = simulation.is_settled(),
        "headless layout finished"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &tick).context("failed to write layout")?;
    writeln!(out).context("failed to write layout")?;
    Ok(())
}
