#![warn(non_snake_case)]
//! # rust_maze Main Entry Point
//!
//! Generates a maze into the in-memory scene document and prints a summary. The pass
//! runs on the cooperative scheduler, exactly as it would inside a host frame loop,
//! driven to completion by a local executor.
//!
//! ## License
//! Licensed under the MIT License.

use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use futures::executor::block_on;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use rust_maze::document::Document;
use rust_maze::scene::{SceneGroup, SceneHost};
use rust_maze::schedule::{CancellationToken, Cooperative};
use rust_maze::{GenerationReport, MazeConfig, MazeGenerator};

#[derive(Parser, Debug)]
#[command(name = "rust_maze", version, about = "Generate a procedural 3D maze layout")]
struct Args {
    /// JSON configuration file; missing fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cells along x (overrides the configuration).
    #[arg(long)]
    width: Option<usize>,

    /// Cells along z (overrides the configuration).
    #[arg(long)]
    depth: Option<usize>,

    /// Seed for a reproducible maze.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Place the reflection probe grid.
    #[arg(long)]
    probes: bool,

    /// Print the carved grid.
    #[arg(long)]
    ascii: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    report: GenerationReport,
    groups: BTreeMap<&'static str, usize>,
}

fn load_config(args: &Args) -> Result<MazeConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => MazeConfig::load(path)?,
        None => MazeConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if args.probes {
        config.reflection_probes.enabled = true;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!("rust_maze starting with seed {}", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut generator = MazeGenerator::new(config, Document::new());
    let report = block_on(generator.generate(&mut rng, &Cooperative, &CancellationToken::new()))?;

    let doc = generator.host();
    let groups: BTreeMap<&'static str, usize> = SceneGroup::all()
        .iter()
        .filter_map(|group| {
            let path = format!("{}/{}", SceneGroup::ROOT_NAME, group.name());
            doc.find_by_path(&path).map(|h| (group.name(), doc.children(h).len()))
        })
        .collect();

    if args.ascii {
        if let Some(grid) = generator.grid() {
            print!("{}", grid.render_ascii());
        }
    }

    let summary = Summary { seed, report, groups };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("seed:              {}", summary.seed);
        println!("size:              {}x{}", report.width, report.depth);
        println!(
            "maze:              {} open / {} wall cells, {} components, perfect: {}",
            report.maze.open_cells,
            report.maze.wall_cells,
            report.maze.components,
            report.maze.is_perfect()
        );
        println!("generated objects: {}", report.generated_objects);
        for (name, count) in &summary.groups {
            println!("  {:<18} {}", name, count);
        }
    }

    info!("rust_maze exiting.");
    Ok(())
}
