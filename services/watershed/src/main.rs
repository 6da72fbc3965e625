//! Watershed command-line tool.
//!
//! Runs a single flow path, upstream area, raster query or point query and
//! prints the JSON result to stdout. Logs go to stderr.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flow_analysis::ValueRange;
use hydro_common::MapPoint;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use watershed::response::{flow_path_feature, raster_query_feature, upstream_area_feature};
use watershed::{
    compute_flow_path, compute_upstream_area, query_points, query_raster, PointQuery,
    WatershedConfig, WatershedState,
};

#[derive(Parser, Debug)]
#[command(name = "watershed")]
#[command(about = "Flow paths, upstream areas and raster queries over D8 flow grids")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "watershed.yaml", env = "WATERSHED_CONFIG")]
    config: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trace the downhill flow path from a point
    FlowPath {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Delineate the area draining to an outlet
    UpstreamArea {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Snap search half-width in map units (default from config)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Also write the upstream cell mask as an ASCII grid
        #[arg(long)]
        mask_out: Option<PathBuf>,
    },

    /// Outline the cells of a layer within a value range
    QueryRaster {
        /// Layer name from the `layers.query` table
        #[arg(long)]
        layer: String,

        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,
    },

    /// Sample a raster or mosaic layer at a batch of points
    QueryPoints {
        /// Layer name from `layers.query` or `layers.mosaics`
        #[arg(long)]
        layer: String,

        /// JSON array of `{"id": ..., "x": ..., "y": ...}` objects
        #[arg(long)]
        points: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let config = WatershedConfig::load(&args.config)?;
    info!(config = %args.config.display(), data_dir = %config.data_dir.display(), "Loaded configuration");

    let units = config.units;
    let state = WatershedState::from_config(config).context("Failed to open watershed data")?;

    let output = match args.command {
        Command::FlowPath { x, y } => {
            let result = compute_flow_path(&state, MapPoint::new(x, y))?;
            serde_json::to_value(flow_path_feature(&result, &units))?
        }
        Command::UpstreamArea {
            x,
            y,
            tolerance,
            mask_out,
        } => {
            let result = compute_upstream_area(&state, MapPoint::new(x, y), tolerance)?;
            if let Some(path) = mask_out {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create mask file: {}", path.display()))?;
                raster_store::write_mask(&result.mask, &result.metadata, BufWriter::new(file))?;
                info!(path = %path.display(), "Wrote upstream mask");
            }
            serde_json::to_value(upstream_area_feature(&result, &units))?
        }
        Command::QueryRaster { layer, min, max } => {
            let range = ValueRange::new(min, max)?;
            let result = query_raster(&state, &layer, range)?;
            serde_json::to_value(raster_query_feature(&result, &units))?
        }
        Command::QueryPoints { layer, points } => {
            let text = fs::read_to_string(&points)
                .with_context(|| format!("Failed to read points file: {}", points.display()))?;
            let points: Vec<PointQuery> = serde_json::from_str(&text)
                .with_context(|| format!("Invalid points file: {}", points.display()))?;
            serde_json::to_value(query_points(&state, &layer, &points)?)?
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    let stats = state.cache_stats();
    info!(loads = stats.loads, hits = stats.hits, "Done");
    Ok(())
}
