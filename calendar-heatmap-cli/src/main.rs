//! calendar-heatmap - render a drill-down calendar heatmap
//!
//! Reads a JSON dataset of day records, mounts the heatmap at its initial
//! level, lets the entrance transition finish and writes the result as SVG
//! or as a standalone HTML page.

use anyhow::{Context, Result};
use calendar_heatmap_core::{
    logging, parse_dataset, CalendarHeatmap, Config, HeatmapOptions, Overview, Rgb,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Svg,
    Html,
}

#[derive(Parser)]
#[command(name = "calendar-heatmap")]
#[command(about = "Render a drill-down calendar heatmap from time-tracking data")]
#[command(version)]
struct Args {
    /// JSON file with an array of day records
    #[arg(short, long)]
    data: PathBuf,

    /// Accent color as #rgb or #rrggbb (overrides config)
    #[arg(short, long)]
    color: Option<String>,

    /// Level to show first: global, year, month, week or day (overrides config)
    #[arg(long)]
    overview: Option<String>,

    /// Container width in pixels (overrides config)
    #[arg(short, long)]
    width: Option<f64>,

    /// Date the year, month and week levels anchor on (YYYY-MM-DD, default today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "svg")]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for the entrance jitter
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard = logging::init(&config.logging).context("failed to initialize logging")?;

    let json = std::fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read dataset {}", args.data.display()))?;
    let data = parse_dataset(&json).context("failed to parse dataset")?;
    tracing::info!(path = %args.data.display(), records = data.len(), "Loaded dataset");
    if data.is_empty() {
        tracing::warn!(path = %args.data.display(), "Dataset has no records");
    }

    let color: Rgb = match &args.color {
        Some(color) => color.parse()?,
        None => config.heatmap.color()?,
    };
    let overview: Overview = match &args.overview {
        Some(overview) => overview.parse()?,
        None => config.heatmap.overview()?,
    };
    let container_width = args.width.unwrap_or(config.heatmap.width);
    if container_width <= 0.0 {
        anyhow::bail!("width must be positive, got {}", container_width);
    }

    let options = HeatmapOptions {
        color,
        overview,
        container_width,
        today: args.today.unwrap_or_else(|| Local::now().date_naive()),
        settings: config.heatmap.settings.clone(),
        seed: args.seed,
    };

    let mut heatmap = CalendarHeatmap::new(data, options);
    heatmap.settle();

    let rendered = match args.format {
        Format::Svg => heatmap.to_svg(),
        Format::Html => heatmap.to_html(),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), format = ?args.format, "Wrote heatmap");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}
