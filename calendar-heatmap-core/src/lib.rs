//! # calendar-heatmap-core
//!
//! Core library for calendar-heatmap - a drill-down heatmap over time-tracked
//! activity.
//!
//! This library provides:
//! - Domain types for day records, details and category summaries
//! - Aggregation of records into year, month and week totals
//! - A headless SVG scene with timed transitions on a virtual clock
//! - The heatmap component: navigation, hover effects, tooltip
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! The heatmap shows one of five levels (global, year, month, week, day).
//! Clicking drills down, the back button returns. Each level change is
//! sequenced in two phases:
//! - **Exit:** the previous level's elements fade out and are removed
//! - **Enter:** the next level is bound and fades in
//!
//! While either phase runs, level changes and hover effects are ignored.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calendar_heatmap_core::{parse_dataset, CalendarHeatmap, HeatmapOptions};
//!
//! let json = std::fs::read_to_string("data.json").expect("failed to read dataset");
//! let data = parse_dataset(&json).expect("invalid dataset");
//!
//! let mut heatmap = CalendarHeatmap::new(data, HeatmapOptions::default());
//! heatmap.settle();
//! println!("{}", heatmap.to_svg());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use heatmap::{CalendarHeatmap, HeatmapOptions};
pub use layout::Settings;
pub use scale::{Rgb, DEFAULT_COLOR};
pub use types::*;

// Public modules
pub mod aggregate;
pub mod animation;
pub mod config;
pub mod error;
pub mod format;
pub mod heatmap;
pub mod layout;
pub mod levels;
pub mod logging;
pub mod scale;
pub mod scene;
pub mod svg;
pub mod tooltip;
pub mod types;

/// Parse a JSON array of day records.
pub fn parse_dataset(json: &str) -> Result<Vec<DayRecord>> {
    Ok(serde_json::from_str(json)?)
}
