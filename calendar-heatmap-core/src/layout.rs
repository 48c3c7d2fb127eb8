//! Geometry and timing settings, and the responsive layout derived from them.

use chrono::{Months, NaiveDate};
use serde::Deserialize;

use crate::aggregate::start_of_week;

/// Narrowest width the heatmap lays itself out for.
pub const MIN_WIDTH: f64 = 1000.0;

/// Fixed geometry and timing of the heatmap.
///
/// `width`, `height` and `item_size` are recomputed from the container width
/// by [`Settings::fit`]; the rest are constants that can be overridden from
/// the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_gutter")]
    pub gutter: f64,
    #[serde(default = "default_item_gutter")]
    pub item_gutter: f64,
    #[serde(skip, default = "default_width")]
    pub width: f64,
    #[serde(skip, default = "default_height")]
    pub height: f64,
    #[serde(skip, default = "default_item_size")]
    pub item_size: f64,
    #[serde(default = "default_label_padding")]
    pub label_padding: f64,
    #[serde(default = "default_max_block_height")]
    pub max_block_height: f64,
    /// Milliseconds
    #[serde(default = "default_transition_duration")]
    pub transition_duration: u64,
    #[serde(default = "default_tooltip_width")]
    pub tooltip_width: f64,
    #[serde(default = "default_tooltip_padding")]
    pub tooltip_padding: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gutter: default_gutter(),
            item_gutter: default_item_gutter(),
            width: default_width(),
            height: default_height(),
            item_size: default_item_size(),
            label_padding: default_label_padding(),
            max_block_height: default_max_block_height(),
            transition_duration: default_transition_duration(),
            tooltip_width: default_tooltip_width(),
            tooltip_padding: default_tooltip_padding(),
        }
    }
}

fn default_gutter() -> f64 {
    5.0
}

fn default_item_gutter() -> f64 {
    1.0
}

fn default_width() -> f64 {
    MIN_WIDTH
}

fn default_height() -> f64 {
    200.0
}

fn default_item_size() -> f64 {
    10.0
}

fn default_label_padding() -> f64 {
    40.0
}

fn default_max_block_height() -> f64 {
    20.0
}

fn default_transition_duration() -> u64 {
    500
}

fn default_tooltip_width() -> f64 {
    250.0
}

fn default_tooltip_padding() -> f64 {
    15.0
}

impl Settings {
    /// Size the heatmap for a container: one column per week of the trailing
    /// year, seven rows of cells.
    pub fn fit(&mut self, container_width: f64, today: NaiveDate) {
        let year_ago = today
            .checked_sub_months(Months::new(12))
            .unwrap_or(today);
        let day_index = (today - start_of_week(year_ago)).num_days();
        let num_weeks = (day_index / 7 + 1) as f64;

        self.width = container_width.max(MIN_WIDTH);
        self.item_size = (self.width - self.label_padding) / num_weeks - self.gutter;
        self.height = self.label_padding + 7.0 * (self.item_size + self.gutter);
    }

    /// Label font size in pixels.
    pub fn font_size(&self) -> f64 {
        (self.label_padding / 3.0).floor()
    }

    /// Half a transition, used for tooltip fades.
    pub fn half_duration(&self) -> u64 {
        self.transition_duration / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.gutter, 5.0);
        assert_eq!(settings.transition_duration, 500);
        assert_eq!(settings.font_size(), 13.0);
        assert_eq!(settings.half_duration(), 250);
    }

    #[test]
    fn test_fit_narrow_container_uses_min_width() {
        let mut settings = Settings::default();
        // 2024-03-06 is a Wednesday; a year earlier the week started Sunday 2023-03-05
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        settings.fit(600.0, today);
        assert_eq!(settings.width, MIN_WIDTH);
        // 367 days -> 53 columns
        let expected_item = (MIN_WIDTH - 40.0) / 53.0 - 5.0;
        assert!((settings.item_size - expected_item).abs() < 1e-9);
        assert!((settings.height - (40.0 + 7.0 * (expected_item + 5.0))).abs() < 1e-9);
    }

    #[test]
    fn test_fit_wide_container() {
        let mut settings = Settings::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        settings.fit(1400.0, today);
        assert_eq!(settings.width, 1400.0);
        assert!(settings.item_size > 10.0);
    }

    #[test]
    fn test_partial_settings_from_toml() {
        let settings: Settings = toml::from_str("transition_duration = 100").unwrap();
        assert_eq!(settings.transition_duration, 100);
        assert_eq!(settings.label_padding, 40.0);
        assert_eq!(settings.width, MIN_WIDTH);
    }
}
