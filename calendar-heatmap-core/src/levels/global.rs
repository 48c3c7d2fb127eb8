//! Global overview: one block per year of the dataset.

use chrono::Datelike;

use super::{Binding, Canvas, LevelContext, Rendered, TooltipPlacement};
use crate::aggregate::{aggregate_period, Period};
use crate::layout::Settings;
use crate::scale::{BandScale, ColorScale};
use crate::scene::{Element, Layer, Shape};
use crate::tooltip::{nudge_left, period_lines};
use crate::types::AggregateNode;

pub const ITEM_CLASS: &str = "item-block-year";
pub const LABEL_CLASS: &str = "label-year";

#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// One aggregate per year, oldest first
    pub years: Vec<AggregateNode>,
    pub year_scale: BandScale<i32>,
}

impl GlobalContext {
    pub fn year(&self, year: i32) -> Option<&AggregateNode> {
        self.years.iter().find(|node| node.date.year() == year)
    }
}

pub fn render(canvas: &mut Canvas<'_>) -> Rendered {
    let s = canvas.settings;
    let first = canvas.data.iter().map(|r| r.date.year()).min();
    let last = canvas.data.iter().map(|r| r.date.year()).max();

    let years: Vec<AggregateNode> = match (first, last) {
        (Some(first), Some(last)) => (first..=last)
            .map(|year| aggregate_period(canvas.data, Period::Year(year)))
            .collect(),
        _ => Vec::new(),
    };
    let labels: Vec<i32> = years.iter().map(|node| node.date.year()).collect();
    let year_scale = BandScale::new(labels.clone(), (0.0, s.width), 0.05);

    let max = years.iter().map(|node| node.total).max().unwrap_or(0);
    let colors = ColorScale::new(canvas.color, max);

    let width = ((s.width - s.label_padding) / labels.len().max(1) as f64 - s.gutter * 5.0).max(0.0);
    let height = s.height - s.label_padding;

    let mut entering = 0;
    for (index, node) in years.iter().enumerate() {
        let year = node.date.year();
        let id = canvas.insert(
            Element::new(
                &format!("item {}", ITEM_CLASS),
                Layer::Items,
                Shape::Rect {
                    x: year_scale.position(&year).unwrap_or_default(),
                    y: s.tooltip_padding * 2.0,
                    width,
                    height,
                    radius: 0.0,
                },
                Binding::YearBlock(year),
            )
            .with_fill(colors.color(node.total).to_css())
            .with_opacity(0.0),
        );
        canvas.enter_staggered(id, index);
        entering += 1;
    }

    for year in &labels {
        canvas.insert_label(
            LABEL_CLASS,
            year_scale.position(year).unwrap_or_default(),
            s.label_padding / 2.0,
            year.to_string(),
            Binding::YearLabel(*year),
        );
    }

    tracing::debug!(years = years.len(), max_total = max, "Rendered global overview");

    Rendered {
        context: LevelContext::Global(GlobalContext { years, year_scale }),
        entering,
    }
}

/// Tooltip for a hovered year block.
pub fn tooltip(settings: &Settings, ctx: &GlobalContext, year: i32) -> Option<TooltipPlacement> {
    let node = ctx.year(year)?;
    let x = ctx.year_scale.position(&year)? + settings.tooltip_padding * 2.0;
    let x = nudge_left(
        x,
        settings.width,
        settings.tooltip_width + settings.tooltip_padding * 5.0,
    );
    Some(TooltipPlacement {
        lines: period_lines(node),
        x,
        y: settings.tooltip_padding * 3.0,
    })
}
