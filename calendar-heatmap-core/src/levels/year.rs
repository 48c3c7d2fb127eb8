//! Year overview: one rounded cell per day record, laid out in week columns.

use chrono::{Datelike, NaiveDate};

use super::{Binding, Canvas, LevelContext, Rendered, TooltipPlacement};
use crate::aggregate::{records_in, start_of_week, summary_of, Period};
use crate::layout::Settings;
use crate::scale::{ColorScale, LinearScale};
use crate::scene::{Element, ElementId, Layer, Scene, Shape};
use crate::tooltip::day_lines;
use crate::types::DayRecord;

pub const ITEM_CLASS: &str = "item-circle";
pub const MONTH_LABEL_CLASS: &str = "label-month";

/// Factor a hovered cell grows to, relative to the full item size.
const HOVER_SCALE: f64 = 1.1;

#[derive(Debug, Clone)]
pub struct YearContext {
    pub period: Period,
    /// Sunday on or before January 1st; column 0 starts here
    pub grid_start: NaiveDate,
    /// Largest day total of the year
    pub max: u64,
}

impl YearContext {
    pub fn new(period: Period, data: &[DayRecord]) -> Self {
        let max = records_in(data, period)
            .iter()
            .map(|(_, r)| r.total)
            .max()
            .unwrap_or(0);
        Self {
            period,
            grid_start: start_of_week(period.start()),
            max,
        }
    }

    /// Top-left corner of the grid slot for `date`.
    pub fn slot(&self, settings: &Settings, date: NaiveDate) -> (f64, f64) {
        let column = (date - self.grid_start).num_days() / 7;
        let row = date.weekday().num_days_from_sunday();
        let pitch = settings.item_size + settings.gutter;
        (
            column as f64 * pitch + settings.label_padding,
            settings.label_padding + row as f64 * pitch,
        )
    }

    /// Cell size: three quarters of the item plus a quarter scaled by total.
    pub fn cell_size(&self, settings: &Settings, total: u64) -> f64 {
        if self.max == 0 {
            return settings.item_size;
        }
        settings.item_size * 0.75 + settings.item_size * total as f64 / self.max as f64 * 0.25
    }

    /// Resting geometry of the cell for `record`, centred in its slot.
    pub fn cell(&self, settings: &Settings, record: &DayRecord) -> Shape {
        let (x, y) = self.slot(settings, record.date);
        let size = self.cell_size(settings, record.total);
        let inset = (settings.item_size - size) / 2.0;
        Shape::Rect {
            x: x + inset,
            y: y + inset,
            width: size,
            height: size,
            radius: size,
        }
    }

    fn enlarged(&self, settings: &Settings, record: &DayRecord, radius: f64) -> Shape {
        let (x, y) = self.slot(settings, record.date);
        let size = settings.item_size * HOVER_SCALE;
        let inset = (size - settings.item_size) / 2.0;
        Shape::Rect {
            x: x - inset,
            y: y - inset,
            width: size,
            height: size,
            radius,
        }
    }
}

pub fn render(canvas: &mut Canvas<'_>, anchor: NaiveDate) -> Rendered {
    let period = Period::year_of(anchor);
    let ctx = YearContext::new(period, canvas.data);
    let colors = ColorScale::new(canvas.color, ctx.max);
    let s = canvas.settings;

    let cells: Vec<(usize, Shape, String)> = records_in(canvas.data, period)
        .into_iter()
        .map(|(index, record)| {
            let fill = if record.total > 0 {
                colors.color(record.total).to_css()
            } else {
                "transparent".to_string()
            };
            (index, ctx.cell(s, record), fill)
        })
        .collect();

    let mut entering = 0;
    for (index, shape, fill) in cells {
        let id = canvas.insert(
            Element::new(
                &format!("item {}", ITEM_CLASS),
                Layer::Items,
                shape,
                Binding::DayCell(index),
            )
            .with_fill(fill)
            .with_opacity(0.0),
        );
        canvas.enter_jittered(id, 1.0);
        entering += 1;
    }

    let months = LinearScale::new((0.0, 12.0), (0.0, s.width));
    for month in 1..=12u32 {
        canvas.insert_label(
            MONTH_LABEL_CLASS,
            months.map(month as f64 - 0.5),
            s.label_padding / 2.0,
            crate::format::month_label(month).to_string(),
            Binding::MonthLabel(month),
        );
    }
    canvas.draw_weekday_labels();
    canvas.draw_back_button();

    tracing::debug!(
        year = anchor.year(),
        cells = entering,
        max_total = ctx.max,
        "Rendered year overview"
    );

    Rendered {
        context: LevelContext::Year(ctx),
        entering,
    }
}

/// Grow a hovered cell, or put it back to its resting size.
pub fn set_hovered(
    scene: &mut Scene,
    settings: &Settings,
    ctx: &YearContext,
    id: ElementId,
    record: &DayRecord,
    hovered: bool,
) {
    let Some(element) = scene.get_mut(id) else {
        return;
    };
    element.shape = if hovered {
        let radius = ctx.cell_size(settings, record.total);
        ctx.enlarged(settings, record, radius)
    } else {
        ctx.cell(settings, record)
    };
}

/// Tooltip below and right of the cell, flipped left near the right edge.
pub fn tooltip(settings: &Settings, ctx: &YearContext, record: &DayRecord) -> TooltipPlacement {
    let (x, y) = ctx.slot(settings, record.date);
    let mut x = x + settings.item_size;
    if settings.width - x < settings.tooltip_width + settings.tooltip_padding * 3.0 {
        x -= settings.tooltip_width + settings.tooltip_padding * 2.0;
    }
    let summary = summary_of(record);
    TooltipPlacement {
        lines: day_lines(record, &summary),
        x,
        y: y + settings.item_size,
    }
}
