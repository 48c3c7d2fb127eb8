//! Day overview: every tracked interval as a bar on a 24 hour axis, one row
//! per category.

use chrono::{NaiveDate, NaiveDateTime};

use super::{Binding, Canvas, LevelContext, Rendered, TooltipPlacement, ROW_OFFSET};
use crate::aggregate::summary_of;
use crate::format::hour_label;
use crate::layout::Settings;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{text_width, Element, Layer, Shape};
use crate::tooltip::{detail_lines, nudge_left};
use crate::types::{DayRecord, DetailEntry};

pub const ITEM_CLASS: &str = "item-block";
pub const TIME_LABEL_CLASS: &str = "label-time";
pub const CATEGORY_LABEL_CLASS: &str = "label-project";

/// Opacity bars settle at once their entrance finishes.
pub const BAR_OPACITY: f64 = 0.5;

const SECONDS_PER_DAY: f64 = 86_400.0;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct DayContext {
    /// Dataset index of the record on screen
    pub day: usize,
    pub date: NaiveDate,
    /// Rows keyed by category name, in summary order
    pub category_scale: BandScale<String>,
    /// Seconds since midnight to x
    pub time_scale: LinearScale,
}

impl DayContext {
    pub fn new(settings: &Settings, day: usize, record: &DayRecord) -> Self {
        let names = summary_of(record).iter().map(|c| c.name.clone()).collect();
        Self {
            day,
            date: record.date,
            category_scale: BandScale::new(
                names,
                (settings.label_padding, settings.height),
                0.0,
            ),
            // The last millisecond of the day lands on the right edge.
            time_scale: LinearScale::new(
                (0.0, SECONDS_PER_DAY - 0.001),
                (settings.label_padding * 2.0, settings.width),
            ),
        }
    }

    pub fn time_x(&self, ts: NaiveDateTime) -> f64 {
        let midnight = self.date.and_hms_opt(0, 0, 0).unwrap_or(ts);
        let seconds = (ts - midnight).num_milliseconds() as f64 / 1000.0;
        self.time_scale.map(seconds)
    }

    /// Bar geometry for one detail.
    pub fn bar(&self, settings: &Settings, detail: &DetailEntry) -> Option<Shape> {
        let row = self.category_scale.position(&detail.name)?;
        let bandwidth = self.category_scale.bandwidth();
        let x = self.time_x(detail.date);
        Some(Shape::Rect {
            x,
            y: row + bandwidth / 2.0 - ROW_OFFSET,
            width: (self.time_x(detail.end()) - x).max(1.0),
            height: bandwidth.min(settings.max_block_height),
            radius: 0.0,
        })
    }
}

/// Shorten `text` with a trailing ellipsis until it fits in `max_width`.
pub fn truncate_label(text: &str, font_size: f64, max_width: f64) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{}", chars.iter().collect::<String>(), ELLIPSIS);
        if text_width(&candidate, font_size) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

pub fn render(canvas: &mut Canvas<'_>, day: usize) -> Rendered {
    let Some(record) = canvas.data.get(day) else {
        tracing::warn!(day, "Day overview requested for a missing record");
        return Rendered {
            context: LevelContext::Empty,
            entering: 0,
        };
    };
    let s = canvas.settings;
    let ctx = DayContext::new(s, day, record);
    let fill = canvas.color.to_css();

    let mut entering = 0;
    for (index, detail) in record.details.iter().enumerate() {
        let Some(shape) = ctx.bar(s, detail) else {
            continue;
        };
        let id = canvas.insert(
            Element::new(
                &format!("item {}", ITEM_CLASS),
                Layer::Items,
                shape,
                Binding::DetailBar { day, detail: index },
            )
            .with_fill(fill.clone())
            .with_opacity(0.0),
        );
        canvas.enter_jittered(id, BAR_OPACITY);
        entering += 1;
    }

    let hours = LinearScale::new((0.0, 24.0), (s.label_padding * 2.0, s.width));
    for hour in 0..24u32 {
        canvas.insert_label(
            TIME_LABEL_CLASS,
            hours.map(hour as f64),
            s.label_padding / 2.0,
            hour_label(hour),
            Binding::HourLabel(hour),
        );
    }

    let font_size = s.font_size();
    let names: Vec<String> = ctx.category_scale.domain().to_vec();
    for name in names {
        let y = ctx.category_scale.position(&name).unwrap_or_default()
            + ctx.category_scale.bandwidth() / 2.0;
        canvas.insert_label(
            CATEGORY_LABEL_CLASS,
            s.gutter,
            y,
            truncate_label(&name, font_size, s.label_padding * 1.5),
            Binding::CategoryLabel(name),
        );
    }
    canvas.draw_back_button();

    tracing::debug!(date = %record.date, bars = entering, "Rendered day overview");

    Rendered {
        context: LevelContext::Day(ctx),
        entering,
    }
}

/// Tooltip for the bar of `detail`.
pub fn tooltip(settings: &Settings, ctx: &DayContext, detail: &DetailEntry) -> Option<TooltipPlacement> {
    let row = ctx.category_scale.position(&detail.name)?;
    let x = detail.value as f64 * 100.0 / SECONDS_PER_DAY + ctx.time_x(detail.date);
    Some(TooltipPlacement {
        lines: detail_lines(detail),
        x: nudge_left(
            x,
            settings.width,
            settings.tooltip_width + settings.tooltip_padding * 3.0,
        ),
        y: row + ctx.category_scale.bandwidth() / 2.0 + settings.tooltip_padding / 2.0,
    })
}
