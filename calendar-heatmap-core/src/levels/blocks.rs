//! Stacked day blocks shared by the month and week overviews.
//!
//! Each day record becomes a group placed by week column and weekday row.
//! Inside it one rect per category is stacked left to right, each as wide as
//! its share of the day total.

use chrono::{Datelike, Duration, NaiveDate};

use super::{Binding, Canvas, LevelContext, Rendered, TooltipPlacement, ROW_OFFSET};
use crate::aggregate::{records_in, start_of_week, summary_of, week_number, Period};
use crate::layout::Settings;
use crate::scale::{BandScale, ColorScale, LinearScale};
use crate::scene::{Element, Layer, Shape};
use crate::tooltip::{nudge_left, segment_lines};
use crate::types::{DayRecord, Overview};

pub const SEGMENT_CLASS: &str = "item-block-rect";
pub const WEEK_LABEL_CLASS: &str = "label-week";

/// Layout of a month or week overview.
#[derive(Debug, Clone)]
pub struct BlockContext {
    /// `Overview::Month` or `Overview::Week`
    pub kind: Overview,
    pub period: Period,
    /// Columns keyed by the Sunday each week starts on
    pub week_scale: BandScale<NaiveDate>,
    pub day_scale: BandScale<u32>,
    /// Width of a whole day block
    pub item_width: f64,
    /// Largest single category value in the period
    pub max: u64,
}

/// One category slice of a day block, relative to its group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: f64,
    /// Scaled share of the block, before the gutter is taken off
    pub scaled: f64,
    pub width: f64,
}

impl BlockContext {
    pub fn new(
        kind: Overview,
        period: Period,
        settings: &Settings,
        day_scale: BandScale<u32>,
        data: &[DayRecord],
    ) -> Self {
        let weeks = weeks_of(period);
        let padding = if kind == Overview::Week { 0.01 } else { 0.05 };
        let item_width =
            (settings.width - settings.label_padding) / weeks.len().max(1) as f64 - settings.gutter * 5.0;
        let max = records_in(data, period)
            .iter()
            .filter_map(|(_, record)| summary_of(record).iter().map(|c| c.value).max())
            .max()
            .unwrap_or(0);
        Self {
            kind,
            period,
            week_scale: BandScale::new(weeks, (settings.label_padding, settings.width), padding),
            day_scale,
            item_width,
            max,
        }
    }

    /// Translation of the group for `date`.
    pub fn block_origin(&self, date: NaiveDate) -> (f64, f64) {
        let weekday = date.weekday().num_days_from_sunday();
        let x = self
            .week_scale
            .position(&start_of_week(date))
            .unwrap_or_default();
        let y = self.day_scale.position(&weekday).unwrap_or_default()
            + self.day_scale.bandwidth() / 1.75
            - ROW_OFFSET;
        (x, y)
    }

    pub fn block_height(&self, settings: &Settings) -> f64 {
        self.day_scale.bandwidth().min(settings.max_block_height)
    }

    /// Category slices of `record`, in summary order.
    pub fn segments(&self, settings: &Settings, record: &DayRecord) -> Vec<Segment> {
        let scale = LinearScale::new((0.0, record.total as f64), (0.0, self.item_width)).rounded();
        let mut offset = 0.0;
        summary_of(record)
            .iter()
            .map(|category| {
                let scaled = scale.map(category.value as f64);
                let segment = Segment {
                    x: offset,
                    scaled,
                    width: (scaled - settings.item_gutter).max(1.0),
                };
                offset += scaled;
                segment
            })
            .collect()
    }
}

/// Sundays of every week overlapping `period`.
pub fn weeks_of(period: Period) -> Vec<NaiveDate> {
    let end = period.end();
    let mut week = start_of_week(period.start());
    let mut weeks = Vec::new();
    while week < end {
        weeks.push(week);
        week += Duration::days(7);
    }
    weeks
}

pub fn render(canvas: &mut Canvas<'_>, kind: Overview, period: Period, group_class: &str) -> Rendered {
    let s = canvas.settings;
    let ctx = BlockContext::new(kind, period, s, canvas.weekday_scale(), canvas.data);
    let colors = ColorScale::new(canvas.color, ctx.max);
    let height = ctx.block_height(s);

    let mut entering = 0;
    for (index, record) in records_in(canvas.data, period) {
        let (x, y) = ctx.block_origin(record.date);
        let group = canvas.insert(Element::new(
            &format!("item {}", group_class),
            Layer::Items,
            Shape::Group { x, y },
            Binding::DayBlock(index),
        ));

        let summary = summary_of(record);
        for (category, segment) in ctx.segments(s, record).into_iter().enumerate() {
            let value = summary[category].value;
            let id = canvas.insert(
                Element::new(
                    &format!("item {}", SEGMENT_CLASS),
                    Layer::Items,
                    Shape::Rect {
                        x: segment.x,
                        y: 0.0,
                        width: segment.width,
                        height,
                        radius: 0.0,
                    },
                    Binding::CategorySegment {
                        day: index,
                        category,
                    },
                )
                .with_fill(colors.color(value).to_css())
                .with_opacity(0.0)
                .with_parent(group),
            );
            canvas.enter_jittered(id, 1.0);
            entering += 1;
        }
    }

    let weeks: Vec<NaiveDate> = ctx.week_scale.domain().to_vec();
    for week in weeks {
        canvas.insert_label(
            WEEK_LABEL_CLASS,
            ctx.week_scale.position(&week).unwrap_or_default(),
            s.label_padding / 2.0,
            format!("Week {}", week_number(week)),
            Binding::WeekLabel(week),
        );
    }
    canvas.draw_weekday_labels();
    canvas.draw_back_button();

    tracing::debug!(
        overview = %kind,
        period = %period.display_name(),
        segments = entering,
        "Rendered block overview"
    );

    let context = match kind {
        Overview::Week => LevelContext::Week(ctx),
        _ => LevelContext::Month(ctx),
    };
    Rendered { context, entering }
}

/// Tooltip for one category segment of the block of `record`.
pub fn tooltip(
    settings: &Settings,
    ctx: &BlockContext,
    record: &DayRecord,
    category: usize,
) -> Option<TooltipPlacement> {
    let summary = summary_of(record);
    let entry = summary.get(category)?;
    let weekday = record.date.weekday().num_days_from_sunday();
    let row = ctx.day_scale.position(&weekday)?;
    let needed = settings.tooltip_width + settings.tooltip_padding * 3.0;

    let (x, y) = match ctx.kind {
        Overview::Week => {
            let segment = ctx.segments(settings, record).get(category).copied()?;
            let (group_x, _) = ctx.block_origin(record.date);
            (
                group_x + segment.x + segment.scaled / 4.0 + settings.tooltip_width / 4.0,
                row + settings.tooltip_padding * 1.5,
            )
        }
        _ => {
            let (group_x, _) = ctx.block_origin(record.date);
            (
                group_x + settings.tooltip_padding,
                row + settings.tooltip_padding * 2.0,
            )
        }
    };

    Some(TooltipPlacement {
        lines: segment_lines(entry, record.date),
        x: nudge_left(x, settings.width, needed),
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetailEntry;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: NaiveDate, values: &[(&str, u64)]) -> DayRecord {
        let details = values
            .iter()
            .map(|(name, value)| DetailEntry {
                name: name.to_string(),
                date: day.and_hms_opt(9, 0, 0).unwrap(),
                value: *value,
            })
            .collect();
        DayRecord::new(day, details)
    }

    #[test]
    fn test_weeks_of_month() {
        // March 2024 starts on a Friday and ends on a Sunday
        let weeks = weeks_of(Period::Month(2024, 3));
        assert_eq!(weeks.first(), Some(&date(2024, 2, 25)));
        assert_eq!(weeks.last(), Some(&date(2024, 3, 31)));
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks_of(Period::Week(date(2024, 3, 3))), vec![date(2024, 3, 3)]);
    }

    #[test]
    fn test_segments_stack_proportionally() {
        let settings = Settings::default();
        let data = vec![record(date(2024, 3, 6), &[("a", 300), ("b", 100)])];
        let day_scale = BandScale::new((0..7).collect(), (40.0, 200.0), 0.0);
        let ctx = BlockContext::new(
            Overview::Week,
            Period::Week(date(2024, 3, 3)),
            &settings,
            day_scale,
            &data,
        );
        assert_eq!(ctx.max, 300);
        assert_eq!(ctx.item_width, 960.0 - 25.0);

        let segments = ctx.segments(&settings, &data[0]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].x, 0.0);
        assert_eq!(segments[0].scaled, (935.0_f64 * 0.75).round());
        assert_eq!(segments[1].x, segments[0].scaled);
        assert_eq!(segments[1].width, segments[1].scaled - 1.0);
    }

    #[test]
    fn test_segment_width_never_below_one() {
        let settings = Settings::default();
        let data = vec![record(date(2024, 3, 6), &[("a", 1_000_000), ("b", 1)])];
        let day_scale = BandScale::new((0..7).collect(), (40.0, 200.0), 0.0);
        let ctx = BlockContext::new(
            Overview::Month,
            Period::Month(2024, 3),
            &settings,
            day_scale,
            &data,
        );
        let segments = ctx.segments(&settings, &data[0]);
        assert_eq!(segments[1].width, 1.0);
    }
}
