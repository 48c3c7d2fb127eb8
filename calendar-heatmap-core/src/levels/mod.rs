//! Level renderers: one per overview.
//!
//! A renderer binds its slice of the dataset to scene elements, schedules
//! their entrance and returns a [`LevelContext`] holding the scales the event
//! handlers need later. Handlers never capture renderer state; the heatmap
//! passes the context back in explicitly.

pub mod blocks;
pub mod day;
pub mod global;
pub mod month;
pub mod week;
pub mod year;

use chrono::NaiveDate;

use crate::animation::{Jitter, Phase, Target, Timeline, Tween};
use crate::layout::Settings;
use crate::scale::{BandScale, Rgb};
use crate::scene::{Element, ElementId, Layer, Scene, Shape};
use crate::tooltip::TooltipLine;
use crate::types::{DayRecord, Overview};

pub const WEEKDAY_LABEL_CLASS: &str = "label-day";
pub const BACK_BUTTON_CLASS: &str = "button-back";

/// Opacity of elements that do not match a hovered label.
pub const DIMMED_OPACITY: f64 = 0.1;

/// Offset that vertically centres a block inside its row.
pub const ROW_OFFSET: f64 = 15.0;

/// The datum an element is bound to; decides how events on it are handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Decorative; events fall through to the parent group
    None,
    /// Global overview: one block per year
    YearBlock(i32),
    YearLabel(i32),
    /// Year overview: one cell per day record (dataset index)
    DayCell(usize),
    /// Year overview month label (1-12)
    MonthLabel(u32),
    /// Weekday row label (0 = Sunday)
    WeekdayLabel(u32),
    /// Month/week overview: one group per day record (dataset index)
    DayBlock(usize),
    /// One category slice inside a day block
    CategorySegment { day: usize, category: usize },
    /// Week column label, keyed by the week's Sunday
    WeekLabel(NaiveDate),
    /// Day overview: one bar per detail entry
    DetailBar { day: usize, detail: usize },
    /// Day overview hour label (0-23)
    HourLabel(u32),
    /// Day overview category row label
    CategoryLabel(String),
    BackButton,
}

/// Everything a renderer draws with.
pub struct Canvas<'a> {
    pub scene: &'a mut Scene,
    pub timeline: &'a mut Timeline,
    pub jitter: &'a mut Jitter,
    pub settings: &'a Settings,
    pub data: &'a [DayRecord],
    pub color: Rgb,
}

/// Scales and slices of the level on screen, handed to event handlers.
#[derive(Debug, Clone)]
pub enum LevelContext {
    /// Nothing rendered yet
    Empty,
    Global(global::GlobalContext),
    Year(year::YearContext),
    Month(blocks::BlockContext),
    Week(blocks::BlockContext),
    Day(day::DayContext),
}

/// Result of rendering a level.
#[derive(Debug)]
pub struct Rendered {
    pub context: LevelContext,
    /// Number of entrance transitions the enter barrier waits for
    pub entering: usize,
}

/// Tooltip content and position for a hovered element.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPlacement {
    pub lines: Vec<TooltipLine>,
    pub x: f64,
    pub y: f64,
}

impl<'a> Canvas<'a> {
    pub fn insert(&mut self, element: Element) -> ElementId {
        self.scene.insert(element)
    }

    /// Fade in with a delay that grows with the element's index.
    pub fn enter_staggered(&mut self, id: ElementId, index: usize) {
        let duration = self.settings.transition_duration;
        self.timeline.schedule(
            Tween::opacity(Target::Element(id), 1.0)
                .delay(Jitter::stagger(index, duration))
                .duration(duration)
                .phase(Phase::Enter),
        );
    }

    /// Fade in to `opacity` after a random delay; finishes within one
    /// transition duration.
    pub fn enter_jittered(&mut self, id: ElementId, opacity: f64) {
        let duration = self.settings.transition_duration;
        let delay = self.jitter.delay(duration);
        self.timeline.schedule(
            Tween::opacity(Target::Element(id), opacity)
                .delay(delay)
                .duration(duration / 2)
                .phase(Phase::Enter),
        );
    }

    /// Rows for the seven weekdays, Sunday first.
    pub fn weekday_scale(&self) -> BandScale<u32> {
        BandScale::new(
            (0..7).collect(),
            (self.settings.label_padding, self.settings.height),
            0.0,
        )
    }

    fn label(&self, class: &str, x: f64, y: f64, text: String, binding: Binding) -> Element {
        Element::new(
            &format!("label {}", class),
            Layer::Labels,
            Shape::Text {
                x,
                y,
                text,
                font_size: self.settings.font_size(),
            },
            binding,
        )
    }

    pub fn insert_label(&mut self, class: &str, x: f64, y: f64, text: String, binding: Binding) {
        let label = self.label(class, x, y, text, binding);
        self.scene.insert(label);
    }

    /// Single-letter weekday labels down the left edge.
    pub fn draw_weekday_labels(&mut self) {
        let scale = self.weekday_scale();
        let x = self.settings.label_padding / 3.0;
        for weekday in 0..7u32 {
            let y = scale.position(&weekday).unwrap_or_default() + scale.bandwidth() / 1.75;
            self.insert_label(
                WEEKDAY_LABEL_CLASS,
                x,
                y,
                crate::format::weekday_initial(weekday).to_string(),
                Binding::WeekdayLabel(weekday),
            );
        }
    }

    /// Circular "back" button in the top-left corner.
    pub fn draw_back_button(&mut self) {
        let stale = self.scene.remove_class("button");
        self.timeline.forget(&stale);
        let s = self.settings;
        let group = self.scene.insert(
            Element::new(
                &format!("button {}", BACK_BUTTON_CLASS),
                Layer::Buttons,
                Shape::Group { x: 0.0, y: 0.0 },
                Binding::BackButton,
            )
            .with_opacity(0.0),
        );
        let cx = s.label_padding / 2.25;
        let cy = s.label_padding / 2.5;
        self.scene.insert(
            Element::new(
                "",
                Layer::Buttons,
                Shape::Circle {
                    cx,
                    cy,
                    r: s.item_size / 2.0,
                },
                Binding::None,
            )
            .with_parent(group),
        );
        self.scene.insert(
            Element::new(
                "",
                Layer::Buttons,
                Shape::Text {
                    x: cx,
                    y: cy + (s.width / 100.0).floor() / 3.0,
                    text: "\u{2190}".to_string(),
                    font_size: s.font_size(),
                },
                Binding::None,
            )
            .with_parent(group),
        );
        self.timeline.schedule(
            Tween::opacity(Target::Element(group), 1.0).duration(s.transition_duration),
        );
    }

    fn fade_out(&mut self, id: ElementId) -> usize {
        self.timeline.schedule(
            Tween::opacity(Target::Element(id), 0.0)
                .duration(self.settings.transition_duration)
                .phase(Phase::Exit)
                .remove(),
        );
        1
    }

    /// Fade out while sliding a third of the width left (even) or right (odd).
    fn slide_out(&mut self, id: ElementId, index: usize) -> usize {
        let offset = self.settings.width / 3.0;
        let to = if index % 2 == 0 { -offset } else { offset };
        self.timeline.schedule(
            Tween::x(Target::Element(id), to)
                .duration(self.settings.transition_duration)
                .phase(Phase::Exit),
        );
        self.fade_out(id) + 1
    }

    fn remove_labels(&mut self, classes: &[&str]) {
        for class in classes {
            let removed = self.scene.remove_class(class);
            self.timeline.forget(&removed);
        }
    }

    fn exit_back_button(&mut self) -> usize {
        let buttons = self.scene.with_class("button");
        buttons.into_iter().map(|id| self.fade_out(id)).sum()
    }
}

/// Render `overview`. Items and labels left over from an earlier render of
/// the same level are dropped first.
pub fn render(
    canvas: &mut Canvas<'_>,
    overview: Overview,
    anchor: NaiveDate,
    day: Option<usize>,
) -> Rendered {
    clear(canvas, overview);
    match overview {
        Overview::Global => global::render(canvas),
        Overview::Year => year::render(canvas, anchor),
        Overview::Month => month::render(canvas, anchor),
        Overview::Week => week::render(canvas, anchor),
        Overview::Day => match day {
            Some(index) => day::render(canvas, index),
            None => Rendered {
                context: LevelContext::Empty,
                entering: 0,
            },
        },
    }
}

/// Drop `overview`'s items and labels immediately, without transitions.
pub fn clear(canvas: &mut Canvas<'_>, overview: Overview) {
    let classes: &[&str] = match overview {
        Overview::Global => &[global::ITEM_CLASS, global::LABEL_CLASS],
        Overview::Year => &[year::ITEM_CLASS, year::MONTH_LABEL_CLASS, WEEKDAY_LABEL_CLASS],
        Overview::Month => &[month::GROUP_CLASS, blocks::WEEK_LABEL_CLASS, WEEKDAY_LABEL_CLASS],
        Overview::Week => &[week::GROUP_CLASS, blocks::WEEK_LABEL_CLASS, WEEKDAY_LABEL_CLASS],
        Overview::Day => &[
            day::ITEM_CLASS,
            day::TIME_LABEL_CLASS,
            day::CATEGORY_LABEL_CLASS,
        ],
    };
    canvas.remove_labels(classes);
}

/// Start the exit of `overview`'s visuals. Labels go at once; items and the
/// back button fade out and are removed when their transition ends.
///
/// Returns the number of exit transitions the exit barrier waits for.
pub fn exit(canvas: &mut Canvas<'_>, overview: Overview) -> usize {
    let mut exiting = 0;
    match overview {
        Overview::Global => {
            for id in canvas.scene.with_class(global::ITEM_CLASS) {
                exiting += canvas.fade_out(id);
            }
            canvas.remove_labels(&[global::LABEL_CLASS]);
        }
        Overview::Year => {
            for id in canvas.scene.with_class(year::ITEM_CLASS) {
                exiting += canvas.fade_out(id);
            }
            canvas.remove_labels(&[WEEKDAY_LABEL_CLASS, year::MONTH_LABEL_CLASS]);
        }
        Overview::Month | Overview::Week => {
            let group_class = if overview == Overview::Month {
                month::GROUP_CLASS
            } else {
                week::GROUP_CLASS
            };
            for group in canvas.scene.with_class(group_class) {
                for (index, segment) in canvas.scene.children(group).into_iter().enumerate() {
                    exiting += canvas.slide_out(segment, index);
                }
                exiting += canvas.fade_out(group);
            }
            canvas.remove_labels(&[WEEKDAY_LABEL_CLASS, blocks::WEEK_LABEL_CLASS]);
        }
        Overview::Day => {
            for (index, id) in canvas
                .scene
                .with_class(day::ITEM_CLASS)
                .into_iter()
                .enumerate()
            {
                exiting += canvas.slide_out(id, index);
            }
            canvas.remove_labels(&[day::TIME_LABEL_CLASS, day::CATEGORY_LABEL_CLASS]);
        }
    }
    exiting + canvas.exit_back_button()
}

/// For a hovered label, whether an item bound to `item` stays highlighted.
/// `None` when `label` is not a highlighting label.
pub fn label_matches(data: &[DayRecord], label: &Binding, item: &Binding) -> Option<bool> {
    use chrono::Datelike;

    let day_date = |index: &usize| data.get(*index).map(|r| r.date);
    let matches = match (label, item) {
        (Binding::YearLabel(year), Binding::YearBlock(block)) => year == block,
        (Binding::MonthLabel(month), Binding::DayCell(i)) => {
            day_date(i).map(|d| d.month()) == Some(*month)
        }
        (Binding::WeekdayLabel(weekday), Binding::DayCell(i) | Binding::DayBlock(i)) => {
            day_date(i).map(|d| d.weekday().num_days_from_sunday()) == Some(*weekday)
        }
        (Binding::WeekLabel(start), Binding::DayBlock(i)) => {
            day_date(i).map(crate::aggregate::start_of_week) == Some(*start)
        }
        (Binding::HourLabel(hour), Binding::DetailBar { day, detail }) => {
            let Some(entry) = data.get(*day).and_then(|r| r.details.get(*detail)) else {
                return Some(false);
            };
            let mark = entry.date.date().and_hms_opt(*hour, 0, 0);
            mark.map_or(false, |mark| entry.date <= mark && mark <= entry.end())
        }
        (Binding::CategoryLabel(name), Binding::DetailBar { day, detail }) => data
            .get(*day)
            .and_then(|r| r.details.get(*detail))
            .map_or(false, |entry| &entry.name == name),
        (
            Binding::YearLabel(_)
            | Binding::MonthLabel(_)
            | Binding::WeekdayLabel(_)
            | Binding::WeekLabel(_)
            | Binding::HourLabel(_)
            | Binding::CategoryLabel(_),
            _,
        ) => false,
        _ => return None,
    };
    Some(matches)
}

/// Class of the elements a label on `overview` highlights.
pub fn highlight_class(overview: Overview) -> &'static str {
    match overview {
        Overview::Global => global::ITEM_CLASS,
        Overview::Year => year::ITEM_CLASS,
        Overview::Month => month::GROUP_CLASS,
        Overview::Week => week::GROUP_CLASS,
        Overview::Day => day::ITEM_CLASS,
    }
}

/// Resting opacity of `overview`'s items.
pub fn resting_opacity(overview: Overview) -> f64 {
    match overview {
        Overview::Day => day::BAR_OPACITY,
        _ => 1.0,
    }
}
