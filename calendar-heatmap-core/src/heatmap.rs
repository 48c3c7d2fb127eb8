//! The heatmap component: navigation state, event routing and the
//! two-phase level transitions.
//!
//! A level change runs in two phases. First every element of the current
//! level plays its exit transition; the exit barrier opens once all of them
//! have been removed from the scene. Then the next level is rendered and
//! plays its entrance; the enter barrier opens once the last entering element
//! has finished, and the heatmap is idle again. Events arriving in between are
//! dropped.

use chrono::{Local, NaiveDate};

use crate::aggregate::{aggregate_period, aggregate_where, period_has_data, summarize_all, Period};
use crate::animation::{Barrier, Finished, Jitter, Phase, Target, Timeline, Tween};
use crate::layout::{Settings, MIN_WIDTH};
use crate::levels::{self, blocks, day, global, year, Binding, Canvas, LevelContext, TooltipPlacement};
use crate::scale::{Rgb, DEFAULT_COLOR};
use crate::scene::{ElementId, Scene};
use crate::svg;
use crate::tooltip::Tooltip;
use crate::types::{DayRecord, DetailEntry, Overview, Selection};

/// Callback invoked when a bar of the day overview is clicked.
pub type DetailHandler = Box<dyn FnMut(&DetailEntry)>;

/// Options a heatmap is mounted with.
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Accent color of the scales
    pub color: Rgb,
    /// Level shown first
    pub overview: Overview,
    /// Width of the hosting container in pixels
    pub container_width: f64,
    /// Date the layout and unselected levels anchor on
    pub today: NaiveDate,
    pub settings: Settings,
    /// Seed for the entrance jitter; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            overview: Overview::Global,
            container_width: MIN_WIDTH,
            today: Local::now().date_naive(),
            settings: Settings::default(),
            seed: None,
        }
    }
}

/// Where the heatmap is in a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavPhase {
    Idle,
    /// Waiting for the previous level to leave
    Exiting(Barrier),
    /// Waiting for the new level to finish its entrance
    Entering(Barrier),
}

pub struct CalendarHeatmap {
    data: Vec<DayRecord>,
    color: Rgb,
    overview: Overview,
    history: Vec<Overview>,
    selection: Option<Selection>,
    phase: NavPhase,
    scene: Scene,
    timeline: Timeline,
    jitter: Jitter,
    tooltip: Tooltip,
    settings: Settings,
    today: NaiveDate,
    context: LevelContext,
    handler: Option<DetailHandler>,
    hovered: Option<ElementId>,
    /// Settings changed while the level on screen was still entering
    pending_resize: bool,
}

impl std::fmt::Debug for CalendarHeatmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarHeatmap")
            .field("records", &self.data.len())
            .field("overview", &self.overview)
            .field("history", &self.history)
            .field("selection", &self.selection)
            .field("phase", &self.phase)
            .field("elements", &self.scene.len())
            .finish_non_exhaustive()
    }
}

impl CalendarHeatmap {
    /// Mount a heatmap over `data` and render the initial level.
    ///
    /// Day summaries are computed here once and kept on the records.
    pub fn new(mut data: Vec<DayRecord>, options: HeatmapOptions) -> Self {
        summarize_all(&mut data);
        let mut settings = options.settings;
        settings.fit(options.container_width, options.today);

        tracing::info!(
            records = data.len(),
            overview = %options.overview,
            width = settings.width,
            "Mounting calendar heatmap"
        );

        let mut heatmap = Self {
            data,
            color: options.color,
            overview: options.overview,
            history: vec![Overview::Global],
            selection: None,
            phase: NavPhase::Idle,
            scene: Scene::new(),
            timeline: Timeline::new(),
            jitter: Jitter::new(options.seed),
            tooltip: Tooltip::default(),
            settings,
            today: options.today,
            context: LevelContext::Empty,
            handler: None,
            hovered: None,
            pending_resize: false,
        };
        heatmap.enter_level();
        heatmap
    }

    /// Register the callback for clicks on day overview bars.
    pub fn on_detail_click<F>(&mut self, handler: F)
    where
        F: FnMut(&DetailEntry) + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn overview(&self) -> Overview {
        self.overview
    }

    pub fn history(&self) -> &[Overview] {
        &self.history
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// True from the moment a level change starts until the new level has
    /// finished entering.
    pub fn in_transition(&self) -> bool {
        self.phase != NavPhase::Idle
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn data(&self) -> &[DayRecord] {
        &self.data
    }

    pub fn context(&self) -> &LevelContext {
        &self.context
    }

    /// Milliseconds on the animation clock.
    pub fn now(&self) -> u64 {
        self.timeline.now()
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<ElementId> {
        self.scene.with_class(class)
    }

    pub fn to_svg(&self) -> String {
        svg::render_svg(&self.scene, &self.settings)
    }

    /// Standalone page with the SVG, the tooltip overlay and the stylesheet.
    pub fn to_html(&self) -> String {
        svg::render_html(&self.scene, &self.settings, &self.tooltip)
    }

    /// Element in the scene bound to `binding`, if any.
    pub fn find(&self, binding: &Binding) -> Option<ElementId> {
        self.scene
            .iter()
            .find(|(_, el)| &el.binding == binding)
            .map(|(id, _)| id)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Click on a scene element.
    pub fn click(&mut self, id: ElementId) {
        let Some(binding) = self.scene.get(id).map(|el| el.binding.clone()) else {
            return;
        };

        // Detail clicks go to the host even mid-transition.
        if let Binding::DetailBar { day, detail } = binding {
            self.dispatch_detail(day, detail);
            return;
        }

        if self.in_transition() {
            tracing::debug!(?binding, "Dropping click during transition");
            return;
        }

        match (self.overview, binding) {
            (Overview::Global, Binding::YearBlock(year) | Binding::YearLabel(year)) => {
                let node = aggregate_period(&self.data, Period::Year(year));
                self.navigate(Overview::Year, Selection::Period(node));
            }
            (Overview::Year, Binding::DayCell(index)) => self.select_day(index),
            (Overview::Year, Binding::MonthLabel(month)) => {
                let LevelContext::Year(ctx) = &self.context else {
                    return;
                };
                let Period::Year(year) = ctx.period else {
                    return;
                };
                let period = Period::Month(year, month);
                self.select_period(Overview::Month, period, period.anchor());
            }
            (
                Overview::Month | Overview::Week,
                Binding::DayBlock(index) | Binding::CategorySegment { day: index, .. },
            ) => self.select_day(index),
            (Overview::Month, Binding::WeekLabel(start)) => {
                // A week reaching back into the previous month stays anchored
                // in this one, so going back returns here.
                let anchor = match &self.context {
                    LevelContext::Month(ctx) => start.max(ctx.period.start()),
                    _ => start,
                };
                self.select_period(Overview::Week, Period::Week(start), anchor);
            }
            (_, Binding::BackButton) => self.back(),
            _ => {}
        }
    }

    /// Pointer entered a scene element.
    pub fn hover(&mut self, id: ElementId) {
        if self.in_transition() {
            return;
        }
        let Some(binding) = self.scene.get(id).map(|el| el.binding.clone()) else {
            return;
        };
        if let Some(previous) = self.hovered.filter(|previous| *previous != id) {
            self.leave(previous);
        }
        self.hovered = Some(id);

        if levels::label_matches(&self.data, &binding, &Binding::None).is_some() {
            self.highlight(&binding);
            return;
        }

        let placement = match (&self.context, &binding) {
            (LevelContext::Global(ctx), Binding::YearBlock(year)) => {
                global::tooltip(&self.settings, ctx, *year)
            }
            (LevelContext::Year(ctx), Binding::DayCell(index)) => {
                self.data.get(*index).map(|record| {
                    year::set_hovered(&mut self.scene, &self.settings, ctx, id, record, true);
                    year::tooltip(&self.settings, ctx, record)
                })
            }
            (
                LevelContext::Month(ctx) | LevelContext::Week(ctx),
                Binding::CategorySegment { day, category },
            ) => self
                .data
                .get(*day)
                .and_then(|record| blocks::tooltip(&self.settings, ctx, record, *category)),
            (LevelContext::Day(ctx), Binding::DetailBar { day, detail }) => self
                .data
                .get(*day)
                .and_then(|record| record.details.get(*detail))
                .and_then(|entry| day::tooltip(&self.settings, ctx, entry)),
            _ => None,
        };
        if let Some(placement) = placement {
            self.show_tooltip(placement);
        }
    }

    /// Pointer left a scene element.
    pub fn leave(&mut self, id: ElementId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.in_transition() {
            return;
        }
        let Some(binding) = self.scene.get(id).map(|el| el.binding.clone()) else {
            return;
        };

        if levels::label_matches(&self.data, &binding, &Binding::None).is_some() {
            self.restore_highlight();
            return;
        }
        if let (LevelContext::Year(ctx), Binding::DayCell(index)) = (&self.context, &binding) {
            if let Some(record) = self.data.get(*index) {
                year::set_hovered(&mut self.scene, &self.settings, ctx, id, record, false);
            }
        }
        self.hide_tooltip();
    }

    /// Pointer moved to `(x, y)` in scene coordinates.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let target = self.scene.element_at(x, y);
        if target == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered {
            self.leave(previous);
        }
        if let Some(id) = target {
            self.hover(id);
        }
    }

    /// Click at `(x, y)` in scene coordinates.
    pub fn pointer_click(&mut self, x: f64, y: f64) {
        if let Some(id) = self.scene.element_at(x, y) {
            self.click(id);
        }
    }

    /// Return to the previous level. A no-op at the root or mid-transition.
    pub fn back(&mut self) {
        if self.in_transition() {
            tracing::debug!("Dropping back during transition");
            return;
        }
        if self.history.len() < 2 {
            tracing::debug!(history = ?self.history, "Nothing to go back to");
            return;
        }
        self.history.pop();
        let Some(previous) = self.history.pop() else {
            return;
        };
        tracing::info!(from = %self.overview, to = %previous, "Navigating back");
        self.start_transition(previous);
    }

    /// The container was resized.
    ///
    /// Geometry is refitted immediately. The level on screen is redrawn at
    /// once when idle, otherwise as soon as its entrance completes.
    pub fn resize(&mut self, container_width: f64) {
        self.settings.fit(container_width, self.today);
        tracing::debug!(width = self.settings.width, "Resized");
        if self.in_transition() {
            self.pending_resize = true;
            return;
        }
        self.hovered = None;
        self.enter_level();
    }

    /// Move the animation clock forward by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        let target = self.timeline.now() + ms;
        while let Some(deadline) = self.timeline.next_deadline() {
            if deadline > target {
                break;
            }
            self.step(deadline);
        }
        self.step(target);
    }

    /// Run every pending transition to its end.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.timeline.next_deadline() {
            self.step(deadline);
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn select_day(&mut self, index: usize) {
        let Some(record) = self.data.get(index) else {
            return;
        };
        if record.total == 0 {
            tracing::debug!(date = %record.date, "Nothing tracked on this day");
            return;
        }
        self.navigate(Overview::Day, Selection::Day(index));
    }

    fn select_period(&mut self, next: Overview, period: Period, anchor: NaiveDate) {
        if !period_has_data(&self.data, period) {
            tracing::debug!(period = %period.display_name(), "No records in period");
            return;
        }
        let node = aggregate_where(&self.data, anchor, |r| period.contains(r.date));
        self.navigate(next, Selection::Period(node));
    }

    fn navigate(&mut self, next: Overview, selection: Selection) {
        tracing::info!(from = %self.overview, to = %next, "Navigating");
        self.selection = Some(selection);
        self.start_transition(next);
    }

    /// Start the exit of the current level; `next` renders once it is done.
    fn start_transition(&mut self, next: Overview) {
        self.hovered = None;
        self.hide_tooltip();
        let current = self.overview;
        let exiting = levels::exit(&mut self.canvas(), current);
        self.overview = next;
        self.context = LevelContext::Empty;

        let barrier = Barrier::arm(exiting);
        if barrier.is_open() {
            self.enter_level();
        } else {
            tracing::debug!(exiting, "Waiting for exit transitions");
            self.phase = NavPhase::Exiting(barrier);
        }
    }

    /// Render the current overview and wait for its entrance.
    fn enter_level(&mut self) {
        if self.overview == Overview::Day && !matches!(self.selection, Some(Selection::Day(_))) {
            // Without a selected day the most recent record is shown.
            if let Some(last) = self.data.len().checked_sub(1) {
                self.selection = Some(Selection::Day(last));
            }
        }
        let anchor = self
            .selection
            .as_ref()
            .and_then(|selection| selection.date(&self.data))
            .unwrap_or(self.today);
        let day = match self.selection {
            Some(Selection::Day(index)) => Some(index),
            _ => None,
        };

        let overview = self.overview;
        let rendered = levels::render(&mut self.canvas(), overview, anchor, day);
        self.context = rendered.context;

        if self.history.last() != Some(&overview) {
            self.history.push(overview);
        }

        let barrier = Barrier::arm(rendered.entering);
        if barrier.is_open() {
            self.phase = NavPhase::Idle;
        } else {
            tracing::debug!(entering = rendered.entering, "Waiting for entrance transitions");
            self.phase = NavPhase::Entering(barrier);
        }
    }

    fn step(&mut self, time: u64) {
        let finished = self
            .timeline
            .advance_to(time, &mut self.scene, &mut self.tooltip);
        for done in finished {
            self.on_finished(done);
        }
    }

    fn on_finished(&mut self, done: Finished) {
        let opened = match (done.phase, &mut self.phase) {
            (Phase::Exit, NavPhase::Exiting(barrier))
            | (Phase::Enter, NavPhase::Entering(barrier)) => barrier.complete_one(),
            _ => false,
        };
        if !opened {
            return;
        }
        if done.phase == Phase::Exit {
            // The next level is drawn with the refitted settings anyway.
            self.pending_resize = false;
            self.enter_level();
        } else if self.pending_resize {
            tracing::debug!(overview = %self.overview, "Redrawing after resize");
            self.pending_resize = false;
            self.hovered = None;
            self.enter_level();
        } else {
            tracing::debug!(overview = %self.overview, "Transition complete");
            self.phase = NavPhase::Idle;
        }
    }

    fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            scene: &mut self.scene,
            timeline: &mut self.timeline,
            jitter: &mut self.jitter,
            settings: &self.settings,
            data: &self.data,
            color: self.color,
        }
    }

    // ========================================================================
    // Hover effects
    // ========================================================================

    fn dispatch_detail(&mut self, day: usize, detail: usize) {
        let Some(entry) = self.data.get(day).and_then(|r| r.details.get(detail)) else {
            return;
        };
        match self.handler.as_mut() {
            Some(handler) => handler(entry),
            None => tracing::debug!(name = %entry.name, "Detail clicked without a handler"),
        }
    }

    /// Dim the level's items that do not match a hovered label.
    fn highlight(&mut self, label: &Binding) {
        let class = levels::highlight_class(self.overview);
        for id in self.scene.with_class(class) {
            let Some(item) = self.scene.get(id) else {
                continue;
            };
            let matches = levels::label_matches(&self.data, label, &item.binding).unwrap_or(false);
            let opacity = if matches { 1.0 } else { levels::DIMMED_OPACITY };
            self.fade(id, opacity);
        }
    }

    fn restore_highlight(&mut self) {
        let opacity = levels::resting_opacity(self.overview);
        for id in self.scene.with_class(levels::highlight_class(self.overview)) {
            self.fade(id, opacity);
        }
    }

    fn fade(&mut self, id: ElementId, opacity: f64) {
        self.timeline.schedule(
            Tween::opacity(Target::Element(id), opacity).duration(self.settings.transition_duration),
        );
    }

    fn show_tooltip(&mut self, placement: TooltipPlacement) {
        self.tooltip.show(placement.lines, placement.x, placement.y);
        self.timeline
            .schedule(Tween::opacity(Target::Tooltip, 1.0).duration(self.settings.half_duration()));
    }

    fn hide_tooltip(&mut self) {
        self.timeline
            .schedule(Tween::opacity(Target::Tooltip, 0.0).duration(self.settings.half_duration()));
    }
}
