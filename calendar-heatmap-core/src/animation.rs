//! Timed transitions on a virtual clock.
//!
//! Every transition is linear. The clock only moves when the host calls
//! [`Timeline::advance_to`]; there is no background thread.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::{ElementId, Scene};

/// What a transition animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Element(ElementId),
    Tooltip,
}

/// Animated attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Opacity,
    X,
}

/// Role of a transition in a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Entrance of a freshly bound element; counted by the enter barrier
    Enter,
    /// Exit of an element of the previous level; counted by the exit barrier
    Exit,
    /// Hover dimming, tooltip fades, button fade-in
    Effect,
}

#[derive(Debug, Clone)]
struct Transition {
    target: Target,
    property: Property,
    /// Captured when the transition starts
    from: Option<f64>,
    to: f64,
    start: u64,
    duration: u64,
    phase: Phase,
    remove_on_end: bool,
}

impl Transition {
    fn end(&self) -> u64 {
        self.start + self.duration
    }
}

/// A transition that ran to its end (or was cut short by a newer one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub target: Target,
    pub phase: Phase,
}

/// Builder for a transition to schedule.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    target: Target,
    property: Property,
    to: f64,
    delay: u64,
    duration: u64,
    phase: Phase,
    remove_on_end: bool,
}

impl Tween {
    pub fn opacity(target: Target, to: f64) -> Self {
        Self {
            target,
            property: Property::Opacity,
            to,
            delay: 0,
            duration: 0,
            phase: Phase::Effect,
            remove_on_end: false,
        }
    }

    pub fn x(target: Target, to: f64) -> Self {
        Self {
            property: Property::X,
            ..Self::opacity(target, to)
        }
    }

    pub fn delay(mut self, ms: u64) -> Self {
        self.delay = ms;
        self
    }

    pub fn duration(mut self, ms: u64) -> Self {
        self.duration = ms;
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Remove the element from the scene once the transition ends.
    pub fn remove(mut self) -> Self {
        self.remove_on_end = true;
        self
    }
}

/// Opacity of the tooltip overlay; the only animated value outside the scene.
pub trait TooltipOpacity {
    fn opacity(&self) -> f64;
    fn set_opacity(&mut self, value: f64);
}

/// Pending transitions and the virtual clock they run on.
#[derive(Debug, Default)]
pub struct Timeline {
    now: u64,
    transitions: Vec<Transition>,
    interrupted: Vec<Finished>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the heatmap was mounted.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a transition starting `delay` ms from now.
    ///
    /// A newer transition on the same target and property replaces the older
    /// one; the replaced transition is reported as finished on the next
    /// advance so barriers waiting on it still open.
    pub fn schedule(&mut self, tween: Tween) {
        let now = self.now;
        let mut replaced = Vec::new();
        self.transitions.retain(|t| {
            let same = t.target == tween.target && t.property == tween.property;
            if same {
                replaced.push(Finished {
                    target: t.target,
                    phase: t.phase,
                });
            }
            !same
        });
        self.interrupted
            .extend(replaced.into_iter().filter(|f| f.phase != Phase::Effect));
        self.transitions.push(Transition {
            target: tween.target,
            property: tween.property,
            from: None,
            to: tween.to,
            start: now + tween.delay,
            duration: tween.duration,
            phase: tween.phase,
            remove_on_end: tween.remove_on_end,
        });
    }

    /// Drop transitions of elements that no longer exist.
    pub fn forget(&mut self, ids: &[ElementId]) {
        self.transitions.retain(|t| match t.target {
            Target::Element(id) => !ids.contains(&id),
            Target::Tooltip => true,
        });
    }

    /// Earliest time at which something finishes.
    pub fn next_deadline(&self) -> Option<u64> {
        if !self.interrupted.is_empty() {
            return Some(self.now);
        }
        self.transitions.iter().map(Transition::end).min()
    }

    /// Move the clock to `time`, interpolating running transitions and
    /// completing those that end on or before it, in end order.
    pub fn advance_to<T: TooltipOpacity>(
        &mut self,
        time: u64,
        scene: &mut Scene,
        tooltip: &mut T,
    ) -> Vec<Finished> {
        let time = time.max(self.now);
        self.now = time;

        let mut finished = std::mem::take(&mut self.interrupted);
        let mut done: Vec<Transition> = Vec::new();
        let mut running: Vec<Transition> = Vec::new();
        for transition in std::mem::take(&mut self.transitions) {
            if transition.end() <= time {
                done.push(transition);
            } else {
                running.push(transition);
            }
        }

        for transition in running.iter_mut() {
            if transition.start > time {
                continue;
            }
            let from = match transition.from {
                Some(from) => from,
                None => {
                    let current = read(scene, tooltip, transition.target, transition.property);
                    transition.from = current;
                    match current {
                        Some(value) => value,
                        None => continue,
                    }
                }
            };
            let t = (time - transition.start) as f64 / transition.duration.max(1) as f64;
            write(
                scene,
                tooltip,
                transition.target,
                transition.property,
                from + (transition.to - from) * t,
            );
        }

        done.sort_by_key(Transition::end);
        for transition in done {
            write(
                scene,
                tooltip,
                transition.target,
                transition.property,
                transition.to,
            );
            if transition.remove_on_end {
                if let Target::Element(id) = transition.target {
                    let removed = scene.remove(id);
                    running.retain(|t| match t.target {
                        Target::Element(other) => !removed.contains(&other),
                        Target::Tooltip => true,
                    });
                }
            }
            finished.push(Finished {
                target: transition.target,
                phase: transition.phase,
            });
        }

        self.transitions = running;
        finished
    }
}

fn read<T: TooltipOpacity>(
    scene: &Scene,
    tooltip: &T,
    target: Target,
    property: Property,
) -> Option<f64> {
    match (target, property) {
        (Target::Tooltip, Property::Opacity) => Some(tooltip.opacity()),
        (Target::Tooltip, Property::X) => None,
        (Target::Element(id), Property::Opacity) => scene.get(id).map(|el| el.opacity),
        (Target::Element(id), Property::X) => scene.get(id).map(|el| el.shape.x()),
    }
}

fn write<T: TooltipOpacity>(
    scene: &mut Scene,
    tooltip: &mut T,
    target: Target,
    property: Property,
    value: f64,
) {
    match (target, property) {
        (Target::Tooltip, Property::Opacity) => tooltip.set_opacity(value),
        (Target::Tooltip, Property::X) => {}
        (Target::Element(id), Property::Opacity) => {
            if let Some(el) = scene.get_mut(id) {
                el.opacity = value;
            }
        }
        (Target::Element(id), Property::X) => {
            if let Some(el) = scene.get_mut(id) {
                el.shape.set_x(value);
            }
        }
    }
}

/// Fan-in counter: opens once every armed transition has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Barrier {
    pending: usize,
}

impl Barrier {
    /// A barrier over `count` transitions; zero is already open.
    pub fn arm(count: usize) -> Self {
        Self { pending: count }
    }

    pub fn is_open(&self) -> bool {
        self.pending == 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Record one completion. Returns true when this opened the barrier.
    pub fn complete_one(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        self.pending == 0
    }
}

/// Entrance delays: a linear stagger for the global level and a bounded
/// cosine jitter for the others.
#[derive(Debug)]
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Delay in `[0, duration / 2]`, clustered towards both ends.
    pub fn delay(&mut self, duration: u64) -> u64 {
        let r: f64 = self.rng.gen_range(0.0..1.0);
        let spread = (std::f64::consts::PI * r).cos() + 1.0;
        (spread / 4.0 * duration as f64).round() as u64
    }

    /// Delay for the `index`-th element of a staggered entrance.
    pub fn stagger(index: usize, duration: u64) -> u64 {
        duration * (index as u64 + 1) / 10
    }
}
