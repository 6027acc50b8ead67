//! Timer-driven animation phases on an explicit, single-threaded clock.
//!
//! Every interval timer is owned by an [`IntervalHandle`]; dropping or
//! cancelling the handle removes the timer, so a torn-down view can never see
//! another tick.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::layout::BBox;
use super::types::Relationship;
use crate::config::AnimationConfig;

#[derive(Debug)]
struct Interval {
    period: Duration,
    next_due: Duration,
    pending: u64,
}

#[derive(Debug, Default)]
struct SchedulerInner {
    now: Duration,
    next_id: u64,
    intervals: BTreeMap<u64, Interval>,
}

/// Cooperative clock. The host advances it (from a frame callback, or a mock
/// in tests); due intervals accumulate ticks for their owners to drain.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Start an interval firing every `period`. A zero period is treated as
    /// one millisecond.
    pub fn every(&self, period: Duration) -> IntervalHandle {
        let period = period.max(Duration::from_millis(1));
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let next_due = inner.now + period;
        inner.intervals.insert(
            id,
            Interval {
                period,
                next_due,
                pending: 0,
            },
        );
        log::trace!("interval {id} started, period {period:?}");
        IntervalHandle {
            id,
            scheduler: Rc::downgrade(&self.inner),
        }
    }

    /// Move the clock forward, crediting every interval that came due. The
    /// clock saturates instead of overflowing.
    pub fn advance(&self, dt: Duration) {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now.saturating_add(dt);
        inner.now = now;
        for interval in inner.intervals.values_mut() {
            if interval.next_due > now {
                continue;
            }
            let period = interval.period.as_nanos();
            let overdue = (now - interval.next_due).as_nanos();
            let ticks = u64::try_from(overdue / period + 1).unwrap_or(u64::MAX);
            interval.pending = interval.pending.saturating_add(ticks);
            let into_period = u64::try_from(overdue % period).unwrap_or(u64::MAX);
            let until_next = interval.period.saturating_sub(Duration::from_nanos(into_period));
            interval.next_due = now.saturating_add(until_next);
        }
    }

    pub fn active_intervals(&self) -> usize {
        self.inner.borrow().intervals.len()
    }
}

/// Owning handle to one interval.
#[derive(Debug)]
pub struct IntervalHandle {
    id: u64,
    scheduler: Weak<RefCell<SchedulerInner>>,
}

impl IntervalHandle {
    /// Ticks accumulated since the last call.
    pub fn take_ticks(&self) -> u64 {
        let Some(inner) = self.scheduler.upgrade() else {
            return 0;
        };
        let mut inner = inner.borrow_mut();
        inner
            .intervals
            .get_mut(&self.id)
            .map(|i| std::mem::take(&mut i.pending))
            .unwrap_or(0)
    }

    pub fn cancel(self) {}
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade() {
            inner.borrow_mut().intervals.remove(&self.id);
            log::trace!("interval {} cancelled", self.id);
        }
    }
}

/// How a phase counter moves on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMode {
    /// Count up to `len` and stay there.
    Once { len: usize },
    /// `(phase + 1) % (len + 1)`: reveal all, then start over from nothing.
    Cycle { len: usize },
}

impl PhaseMode {
    /// Phase after `ticks` steps from `phase`.
    fn step_by(self, phase: usize, ticks: u64) -> usize {
        match self {
            PhaseMode::Once { len } => phase
                .saturating_add(usize::try_from(ticks).unwrap_or(usize::MAX))
                .min(len),
            PhaseMode::Cycle { len } => {
                let wrap = len as u128 + 1;
                ((phase as u128 + ticks as u128) % wrap) as usize
            }
        }
    }
}

/// Phase counter driven by an owned interval.
#[derive(Debug)]
pub struct PhaseTicker {
    mode: PhaseMode,
    period: Duration,
    phase: usize,
    handle: Option<IntervalHandle>,
}

impl PhaseTicker {
    pub fn new(mode: PhaseMode, period: Duration) -> Self {
        Self {
            mode,
            period,
            phase: 0,
            handle: None,
        }
    }

    /// Start ticking. Restarting an already running ticker applies its
    /// pending ticks, then replaces its interval rather than stacking a
    /// second one.
    pub fn start(&mut self, scheduler: &Scheduler) {
        self.sync();
        self.handle = Some(scheduler.every(self.period));
    }

    /// Stop ticking; pending ticks are applied first.
    pub fn stop(&mut self) {
        self.sync();
        self.handle = None;
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Apply ticks accumulated since the last sync and return the phase.
    pub fn sync(&mut self) -> usize {
        if let Some(handle) = &self.handle {
            self.phase = self.mode.step_by(self.phase, handle.take_ticks());
        }
        self.phase
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn mode(&self) -> PhaseMode {
        self.mode
    }

    pub fn reset(&mut self, mode: PhaseMode) {
        self.mode = mode;
        self.phase = 0;
    }
}

pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(800);

/// Reveals relationships one at a time while playing, all at once while
/// paused.
#[derive(Debug)]
pub struct ConnectionReveal {
    ticker: PhaseTicker,
    len: usize,
    playing: bool,
}

impl ConnectionReveal {
    /// Looping reveal over `len` relationships.
    pub fn looping(len: usize, interval: Duration) -> Self {
        Self {
            ticker: PhaseTicker::new(PhaseMode::Cycle { len }, interval),
            len,
            playing: false,
        }
    }

    /// Reveal that stops once everything is shown.
    pub fn once(len: usize, interval: Duration) -> Self {
        Self {
            ticker: PhaseTicker::new(PhaseMode::Once { len }, interval),
            len,
            playing: false,
        }
    }

    /// Mode and interval from the `[animation]` section.
    pub fn from_config(animation: &AnimationConfig, len: usize) -> Self {
        if animation.reveal_loop {
            Self::looping(len, animation.reveal_interval())
        } else {
            Self::once(len, animation.reveal_interval())
        }
    }

    /// How many of `len` relationships a reveal started at time zero shows
    /// after `elapsed`.
    pub fn visible_at(animation: &AnimationConfig, len: usize, elapsed: Duration) -> usize {
        let scheduler = Scheduler::new();
        let mut reveal = Self::from_config(animation, len);
        reveal.play(&scheduler);
        scheduler.advance(elapsed);
        reveal.visible_count()
    }

    pub fn mode(&self) -> PhaseMode {
        self.ticker.mode()
    }

    /// Phase as of the last sync.
    pub fn phase(&self) -> usize {
        self.ticker.phase()
    }

    pub fn play(&mut self, scheduler: &Scheduler) {
        if !self.playing {
            self.ticker.start(scheduler);
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.ticker.stop();
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The filtered list changed size: start the reveal over.
    pub fn set_len(&mut self, len: usize) {
        if len == self.len {
            return;
        }
        self.ticker.sync();
        let mode = match self.ticker.mode {
            PhaseMode::Once { .. } => PhaseMode::Once { len },
            PhaseMode::Cycle { .. } => PhaseMode::Cycle { len },
        };
        self.ticker.reset(mode);
        self.len = len;
    }

    /// Number of relationships currently shown.
    pub fn visible_count(&mut self) -> usize {
        let phase = self.ticker.sync();
        if self.playing { phase.min(self.len) } else { self.len }
    }

    pub fn visible<'a>(&mut self, relationships: &'a [Relationship]) -> &'a [Relationship] {
        let n = self.visible_count().min(relationships.len());
        &relationships[..n]
    }

    /// Tear down: stops the interval for good.
    pub fn unmount(mut self) -> usize {
        self.ticker.stop();
        self.ticker.phase()
    }
}

/// Passive viewport observer for one section.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    pub threshold: f64,
    pub trigger_once: bool,
    visible: bool,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            trigger_once: true,
            visible: false,
        }
    }
}

impl VisibilityGate {
    pub fn new(threshold: f64, trigger_once: bool) -> Self {
        Self {
            threshold,
            trigger_once,
            visible: false,
        }
    }

    /// Share of `section` inside `viewport`, in [0, 1].
    pub fn intersection_ratio(section: &BBox, viewport: &BBox) -> f64 {
        let area = section.width * section.height;
        if area <= 0.0 {
            return 0.0;
        }
        (section.intersection_area(viewport) / area).clamp(0.0, 1.0)
    }

    /// Feed a new observation. Returns `Some(now_visible)` when the state
    /// flipped, `None` otherwise. A latched gate never flips back.
    pub fn observe(&mut self, section: &BBox, viewport: &BBox) -> Option<bool> {
        if self.trigger_once && self.visible {
            return None;
        }
        let ratio = Self::intersection_ratio(section, viewport);
        let intersecting = ratio > 0.0 && ratio >= self.threshold;
        if intersecting == self.visible {
            return None;
        }
        self.visible = intersecting;
        Some(intersecting)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A reveal that plays only while its section is on screen.
#[derive(Debug)]
pub struct RevealSection {
    gate: VisibilityGate,
    reveal: ConnectionReveal,
}

impl RevealSection {
    pub fn new(gate: VisibilityGate, reveal: ConnectionReveal) -> Self {
        Self { gate, reveal }
    }

    /// Feed a scroll or resize observation. Becoming visible starts the
    /// reveal; becoming hidden stops its interval.
    pub fn observe(
        &mut self,
        section: &BBox,
        viewport: &BBox,
        scheduler: &Scheduler,
    ) -> Option<bool> {
        let change = self.gate.observe(section, viewport);
        match change {
            Some(true) => self.reveal.play(scheduler),
            Some(false) => self.reveal.pause(),
            None => {}
        }
        change
    }

    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    pub fn reveal_mut(&mut self) -> &mut ConnectionReveal {
        &mut self.reveal
    }

    pub fn unmount(self) -> usize {
        self.reveal.unmount()
    }
}
