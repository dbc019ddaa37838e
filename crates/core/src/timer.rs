/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! The IntervalTimer - a countdown that can fire once, loop forever, or loop a fixed number of times.
//!
//! The timer does not know about clocks. It is moved forward exclusively by whoever
//! owns it calling [`IntervalTimer::tick`] with the time that passed since the last call;
//! in a Bevy app this is the `tick_interval_timers` System, but nothing stops you from
//! driving one by hand (e.g. from a turn counter, a replay, or a test).
//!
//! Every full interval that passes is counted and reported individually, even if it
//! all happens within one oversized tick (e.g. after a long loading hitch), up to
//! [`types::MAX_COMPLETIONS_PER_TICK`] per tick. The leftover time past the last
//! completion carries over into the next interval.

use crate::config::IntervalTimerConfig;
use crate::errors::{self, TimerConfigError};
use crate::sink::CompletionSink;
use crate::types::{self, LoopCount, Seconds};

use bevy::prelude::Component;


/// Coarse lifecycle of a timer.
///
/// - Idle: not started since the last reset or configure. Elapsed time is zero unless
///   it was moved by hand via [`IntervalTimer::adjust_elapsed`].
/// - Running: ticks accumulate time.
/// - Stopped: not running, but keeps whatever time it had accumulated; starting it
///   again resumes from there.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, bevy::reflect::Reflect)]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Stopped,
}


/// What happened during a single [`IntervalTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// How many intervals were completed (and how many times the sink was invoked).
    pub completions: u32,

    /// The loop count at the start of the tick.
    /// The n-th completion of this tick (counting from 1) finished loop `loops_before + n`.
    /// For a one-shot this is normally 0, but a timer switched to one-shot mid-run via
    /// [`IntervalTimer::set_one_shot`] keeps counting from where its loops left off.
    pub loops_before: LoopCount,

    /// True if this tick stopped the timer (one-shot done or loop bound reached).
    pub stopped: bool,
}

impl TickReport {
    pub fn completed(&self) -> bool {
        self.completions > 0
    }

    /// The 1-based loop numbers finished during this tick, in order.
    pub fn loop_indices(&self) -> core::ops::RangeInclusive<LoopCount> {
        self.loops_before.saturating_add(1)..=self.loops_before.saturating_add(self.completions)
    }

    /// Loop number of the last completion in this tick, if there was one.
    pub fn last_loop_index(&self) -> Option<LoopCount> {
        self.completed().then(|| self.loops_before.saturating_add(self.completions))
    }
}


/// A reusable countdown/looping timer.
///
/// Freshly created timers are one-second one-shots that are not running.
/// Reconfigure them with [`IntervalTimer::configure`] (or the [`IntervalTimerConfig`]-based
/// [`IntervalTimer::apply_config`]), then [`start`](IntervalTimer::start) them and feed
/// them deltas via [`tick`](IntervalTimer::tick).
///
/// As a Component, timers are ticked for you by the `tick_interval_timers` System
/// (see `MetronomePlugin`), which also turns completions into Events.
#[derive(Component, Debug, Clone)]
pub struct IntervalTimer {
    duration: Seconds,
    elapsed: Seconds,
    state: TimerState,
    one_shot: bool,
    auto_start: bool,
    loop_stop_count: LoopCount,
    loop_count: LoopCount,
    logging: bool,
    on_complete: Option<CompletionSink>,
}

impl Default for IntervalTimer {
    fn default() -> Self {
        let config = IntervalTimerConfig::default();
        Self {
            duration: config.duration,
            elapsed: 0.,
            state: TimerState::Idle,
            one_shot: config.one_shot,
            auto_start: config.auto_start,
            loop_stop_count: config.loop_stop_count,
            loop_count: 0,
            logging: config.logging,
            on_complete: None,
        }
    }
}

impl IntervalTimer {
    /// A one-shot, not-yet-running timer of the given length.
    pub fn new(duration: Seconds) -> Result<Self, TimerConfigError> {
        Self::from_config(&IntervalTimerConfig::one_shot(duration), None)
    }

    /// Builds a timer out of a config and an optional callback.
    /// If the config says so, the timer comes out already running.
    pub fn from_config(
        config: &IntervalTimerConfig,
        on_complete: Option<CompletionSink>,
    ) -> Result<Self, TimerConfigError> {
        let mut timer = Self::default();
        timer.apply_config(config, on_complete)?;
        Ok(timer)
    }

    /// Replaces the whole configuration in one go and resets the timer.
    ///
    /// Fails (without touching anything) if the duration is not positive or if
    /// `one_shot` is combined with a non-zero `loop_stop_count`. On success the timer
    /// is reset to zero with no completed loops and, if `auto_start` is set, started.
    pub fn configure(
        &mut self,
        duration: Seconds,
        on_complete: Option<CompletionSink>,
        one_shot: bool,
        auto_start: bool,
        loop_stop_count: LoopCount,
    ) -> Result<&mut Self, TimerConfigError> {
        errors::check_duration(duration)?;
        errors::check_loop_mode(one_shot, loop_stop_count)?;

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "IntervalTimer::configure(): {:?}s, one_shot: {:?}, auto_start: {:?}, loop_stop_count: {:?}",
            duration, one_shot, auto_start, loop_stop_count
        );

        self.duration = duration;
        self.on_complete = on_complete;
        self.one_shot = one_shot;
        self.auto_start = auto_start;
        self.loop_stop_count = loop_stop_count;
        self.loop_count = 0;
        self.reset();

        if auto_start {
            self.start();
        }

        Ok(self)
    }

    /// Like [`Self::configure`], but takes the settings from a config value.
    /// Also carries over the config's logging flag.
    pub fn apply_config(
        &mut self,
        config: &IntervalTimerConfig,
        on_complete: Option<CompletionSink>,
    ) -> Result<&mut Self, TimerConfigError> {
        config.validate()?;
        self.logging = config.logging;
        self.configure(
            config.duration,
            on_complete,
            config.one_shot,
            config.auto_start,
            config.loop_stop_count,
        )
    }

    /// Snapshot of the current settings as a config value.
    pub fn config(&self) -> IntervalTimerConfig {
        IntervalTimerConfig {
            duration: self.duration,
            one_shot: self.one_shot,
            auto_start: self.auto_start,
            loop_stop_count: self.loop_stop_count,
            logging: self.logging,
        }
    }

    /// Host 'on start' hook; starts the timer if it is set to auto-start.
    /// Meant to be called once, before the first tick. Calling it again is harmless.
    pub fn initialize(&mut self) -> &mut Self {
        if self.auto_start {
            self.start();
        }
        self
    }

    /// Starts (or resumes) the timer. Does nothing if it is already running.
    ///
    /// A timer with a loop bound is always a looping timer, so this clears `one_shot`
    /// if a loop bound has been set through the property setters.
    pub fn start(&mut self) -> &mut Self {
        if self.is_running() {
            return self;
        }

        self.state = TimerState::Running;

        if self.loop_stop_count > 0 {
            self.one_shot = false;
        }

        #[cfg(feature = "logging")]
        bevy::log::debug!("IntervalTimer::start(): resuming at {:?}/{:?}s", self.elapsed, self.duration);

        self
    }

    /// Stops the timer and forgets the completed loops. Keeps the elapsed time.
    pub fn stop(&mut self) -> &mut Self {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;

            #[cfg(feature = "logging")]
            bevy::log::debug!("IntervalTimer::stop(): stopped at {:?}/{:?}s", self.elapsed, self.duration);
        }
        self.loop_count = 0;
        self
    }

    /// Zeroes the elapsed time and stops the timer. The loop count is left alone.
    pub fn reset(&mut self) -> &mut Self {
        self.elapsed = 0.;
        self.state = TimerState::Idle;

        #[cfg(feature = "logging")]
        if self.logging {
            bevy::log::info!("Timer reset");
        }

        self
    }

    /// Nudges the elapsed time by `adjustment` (either sign), keeping it within [0, duration].
    /// Does not start or stop anything, even if this lands exactly on the duration;
    /// an Idle timer stays Idle. NaN adjustments are ignored.
    pub fn adjust_elapsed(&mut self, adjustment: Seconds) -> &mut Self {
        if adjustment.is_nan() {
            return self;
        }
        self.elapsed = (self.elapsed + adjustment).clamp(0., self.duration);
        self
    }

    /// Advances the timer by `delta` seconds, firing the callback once per completed interval.
    ///
    /// Deltas are expected to be non-negative; negative and NaN deltas are treated as zero.
    /// A single tick fires at most [`types::MAX_COMPLETIONS_PER_TICK`] completions; if the
    /// delta covers more intervals than that (including an infinite delta), the surplus
    /// intervals are skipped and only the offset into the current interval carries over.
    pub fn tick(&mut self, delta: Seconds) -> TickReport {
        let mut report = TickReport {
            loops_before: self.loop_count,
            ..Default::default()
        };

        if !self.is_running() {
            return report;
        }

        if delta > 0. {
            self.elapsed += delta;
        }

        self.drop_surplus_intervals();

        while self.elapsed >= self.duration && report.completions < types::MAX_COMPLETIONS_PER_TICK {
            self.elapsed -= self.duration;
            report.completions += 1;

            if let Some(sink) = &self.on_complete {
                sink.notify();
            }

            if self.one_shot {
                self.stop();
                report.stopped = true;
                break;
            }

            self.loop_count = self.loop_count.saturating_add(1);

            if self.loop_stop_count > 0 && self.loop_count >= self.loop_stop_count {
                self.stop();
                report.stopped = true;
                break;
            }
        }

        report
    }

    /// Folds an elapsed time spanning more than a tick's worth of intervals back down
    /// to exactly that many intervals plus the current phase.
    ///
    /// Keeps the completion loop in `tick` from subtracting a duration that is too small
    /// to change a huge (or infinite) elapsed value.
    fn drop_surplus_intervals(&mut self) {
        let cap = types::MAX_COMPLETIONS_PER_TICK as Seconds;

        if self.elapsed / self.duration < cap {
            return;
        }

        let phase = match self.elapsed.is_finite() {
            true => self.elapsed % self.duration,
            false => 0.,
        };

        #[cfg(feature = "logging")]
        if self.logging {
            bevy::log::warn!(
                "IntervalTimer::tick(): {:?}s elapsed covers more than {:?} intervals of {:?}s; skipping the surplus",
                self.elapsed, types::MAX_COMPLETIONS_PER_TICK, self.duration
            );
        }

        self.elapsed = phase + cap * self.duration;
    }

    /* =====    Queries    ===== */

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// True for a one-shot timer that has reached its duration but not wrapped yet.
    ///
    /// Since completions wrap the elapsed time back around, for ticked timers this is
    /// mostly observable after [`Self::adjust_elapsed`] pushes a one-shot to its end.
    pub fn is_finished(&self) -> bool {
        self.one_shot && self.elapsed >= self.duration
    }

    pub fn remaining_time(&self) -> Seconds {
        (self.duration - self.elapsed).max(0.)
    }

    pub fn elapsed_time(&self) -> Seconds {
        self.elapsed
    }

    /// Fraction of the current interval that has passed, in [0, 1].
    pub fn fraction(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0., 1.)
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn loop_stop_count(&self) -> LoopCount {
        self.loop_stop_count
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    pub fn is_unbounded(&self) -> bool {
        !self.one_shot && self.loop_stop_count == types::UNBOUNDED_LOOPS
    }

    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    pub fn on_complete(&self) -> Option<&CompletionSink> {
        self.on_complete.as_ref()
    }

    /* =====    Property-style setters    ===== */
    // These mirror the knobs a designer gets in an inspector; they are unchecked.
    // Prefer configure() when changing more than one thing.

    pub fn set_one_shot(&mut self, val: bool) -> &mut Self {
        self.one_shot = val; self
    }

    pub fn set_loop_stop_count(&mut self, val: LoopCount) -> &mut Self {
        self.loop_stop_count = val; self
    }

    pub fn set_auto_start(&mut self, val: bool) -> &mut Self {
        self.auto_start = val; self
    }

    pub fn set_logging(&mut self, val: bool) -> &mut Self {
        self.logging = val; self
    }

    pub fn set_on_complete(&mut self, sink: Option<CompletionSink>) -> &mut Self {
        self.on_complete = sink; self
    }
}
