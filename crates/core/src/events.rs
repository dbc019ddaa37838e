/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

use bevy::prelude::*;

use crate::config::IntervalTimerConfig;
use crate::errors::TimerConfigError;
use crate::sink::CompletionSink;
use crate::types::{self, LoopCount, Seconds};


/// An Event that signals an IntervalTimer Component has completed an interval.
///
/// Raised once per completion by the tick System - if a long frame covered three
/// intervals, you get three of these, numbered accordingly.
///
/// This is the ECS-flavored counterpart of the timer's CompletionSink; both fire.
#[derive(EntityEvent, Debug, Clone)]
pub struct IntervalTimerCompleted {
    /// The Entity holding the timer.
    pub entity: types::TimerEntity,

    /// Which loop this completion finished, counting from 1 since the timer was last
    /// started from scratch. One-shot timers report 1, unless they were switched over
    /// from looping mid-run; then they continue the numbering of the loops before.
    pub loop_index: LoopCount,

    /// True if this completion also stopped the timer (one-shot, or last bounded loop).
    pub stopped: bool,
}

impl IntervalTimerCompleted {
    pub fn new(entity: Entity, loop_index: LoopCount, stopped: bool) -> Self {
        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "Creating a new IntervalTimerCompleted event for {:?} (loop {:?}, stopped: {:?})",
            entity, loop_index, stopped
        );

        Self {
            entity: entity,
            loop_index: loop_index,
            stopped: stopped,
        }
    }
}

/// An Event that signals an IntervalTimer stopped itself during a tick,
/// either because it was a one-shot or because it hit its loop bound.
///
/// Explicit stops (via [`StopIntervalTimerRequested`] or calling `stop()`) do NOT raise this.
#[derive(EntityEvent, Debug, Clone)]
pub struct IntervalTimerFinished {
    pub entity: types::TimerEntity,

    /// Total completions in the run that just ended.
    pub completed_loops: LoopCount,
}


/// Asks the library to start the timer on the target Entity.
#[derive(EntityEvent, Debug, Clone)]
pub struct StartIntervalTimerRequested {
    pub entity: types::TimerEntity,
}

/// Asks the library to stop the timer on the target Entity.
#[derive(EntityEvent, Debug, Clone)]
pub struct StopIntervalTimerRequested {
    pub entity: types::TimerEntity,
}

/// Asks the library to reset the timer on the target Entity.
#[derive(EntityEvent, Debug, Clone)]
pub struct ResetIntervalTimerRequested {
    pub entity: types::TimerEntity,
}

/// Asks the library to nudge the elapsed time of the timer on the target Entity.
#[derive(EntityEvent, Debug, Clone)]
pub struct AdjustIntervalTimerRequested {
    pub entity: types::TimerEntity,
    pub delta: Seconds,
}

/// Asks the library to reconfigure the timer on the target Entity.
///
/// If the Entity has no IntervalTimer yet, one is inserted.
/// Invalid configs are rejected with an [`IntervalTimerConfigRejected`] Event.
#[derive(EntityEvent, Debug, Clone)]
pub struct ConfigureIntervalTimerRequested {
    pub entity: types::TimerEntity,
    pub config: IntervalTimerConfig,
    pub on_complete: Option<CompletionSink>,
}

impl ConfigureIntervalTimerRequested {
    pub fn new(entity: Entity, config: IntervalTimerConfig) -> Self {
        Self { entity, config, on_complete: None }
    }

    pub fn with_sink(entity: Entity, config: IntervalTimerConfig, sink: CompletionSink) -> Self {
        Self { entity, config, on_complete: Some(sink) }
    }
}

/// An Event notifying Observers that a ConfigureIntervalTimerRequested was refused.
/// The timer (if any) was left exactly as it was.
#[derive(EntityEvent, Debug, Clone)]
pub struct IntervalTimerConfigRejected {
    pub entity: types::TimerEntity,
    pub error: TimerConfigError,
}
