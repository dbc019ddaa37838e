/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Type aliases and 'abstracting' newtypes.

/// Type alias to make it easier to switch out what datatype is used for timekeeping.
/// All durations and deltas in this library are plain seconds.
pub type Seconds = f32;

/// Counter type for completed loops.
pub type LoopCount = u32;

/// Default interval length for a freshly created timer.
pub const DEFAULT_DURATION: Seconds = 1.;

/// Sentinel value for [`crate::timer::IntervalTimer::loop_stop_count`] meaning 'loop forever'.
pub const UNBOUNDED_LOOPS: LoopCount = 0;

/// Upper bound on the completions a single tick will fire.
/// Whole intervals past this are dropped; the phase within the current interval is kept.
pub const MAX_COMPLETIONS_PER_TICK: LoopCount = 1024;

// Type aliases - to express intent better.
pub type TimerEntity = bevy::prelude::Entity;

pub use crate::sink::CompletionSink;
pub use crate::sink::CompletionSinkFn;

pub type TimerPresetKey = crate::identifiers::TimerPresetIdentifier;
