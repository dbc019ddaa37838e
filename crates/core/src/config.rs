/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Plain-data timer configuration.
//!
//! This is everything about an [`IntervalTimer`](crate::timer::IntervalTimer) that a
//! designer would want to tweak (durations, looping behavior, etc.), pulled out into
//! a standalone value so that it can be built in code, stored in a Resource, or
//! loaded from a file as part of a [`TimerPresetSet`](crate::presets::TimerPresetSet).
//!
//! The completion callback is deliberately NOT part of this - callbacks are code,
//! configs are data; you provide the former separately when applying the latter.

use crate::errors::{self, TimerConfigError};
use crate::types::{self, LoopCount, Seconds};

#[cfg(feature = "preset_loader")]
use serde::{Deserialize, Serialize};


/// Everything needed to (re)configure an IntervalTimer, minus the callback.
///
/// The Default matches the defaults of a freshly created timer: a one-second
/// one-shot that does not start on its own.
#[derive(Debug, Clone, Copy, PartialEq, bevy::reflect::Reflect)]
#[cfg_attr(feature = "preset_loader", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "preset_loader", serde(default))]
pub struct IntervalTimerConfig {
    /// Interval length in seconds. Must be greater than zero.
    pub duration: Seconds,

    /// If true, the timer stops for good after its first completion.
    pub one_shot: bool,

    /// If true, the timer starts right away when configured or initialized.
    pub auto_start: bool,

    /// Stop automatically after this many completed loops; 0 means loop forever.
    /// Cannot be combined with `one_shot`.
    pub loop_stop_count: LoopCount,

    /// Whether the timer should emit its diagnostic log lines (e.g. on reset).
    /// Only has an effect if the `logging` feature is enabled.
    pub logging: bool,
}

impl Default for IntervalTimerConfig {
    fn default() -> Self {
        Self {
            duration: types::DEFAULT_DURATION,
            one_shot: true,
            auto_start: false,
            loop_stop_count: types::UNBOUNDED_LOOPS,
            logging: true,
        }
    }
}

impl IntervalTimerConfig {
    pub fn builder() -> IntervalTimerConfigBuilder {
        IntervalTimerConfigBuilder::default()
    }

    /// A one-shot timer of the given length.
    pub fn one_shot(duration: Seconds) -> Self {
        Self { duration, ..Default::default() }
    }

    /// A timer that repeats forever.
    pub fn repeating(duration: Seconds) -> Self {
        Self { duration, one_shot: false, ..Default::default() }
    }

    /// A timer that repeats until it has completed `loops` times.
    pub fn bounded(duration: Seconds, loops: LoopCount) -> Self {
        Self { duration, one_shot: false, loop_stop_count: loops, ..Default::default() }
    }

    /// Checks the configuration against the invariants a timer needs to run.
    ///
    /// Configs are not validated on construction (so that they can be deserialized
    /// and edited freely); this runs whenever one is applied to a timer.
    pub fn validate(&self) -> Result<(), TimerConfigError> {
        errors::check_duration(self.duration)?;
        errors::check_loop_mode(self.one_shot, self.loop_stop_count)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}


/// Builder pattern for IntervalTimerConfig
///
/// Any value left unset falls back to the IntervalTimerConfig defaults, with one
/// exception: setting a loop bound without saying anything about `one_shot`
/// implies a looping timer, since the combination would be invalid otherwise.
#[derive(Default, Debug, Clone)]
pub struct IntervalTimerConfigBuilder {
    duration: Option<Seconds>,
    one_shot: Option<bool>,
    auto_start: Option<bool>,
    loop_stop_count: Option<LoopCount>,
    logging: Option<bool>,
}

impl IntervalTimerConfigBuilder {
    /// Builds the config without checking it; see [`Self::try_build`] for a checked version.
    pub fn build(self) -> IntervalTimerConfig {
        let defaults = IntervalTimerConfig::default();
        let loop_stop_count = self.loop_stop_count.unwrap_or(defaults.loop_stop_count);
        let one_shot = self.one_shot.unwrap_or(loop_stop_count == types::UNBOUNDED_LOOPS);

        IntervalTimerConfig {
            duration: self.duration.unwrap_or(defaults.duration),
            one_shot,
            auto_start: self.auto_start.unwrap_or(defaults.auto_start),
            loop_stop_count,
            logging: self.logging.unwrap_or(defaults.logging),
        }
    }

    pub fn try_build(self) -> Result<IntervalTimerConfig, TimerConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duration(mut self, val: Seconds) -> Self {
        self.duration = Some(val); self
    }

    pub fn set_one_shot(mut self, val: bool) -> Self {
        self.one_shot = Some(val); self
    }

    pub fn set_auto_start(mut self, val: bool) -> Self {
        self.auto_start = Some(val); self
    }

    pub fn set_loop_stop_count(mut self, val: LoopCount) -> Self {
        self.loop_stop_count = Some(val); self
    }

    pub fn set_logging(mut self, val: bool) -> Self {
        self.logging = Some(val); self
    }

    /// Creates a new builder using an existing config as a starting point.
    /// This means the values are preconfigured to match the existing config,
    /// but you can modify them freely before turning this into a new config.
    pub fn from_reference_config(config: &IntervalTimerConfig) -> Self {
        Self {
            duration: Some(config.duration),
            one_shot: Some(config.one_shot),
            auto_start: Some(config.auto_start),
            loop_stop_count: Some(config.loop_stop_count),
            logging: Some(config.logging),
        }
    }
}

impl From<IntervalTimerConfigBuilder> for IntervalTimerConfig {
    fn from(value: IntervalTimerConfigBuilder) -> Self {
        value.build()
    }
}

impl From<&IntervalTimerConfig> for IntervalTimerConfigBuilder {
    fn from(value: &IntervalTimerConfig) -> Self {
        Self::from_reference_config(value)
    }
}
