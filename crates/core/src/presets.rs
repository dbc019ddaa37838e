/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Data-driven timer configurations.
//!
//! A [`TimerPresetSet`] is a named bundle of [`IntervalTimerConfig`]s that can live
//! in a data file (see the `metronome-preset-loader` crate for the formats supported)
//! so that designers can tune cooldowns, spawn waves and the like without recompiling.
//!
//! Presets are only validated when they are applied to a timer, so a file with one
//! bad entry still loads; the bad entry just gets rejected on use.

use alloc::string::String;
use alloc::vec::Vec;

use bevy::asset::Asset;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::IntervalTimerConfig;
use crate::errors::TimerConfigError;
use crate::sink::CompletionSink;
use crate::timer::IntervalTimer;
use crate::types::TimerPresetKey;


/// A single named timer configuration.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimerPreset {
    pub name: TimerPresetKey,

    #[serde(default)]
    pub config: IntervalTimerConfig,
}

/// A named collection of timer presets, loadable as an Asset.
#[derive(Asset, Reflect, Serialize, Deserialize, Debug, Clone, Default)]
pub struct TimerPresetSet {
    pub name: String,

    #[serde(default)]
    pub presets: Vec<TimerPreset>,
}

impl TimerPresetSet {
    pub fn new<IS: Into<String>>(name: IS) -> Self {
        Self { name: name.into(), presets: Vec::new() }
    }

    /// Adds (or replaces) a preset by name.
    pub fn with_preset<IK: Into<TimerPresetKey>>(mut self, name: IK, config: IntervalTimerConfig) -> Self {
        let name = name.into();
        self.presets.retain(|preset| preset.name != name);
        self.presets.push(TimerPreset { name, config });
        self
    }

    /// Looks up a preset's config by name.
    pub fn get(&self, name: &str) -> Option<&IntervalTimerConfig> {
        self.presets
            .iter()
            .find(|preset| preset.name.as_str() == name)
            .map(|preset| &preset.config)
    }

    pub fn names(&self) -> impl Iterator<Item = &TimerPresetKey> {
        self.presets.iter().map(|preset| &preset.name)
    }

    /// Builds a timer out of the named preset.
    ///
    /// Returns None if there is no such preset, and the usual configuration
    /// error if the preset itself is invalid.
    pub fn instantiate(
        &self,
        name: &str,
        on_complete: Option<CompletionSink>,
    ) -> Option<Result<IntervalTimer, TimerConfigError>> {
        let config = self.get(name);

        #[cfg(feature = "logging")]
        if config.is_none() {
            bevy::log::warn!("TimerPresetSet {:?} has no preset named {:?}", self.name, name);
        }

        config.map(|config| IntervalTimer::from_config(config, on_complete))
    }
}
