/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Metronome - a small interval and loop timer for Bevy games.
//! 
//! The [`IntervalTimer`](timer::IntervalTimer) counts up to a duration, invokes an optional 
//! callback on every completion, and can fire once, loop forever, or loop a fixed number of times. 
//! It works standalone (tick it yourself with frame deltas) or as a Component ticked by `MetronomePlugin`.
#![no_std]

pub use metronome_core::*;

pub mod prelude {
    pub use metronome_core::*;
    pub use metronome_core::types::*;
    pub use metronome_core::config::{IntervalTimerConfig, IntervalTimerConfigBuilder};
    pub use metronome_core::errors::TimerConfigError;
    pub use metronome_core::events::*;
    pub use metronome_core::runtime::{MetronomeSettings, TimerClock};
    pub use metronome_core::timer::{IntervalTimer, TickReport, TimerState};

    #[cfg(feature = "preset_loader")]
    pub use metronome_core::presets::{TimerPreset, TimerPresetSet};

    #[cfg(any(feature = "bevy_plugin", feature = "testing"))]
    pub use metronome_bevy_plugin::{MetronomePlugin, MetronomeSystems};

    #[cfg(feature = "testing")]
    pub use metronome_test_plugin::MetronomeTestPlugin;

    #[cfg(feature = "preset_loader")]
    pub use metronome_preset_loader;
}
