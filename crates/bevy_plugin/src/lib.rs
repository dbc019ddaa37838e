/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! This crate extends the Metronome timer library with a plugin that streamlines the integration 
//! of IntervalTimers into an existing Bevy application.
//! 
//! The plugin sets up the settings Resource, the Observers that initialize timers and 
//! handle control requests, and the System that ticks every timer once per frame.
//! 
//! What's left for you to do after adding it in is spawning IntervalTimer Components 
//! and observing the IntervalTimerCompleted/IntervalTimerFinished Events.
#![no_std]

mod plugin;

pub use plugin::MetronomePlugin;
pub use plugin::MetronomeSystems;
