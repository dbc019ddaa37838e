/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! This crate extends the Metronome timer library with a plugin used to standardize testing the library itself.
//! 
//! Tests drive the clock by hand (see [`step`]) so that every frame delta is exact and reproducible.

mod helpers;
mod plugin;

pub use helpers::*;
pub use plugin::MetronomeTestPlugin;
