/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! This crate extends the Metronome timer library with a solution for loading `TimerPresetSets` 
//! from data files served by any available Bevy [`AssetSource`](https://docs.rs/bevy/latest/bevy/asset/io/struct.AssetSource.html). 
//! 
//! Each supported format lives behind its own `*_support` feature; pick the backend you want 
//! and add a `TimerPresetAssetPlugin<YourBackend>` to your app.
#![no_std]

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod loader;

pub use loader::*;
