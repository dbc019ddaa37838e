/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/
#![no_std]

extern crate alloc;

pub mod config;
pub mod errors;
pub mod events;
pub mod identifiers;
#[cfg(feature = "preset_loader")]
pub mod presets;
pub mod runtime;
pub mod sink;
pub mod timer;
pub mod types;
