/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Identifiers for key types.
//! 
//! These are simple newtype wrappers whose main purpose is to keep the 
//! underlying, wrapped type from leaking into the public API, so that 
//! switching it out later does not turn into a breaking change.

use alloc::string::String;
use core::borrow::Borrow;

use bevy::reflect::Reflect;

#[cfg(feature = "preset_loader")]
use serde::{Serialize, Deserialize};


/// The name a [`TimerPreset`](crate::presets::TimerPreset) is looked up by, e.g. "patrol_pause".
#[derive(Reflect, Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "preset_loader", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "preset_loader", serde(transparent))]
pub struct TimerPresetIdentifier(String);

impl TimerPresetIdentifier {
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<IS: Into<String>> From<IS> for TimerPresetIdentifier {
    fn from(value: IS) -> Self {
        Self::from_string(value.into())
    }
}

impl Borrow<str> for TimerPresetIdentifier {
    fn borrow(&self) -> &str {
        self.0.borrow()
    }
}

impl core::fmt::Display for TimerPresetIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
