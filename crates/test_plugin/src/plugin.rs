/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

use bevy::prelude::*;

use crate::helpers::*;


/// Sets up a manually driven clock and a [`CompletionLog`].
/// 
/// Deliberately does NOT add TimePlugin - it would overwrite the clock on every frame. 
/// Pair it with `MetronomePlugin` (or your own timer Systems) and drive frames with [`step`].
pub struct MetronomeTestPlugin;

impl Plugin for MetronomeTestPlugin {
    fn build(&self, app: &mut App) {
        app
        .init_resource::<Time>()
        .init_resource::<CompletionLog>()
        .add_observer(record_completion)
        .add_observer(record_finish)
        ;
    }
}
