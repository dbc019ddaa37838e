/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

use std::time::Duration;

use bevy::prelude::*;
use metronome_core::events::{IntervalTimerCompleted, IntervalTimerFinished};
use metronome_core::types::LoopCount;


/// Everything the timers in a test app reported, in the order it was reported.
#[derive(Resource, Default, Debug)]
pub struct CompletionLog {
    pub completed: Vec<IntervalTimerCompleted>,
    pub finished: Vec<IntervalTimerFinished>,
}

impl CompletionLog {
    /// The loop indices reported by the given timer so far.
    pub fn completions_for(&self, entity: Entity) -> Vec<LoopCount> {
        self.completed
            .iter()
            .filter(|evt| evt.entity == entity)
            .map(|evt| evt.loop_index)
            .collect()
    }

    /// The loop total of the most recent time the given timer stopped itself, if it ever did.
    pub fn finished_for(&self, entity: Entity) -> Option<LoopCount> {
        self.finished
            .iter()
            .rev()
            .find(|evt| evt.entity == entity)
            .map(|evt| evt.completed_loops)
    }

    pub fn clear(&mut self) {
        self.completed.clear();
        self.finished.clear();
    }
}

pub fn record_completion(
    trigger: On<IntervalTimerCompleted>,
    mut log: ResMut<CompletionLog>,
) {
    log.completed.push(trigger.event().clone());
}

pub fn record_finish(
    trigger: On<IntervalTimerFinished>,
    mut log: ResMut<CompletionLog>,
) {
    log.finished.push(trigger.event().clone());
}

/// Advances the test clock by exactly `seconds` and runs a single frame.
pub fn step(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

/// Runs `frames` frames of `seconds` each.
pub fn step_many(app: &mut App, seconds: f32, frames: usize) {
    for _ in 0..frames {
        step(app, seconds);
    }
}
