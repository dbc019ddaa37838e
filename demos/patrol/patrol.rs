/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! A headless walkthrough of the timer modes: a guard that waits out a one-shot grace 
//! period, then sweeps a bounded number of times, while an unbounded heartbeat keeps 
//! ticking in the background. The app exits once the sweeps are done.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use metronome::prelude::*;
use metronome_bevy_plugin::MetronomePlugin;

#[derive(Component)]
struct GracePeriod;

#[derive(Component)]
struct Sweeps;

#[derive(Resource)]
struct Heartbeats(Arc<AtomicU32>);

fn setup(mut commands: Commands, heartbeats: Res<Heartbeats>) {
    let beats = heartbeats.0.clone();
    let heartbeat_sink = CompletionSink::new(move || { beats.fetch_add(1, Ordering::Relaxed); });

    let heartbeat = IntervalTimerConfig::builder()
        .set_duration(0.25)
        .set_one_shot(false)
        .set_auto_start(true)
        .set_logging(false)
        .build();

    match IntervalTimer::from_config(&heartbeat, Some(heartbeat_sink)) {
        Ok(timer) => { commands.spawn(timer); },
        Err(err) => bevy::log::error!("Bad heartbeat config: {}", err),
    }

    let grace = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::one_shot(1.) };
    if let Ok(timer) = IntervalTimer::from_config(&grace, None) {
        commands.spawn((GracePeriod, timer));
    }

    // Not started yet - the grace period kicks it off.
    if let Ok(timer) = IntervalTimer::from_config(&IntervalTimerConfig::bounded(0.6, 3), None) {
        commands.spawn((Sweeps, timer));
    }
}

fn on_grace_over(
    trigger: On<IntervalTimerFinished>,
    graces: Query<(), With<GracePeriod>>,
    sweeps: Query<Entity, With<Sweeps>>,
    mut commands: Commands,
) {
    if graces.get(trigger.event().entity).is_err() {
        return;
    }

    bevy::log::info!("Grace period over, starting sweeps");
    for entity in sweeps.iter() {
        commands.trigger(StartIntervalTimerRequested { entity });
    }
}

fn on_sweep(
    trigger: On<IntervalTimerCompleted>,
    sweeps: Query<(), With<Sweeps>>,
) {
    let evt = trigger.event();
    if sweeps.get(evt.entity).is_ok() {
        bevy::log::info!("Sweep #{} done", evt.loop_index);
    }
}

fn on_sweeps_done(
    trigger: On<IntervalTimerFinished>,
    sweeps: Query<(), With<Sweeps>>,
    heartbeats: Res<Heartbeats>,
    mut exit: MessageWriter<AppExit>,
) {
    let evt = trigger.event();
    if sweeps.get(evt.entity).is_err() {
        return;
    }

    bevy::log::info!(
        "All {} sweeps done after {} heartbeats, shutting down",
        evt.completed_loops, heartbeats.0.load(Ordering::Relaxed)
    );
    exit.write(AppExit::Success);
}

fn main() {
    App::new()
    .add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(50))),
        LogPlugin::default(),
        MetronomePlugin::new(),
    ))
    .insert_resource(Heartbeats(Arc::new(AtomicU32::new(0))))
    .add_systems(Startup, setup)
    .add_observer(on_grace_over)
    .add_observer(on_sweep)
    .add_observer(on_sweeps_done)
    .run();
}
