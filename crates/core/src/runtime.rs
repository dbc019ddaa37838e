/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Systems and Observers that drive IntervalTimer Components inside a Bevy app.
//!
//! The IntervalTimer itself is clock-agnostic; this module is the 'host' side of
//! the contract: it initializes timers when they get added, ticks them once per
//! frame with the frame's delta, and translates completions into Events.
//!
//! None of this is registered on its own - use `MetronomePlugin` from the
//! bevy_plugin crate, or pick and choose the pieces you want yourself.

use bevy::prelude::*;

use crate::events;
use crate::timer::IntervalTimer;


/// Which clock the tick System should read deltas from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum TimerClock {
    /// Game time; respects pausing and time scaling.
    #[default]
    Virtual,

    /// Wall-clock time; keeps going while the game is paused.
    /// Handy for UI timers and the like.
    Real,
}

/// A Resource with app-wide settings for how timers are driven.
#[derive(Resource, Debug, Default, Clone)]
pub struct MetronomeSettings {
    pub clock: TimerClock,
}

impl MetronomeSettings {
    pub fn with_clock(mut self, clock: TimerClock) -> Self {
        self.clock = clock;
        self
    }
}


/// Observer standing in for the host's 'on start' hook: runs
/// [`IntervalTimer::initialize`] on every timer as soon as it is added to an Entity.
pub fn initialize_added_timers(
    trigger: On<Add, IntervalTimer>,
    mut query: Query<&mut IntervalTimer>,
) {
    let entity = trigger.event().entity;

    if let Ok(mut timer) = query.get_mut(entity) {
        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "initialize_added_timers: initializing timer on {:?} (auto_start: {:?})",
            entity, timer.auto_start()
        );
        timer.initialize();
    }
}


/// The per-frame driver. Ticks every running IntervalTimer by the frame delta
/// and raises an [`events::IntervalTimerCompleted`] for each completion, plus an
/// [`events::IntervalTimerFinished`] for every timer that stopped itself.
pub fn tick_interval_timers(
    mut query: Query<(Entity, &mut IntervalTimer)>,
    settings: Option<Res<MetronomeSettings>>,
    game_timer: Res<Time>,
    real_timer: Option<Res<Time<Real>>>,
    mut commands: Commands,
) {
    let clock = settings.map(|s| s.clock).unwrap_or_default();

    let delta = match (clock, real_timer) {
        (TimerClock::Real, Some(real)) => real.delta_secs(),
        (TimerClock::Real, None) => {
            #[cfg(feature = "logging")]
            bevy::log::warn!("tick_interval_timers: Real clock requested, but Time<Real> is missing; using the default clock");
            game_timer.delta_secs()
        },
        (TimerClock::Virtual, _) => game_timer.delta_secs(),
    };

    for (entity, mut timer) in query.iter_mut() {
        // Checked through a shared ref first so idle timers do not get flagged as changed.
        if !timer.is_running() {
            continue;
        }

        let report = timer.tick(delta);

        if !report.completed() {
            continue;
        }

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "tick_interval_timers: {:?} completed {:?} time(s) (stopped: {:?})",
            entity, report.completions, report.stopped
        );

        let last = report.last_loop_index();

        for loop_index in report.loop_indices() {
            let stopped = report.stopped && Some(loop_index) == last;
            commands.trigger(events::IntervalTimerCompleted::new(entity, loop_index, stopped));
        }

        if report.stopped {
            commands.trigger(events::IntervalTimerFinished {
                entity: entity,
                completed_loops: report.loops_before.saturating_add(report.completions),
            });
        }
    }
}


#[cfg(feature = "logging")]
fn warn_missing_timer(request: &str, entity: Entity) {
    bevy::log::warn!(
        "{} targeted Entity {:?}, which has no IntervalTimer - ignoring",
        request, entity
    );
}

/// Event handler for [`events::StartIntervalTimerRequested`].
pub fn start_requested_timer(
    trigger: On<events::StartIntervalTimerRequested>,
    mut query: Query<&mut IntervalTimer>,
) {
    let entity = trigger.event().entity;
    match query.get_mut(entity) {
        Ok(mut timer) => { timer.start(); },
        Err(_err) => {
            #[cfg(feature = "logging")]
            warn_missing_timer("StartIntervalTimerRequested", entity);
        }
    }
}

/// Event handler for [`events::StopIntervalTimerRequested`].
pub fn stop_requested_timer(
    trigger: On<events::StopIntervalTimerRequested>,
    mut query: Query<&mut IntervalTimer>,
) {
    let entity = trigger.event().entity;
    match query.get_mut(entity) {
        Ok(mut timer) => { timer.stop(); },
        Err(_err) => {
            #[cfg(feature = "logging")]
            warn_missing_timer("StopIntervalTimerRequested", entity);
        }
    }
}

/// Event handler for [`events::ResetIntervalTimerRequested`].
pub fn reset_requested_timer(
    trigger: On<events::ResetIntervalTimerRequested>,
    mut query: Query<&mut IntervalTimer>,
) {
    let entity = trigger.event().entity;
    match query.get_mut(entity) {
        Ok(mut timer) => { timer.reset(); },
        Err(_err) => {
            #[cfg(feature = "logging")]
            warn_missing_timer("ResetIntervalTimerRequested", entity);
        }
    }
}

/// Event handler for [`events::AdjustIntervalTimerRequested`].
pub fn adjust_requested_timer(
    trigger: On<events::AdjustIntervalTimerRequested>,
    mut query: Query<&mut IntervalTimer>,
) {
    let event = trigger.event();
    match query.get_mut(event.entity) {
        Ok(mut timer) => { timer.adjust_elapsed(event.delta); },
        Err(_err) => {
            #[cfg(feature = "logging")]
            warn_missing_timer("AdjustIntervalTimerRequested", event.entity);
        }
    }
}

/// Event handler for [`events::ConfigureIntervalTimerRequested`].
///
/// Reconfigures an existing timer in place, or inserts a new one if the Entity has none.
/// Bad configs are reported through [`events::IntervalTimerConfigRejected`] rather than panicking.
pub fn configure_requested_timer(
    trigger: On<events::ConfigureIntervalTimerRequested>,
    mut query: Query<&mut IntervalTimer>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let entity = event.entity;

    let outcome = match query.get_mut(entity) {
        Ok(mut timer) => timer.apply_config(&event.config, event.on_complete.clone()).map(|_| ()),
        Err(_) => IntervalTimer::from_config(&event.config, event.on_complete.clone())
            .and_then(|timer| {
                match commands.get_entity(entity) {
                    Ok(mut entity_cmds) => { entity_cmds.insert(timer); },
                    Err(_err) => {
                        #[cfg(feature = "logging")]
                        bevy::log::warn!(
                            "Attempted to configure a timer for an Entity ({:?}) that no longer exists - {:?}",
                            entity, _err
                        );
                    }
                }
                Ok(())
            }),
    };

    if let Err(error) = outcome {
        #[cfg(feature = "logging")]
        bevy::log::warn!("Rejected timer configuration for {:?}: {}", entity, error);

        commands.trigger(events::IntervalTimerConfigRejected {
            entity: entity,
            error: error,
        });
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntervalTimerConfig;
    use crate::errors::TimerConfigError;
    use alloc::vec::Vec;
    use core::time::Duration;

    #[derive(Resource, Default)]
    struct Seen {
        completed: Vec<(Entity, u32, bool)>,
        finished: Vec<(Entity, u32)>,
        rejected: Vec<TimerConfigError>,
    }

    fn record_completed(trigger: On<events::IntervalTimerCompleted>, mut seen: ResMut<Seen>) {
        let evt = trigger.event();
        seen.completed.push((evt.entity, evt.loop_index, evt.stopped));
    }

    fn record_finished(trigger: On<events::IntervalTimerFinished>, mut seen: ResMut<Seen>) {
        let evt = trigger.event();
        seen.finished.push((evt.entity, evt.completed_loops));
    }

    fn record_rejected(trigger: On<events::IntervalTimerConfigRejected>, mut seen: ResMut<Seen>) {
        seen.rejected.push(trigger.event().error);
    }

    fn test_app() -> App {
        let mut app = App::new();
        app
        .init_resource::<Time>()
        .init_resource::<Seen>()
        .add_observer(initialize_added_timers)
        .add_observer(start_requested_timer)
        .add_observer(stop_requested_timer)
        .add_observer(reset_requested_timer)
        .add_observer(adjust_requested_timer)
        .add_observer(configure_requested_timer)
        .add_observer(record_completed)
        .add_observer(record_finished)
        .add_observer(record_rejected)
        .add_systems(Update, tick_interval_timers)
        ;
        app
    }

    fn step(app: &mut App, seconds: f32) {
        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn test_auto_start_timer_runs_on_insert() {
        let mut app = test_app();
        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::bounded(2., 3) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, None).unwrap()).id();

        for _ in 0..4 {
            step(&mut app, 2.);
        }

        let seen = app.world().resource::<Seen>();
        assert_eq!(seen.completed, [(entity, 1, false), (entity, 2, false), (entity, 3, true)]);
        assert_eq!(seen.finished, [(entity, 3)]);
        assert!(!app.world().get::<IntervalTimer>(entity).unwrap().is_running());
    }

    #[test]
    fn test_added_timer_with_auto_start_flag_gets_started() {
        let mut app = test_app();
        let mut timer = IntervalTimer::new(1.).unwrap();
        timer.set_auto_start(true);
        assert!(!timer.is_running());

        let entity = app.world_mut().spawn(timer).id();

        assert!(app.world().get::<IntervalTimer>(entity).unwrap().is_running());
    }

    #[test]
    fn test_control_requests_reach_the_timer() {
        let mut app = test_app();
        let entity = app.world_mut().spawn(IntervalTimer::new(1.).unwrap()).id();

        app.world_mut().trigger(events::StartIntervalTimerRequested { entity });
        step(&mut app, 0.25);
        app.world_mut().trigger(events::AdjustIntervalTimerRequested { entity, delta: 0.5 });
        app.world_mut().trigger(events::StopIntervalTimerRequested { entity });

        {
            let timer = app.world().get::<IntervalTimer>(entity).unwrap();
            assert!(!timer.is_running());
            assert_eq!(timer.elapsed_time(), 0.75);
        }

        app.world_mut().trigger(events::ResetIntervalTimerRequested { entity });
        let timer = app.world().get::<IntervalTimer>(entity).unwrap();
        assert_eq!(timer.elapsed_time(), 0.);
    }

    #[test]
    fn test_configure_request_inserts_or_rejects() {
        let mut app = test_app();
        let entity = app.world_mut().spawn_empty().id();

        app.world_mut().trigger(events::ConfigureIntervalTimerRequested::new(
            entity,
            IntervalTimerConfig { duration: 0., ..Default::default() },
        ));
        app.update();
        assert!(app.world().get::<IntervalTimer>(entity).is_none());
        assert_eq!(app.world().resource::<Seen>().rejected, [TimerConfigError::NonPositiveDuration(0.)]);

        app.world_mut().trigger(events::ConfigureIntervalTimerRequested::new(
            entity,
            IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::one_shot(0.5) },
        ));
        app.update();
        assert!(app.world().get::<IntervalTimer>(entity).unwrap().is_running());

        step(&mut app, 0.5);
        assert_eq!(app.world().resource::<Seen>().completed, [(entity, 1, true)]);
    }

    #[test]
    fn test_real_clock_reads_real_time_only() {
        let mut app = test_app();
        app
        .init_resource::<Time<Real>>()
        .insert_resource(MetronomeSettings::default().with_clock(TimerClock::Real))
        ;

        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::repeating(1.) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, None).unwrap()).id();

        // Game time moving on its own does not count.
        step(&mut app, 1.);
        assert!(app.world().resource::<Seen>().completed.is_empty());

        app.world_mut().resource_mut::<Time<Real>>().advance_by(Duration::from_secs_f32(1.));
        app.update();

        assert_eq!(app.world().resource::<Seen>().completed, [(entity, 1, false)]);
    }

    #[test]
    fn test_real_clock_falls_back_without_real_time() {
        let mut app = test_app();
        app.insert_resource(MetronomeSettings::default().with_clock(TimerClock::Real));

        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::one_shot(0.5) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, None).unwrap()).id();

        step(&mut app, 0.5);

        let seen = app.world().resource::<Seen>();
        assert_eq!(seen.completed, [(entity, 1, true)]);
        assert_eq!(seen.finished, [(entity, 1)]);
    }
}
