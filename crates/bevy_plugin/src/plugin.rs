/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

use bevy::prelude::*;
use metronome_core::runtime;

#[cfg(feature = "include_preset_loader")]
use metronome_preset_loader::{TimerPresetAssetPlugin, json_support::JsonTimerPresetLoader};


/// SystemSet for the timer-ticking System, so that your own Systems can be ordered around it
/// (e.g. to read the fresh state of timers right after they were ticked).
#[derive(SystemSet, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MetronomeSystems {
    Tick,
}

#[derive(Default)]
pub struct MetronomePlugin {
    settings: runtime::MetronomeSettings,
}

impl MetronomePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the clock the tick System reads deltas from (game time by default).
    pub fn with_clock(mut self, clock: runtime::TimerClock) -> Self {
        self.settings = self.settings.with_clock(clock);
        self
    }
}

impl Plugin for MetronomePlugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "include_preset_loader")]
        app
        .add_plugins((
            TimerPresetAssetPlugin::<JsonTimerPresetLoader>::default(),
        ));

        #[cfg(feature = "logging")]
        bevy::log::debug!("MetronomePlugin: using the {:?} clock", self.settings.clock);

        app
        .insert_resource(self.settings.clone())
        .add_observer(runtime::initialize_added_timers)
        .add_observer(runtime::start_requested_timer)
        .add_observer(runtime::stop_requested_timer)
        .add_observer(runtime::reset_requested_timer)
        .add_observer(runtime::adjust_requested_timer)
        .add_observer(runtime::configure_requested_timer)
        .add_systems(
            Update,
            runtime::tick_interval_timers.in_set(MetronomeSystems::Tick)
        )
        ;
    }
}


#[cfg(test)]
mod tests {
    extern crate std;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use bevy::prelude::*;
    use metronome_core::config::IntervalTimerConfig;
    use metronome_core::events;
    use metronome_core::sink::CompletionSink;
    use metronome_core::timer::IntervalTimer;
    use metronome_test_plugin::{CompletionLog, MetronomeTestPlugin, step};

    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MetronomeTestPlugin, MetronomePlugin::new()));
        app
    }

    #[test]
    fn test_one_shot_fires_on_third_frame() {
        let hits = Arc::new(AtomicU32::new(0));
        let hits_in_sink = hits.clone();
        let sink = CompletionSink::new(move || { hits_in_sink.fetch_add(1, Ordering::SeqCst); });

        let mut app = test_app();
        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::one_shot(1.) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, Some(sink)).unwrap()).id();

        step(&mut app, 0.4);
        step(&mut app, 0.4);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(app.world().resource::<CompletionLog>().completions_for(entity).is_empty());

        step(&mut app, 0.4);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let log = app.world().resource::<CompletionLog>();
        assert_eq!(log.completions_for(entity), [1]);
        assert_eq!(log.finished_for(entity), Some(1));

        let timer = app.world().get::<IntervalTimer>(entity).unwrap();
        assert!(!timer.is_running());
        let drift = timer.elapsed_time() - 0.2;
        assert!(drift < 1e-5 && drift > -1e-5);
    }

    #[test]
    fn test_looping_timer_reports_every_interval_in_a_long_frame() {
        let mut app = test_app();
        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::repeating(0.5) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, None).unwrap()).id();

        step(&mut app, 2.);

        let log = app.world().resource::<CompletionLog>();
        assert_eq!(log.completions_for(entity), [1, 2, 3, 4]);
        assert_eq!(log.finished_for(entity), None);
        assert_eq!(app.world().get::<IntervalTimer>(entity).unwrap().loop_count(), 4);
    }

    #[test]
    fn test_timers_that_are_not_started_stay_put() {
        let mut app = test_app();
        let entity = app.world_mut().spawn(IntervalTimer::new(0.1).unwrap()).id();

        step(&mut app, 1.);

        assert!(app.world().resource::<CompletionLog>().completions_for(entity).is_empty());
        assert_eq!(app.world().get::<IntervalTimer>(entity).unwrap().elapsed_time(), 0.);
    }

    #[test]
    fn test_stop_request_halts_a_running_timer() {
        let mut app = test_app();
        let config = IntervalTimerConfig { auto_start: true, ..IntervalTimerConfig::repeating(1.) };
        let entity = app.world_mut().spawn(IntervalTimer::from_config(&config, None).unwrap()).id();

        step(&mut app, 1.);
        app.world_mut().trigger(events::StopIntervalTimerRequested { entity });
        step(&mut app, 5.);

        assert_eq!(app.world().resource::<CompletionLog>().completions_for(entity), [1]);
    }
}
