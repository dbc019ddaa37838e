/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::marker::PhantomData;

use bevy::asset::{AssetLoader, LoadContext, io::Reader};
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use metronome_core::config::IntervalTimerConfig;
use metronome_core::events::ConfigureIntervalTimerRequested;
use metronome_core::presets::TimerPresetSet;
use metronome_core::sink::CompletionSink;
use metronome_core::timer::IntervalTimer;
use metronome_core::types::{Seconds, TimerPresetKey};


/// How long a preset file gets to load before we give up on it, unless configured otherwise.
pub const DEFAULT_LOAD_TIMEOUT: Seconds = 2.;


pub trait TimerPresetLoaderBackend: Send + Sync + 'static {
    /// What type does the loader return as a loader on error.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Must be able to load from a byte array.
    fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error>;

    /// What extensions should be read for this (by default)?
    fn extensions() -> &'static [&'static str] {
        &[]
    }
}

#[cfg(any(feature = "json_support", test))]
pub mod json_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct JsonTimerPresetLoader;

    impl TimerPresetLoaderBackend for JsonTimerPresetLoader {
        type Error = serde_json::Error;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            serde_json::from_slice(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["timers.json", "json"]
        }
    }
}


#[cfg(any(feature = "toml_support", test))]
pub mod toml_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct TomlTimerPresetLoader;

    impl TimerPresetLoaderBackend for TomlTimerPresetLoader {
        type Error = toml::de::Error;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            toml::from_slice(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["timers.toml", "toml"]
        }
    }
}


#[cfg(any(feature = "msgpack_support", test))]
pub mod msgpack_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct MsgpackTimerPresetLoader;

    impl TimerPresetLoaderBackend for MsgpackTimerPresetLoader {
        type Error = rmp_serde::decode::Error;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            rmp_serde::decode::from_slice(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["msgpack"]
        }
    }
}


#[cfg(any(all(feature = "cbor_support", feature = "std", not(feature = "nostd_support")), test))]
pub mod cbor_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct CborTimerPresetLoader;

    impl TimerPresetLoaderBackend for CborTimerPresetLoader {
        type Error = ciborium::de::Error<std::io::Error>;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            ciborium::de::from_reader(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["cbor"]
        }
    }
}


#[cfg(any(feature = "ron_support", test))]
pub mod ron_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct RonTimerPresetLoader;

    impl TimerPresetLoaderBackend for RonTimerPresetLoader {
        type Error = ron::de::SpannedError;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            ron::de::from_bytes(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["timers.ron", "ron"]
        }
    }
}


#[cfg(any(feature = "yaml_support", test))]
pub mod yaml_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct YamlTimerPresetLoader;

    impl TimerPresetLoaderBackend for YamlTimerPresetLoader {
        type Error = serde_saphyr::Error;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            serde_saphyr::from_slice(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["timers.yaml", "yaml", "yml"]
        }
    }
}


#[cfg(any(feature = "postcard_support", test))]
pub mod postcard_support {
    use super::{TimerPresetLoaderBackend, TimerPresetSet};

    #[derive(Default)]
    pub struct PostcardTimerPresetLoader;

    impl TimerPresetLoaderBackend for PostcardTimerPresetLoader {
        type Error = postcard::Error;

        fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, Self::Error> {
            postcard::from_bytes(v)
        }

        fn extensions() -> &'static [&'static str] {
            &["postcard"]
        }
    }
}


// Asset loader
#[derive(Default)]
pub struct TimerPresetLoader<B: TimerPresetLoaderBackend>(PhantomData<B>);

impl<B: TimerPresetLoaderBackend> TimerPresetLoader<B> {
    fn from_slice<'a>(v: &'a [u8]) -> core::result::Result<TimerPresetSet, B::Error> {
        B::from_slice(v)
    }
}

impl<B: TimerPresetLoaderBackend> AssetLoader for TimerPresetLoader<B> {
    type Asset = TimerPresetSet;
    type Settings = ();
    type Error = Box<dyn core::error::Error + Send + Sync + 'static>;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _ctx: &mut LoadContext<'_>
    ) -> Result<Self::Asset, Self::Error> {
        #[cfg(feature = "logging")]
        bevy::log::debug!("TimerPresetLoader running...");
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let read = Self::from_slice(&bytes);
        let res: Result<TimerPresetSet, Box<dyn core::error::Error + Send + Sync + 'static>> = read.map_err(|err| {
            #[cfg(feature = "logging")]
            bevy::log::error!("TimerPresetLoader error: {:?}", err);
            err.into()
        } );
        #[cfg(feature = "logging")]
        bevy::log::debug!("TimerPresetLoader finished...");
        res
    }

    fn extensions(&self) -> &[&str] {
        B::extensions()
    }
}

/// Handles to every preset file requested so far, keyed by path.
#[derive(Resource, Default)]
pub struct TimerPresetHandles(pub HashMap<String, Handle<TimerPresetSet>>);

impl TimerPresetHandles {
    pub fn get(&self, path: &str) -> Option<&Handle<TimerPresetSet>> {
        self.0.get(path)
    }
}

/// Per-path load deadlines. These are IntervalTimers like any other, just ticked by hand.
#[derive(Resource, Default)]
struct PresetLoadTimeouts(pub HashMap<String, IntervalTimer>);

#[derive(Resource, Debug, Clone, Copy)]
struct PresetLoadSettings {
    timeout: Seconds,
}


#[derive(Event, Debug)]
pub struct LoadTimerPresetsRequest {
    filename: String
}

impl LoadTimerPresetsRequest {
    pub fn new<IS: Into<String>>(filename: IS) -> Self {
        Self {
            filename: filename.into()
        }
    }
}

#[derive(Event, Debug)]
pub struct TimerPresetsLoaded {
    pub filename: String,
    pub asset_handle: Handle<TimerPresetSet>,
}

#[derive(Event, Debug)]
pub struct TimerPresetsLoadingTimeout {
    pub filename: String,
    pub timeout_time: Seconds,
}

/// Asks the library to (re)configure the timer on the target Entity from a loaded preset.
///
/// Resolves to a ConfigureIntervalTimerRequested, so the usual insert-or-update and
/// rejection rules apply. Unknown presets or not-yet-loaded sets are logged and skipped.
#[derive(EntityEvent, Debug, Clone)]
pub struct ApplyTimerPresetRequested {
    pub entity: Entity,
    pub preset_set: Handle<TimerPresetSet>,
    pub preset: TimerPresetKey,
    pub on_complete: Option<CompletionSink>,
}

fn load_asset(
    event: On<LoadTimerPresetsRequest>,
    asset_server: Res<AssetServer>,
    settings: Res<PresetLoadSettings>,
    mut handles: ResMut<TimerPresetHandles>,
    mut timeouts: ResMut<PresetLoadTimeouts>,
) {
    let asset_path = event.event().filename.to_owned();
    #[cfg(feature = "logging")]
    bevy::log::info!("Reading TimerPresetSet from {}...", &asset_path);
    let handle: Handle<TimerPresetSet> = asset_server.load(asset_path.to_owned());
    handles.0.entry(asset_path.to_owned()).or_insert(handle);

    let deadline_config = IntervalTimerConfig {
        auto_start: true,
        logging: false,
        ..IntervalTimerConfig::one_shot(settings.timeout)
    };

    match IntervalTimer::from_config(&deadline_config, None) {
        Ok(deadline) => { timeouts.0.insert(asset_path, deadline); },
        Err(_err) => {
            #[cfg(feature = "logging")]
            bevy::log::error!("Cannot track the load of {:?} - bad timeout: {}", asset_path, _err);
        }
    }
}

fn countdown(
    time: Res<Time>,
    handles: Res<TimerPresetHandles>,
    assets: Res<Assets<TimerPresetSet>>,
    mut timeouts: ResMut<PresetLoadTimeouts>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    timeouts.0.retain(|key, deadline| {
        let loaded_handle = handles.0
            .get(key)
            .filter(|handle| assets.get(*handle).is_some());

        if let Some(handle) = loaded_handle {
            #[cfg(feature = "logging")]
            bevy::log::info!("Successfully loaded TimerPresetSet from file {:?}...", key);
            commands.trigger(TimerPresetsLoaded {
                filename: key.to_owned(),
                asset_handle: handle.to_owned(),
            });
            return false;
        }

        if deadline.tick(delta).stopped {
            let elapsed_time = deadline.duration();
            #[cfg(feature = "logging")]
            bevy::log::warn!(
                "Loading TimerPresetSet data from file {:?} timed out after {:?}s!",
                key, elapsed_time
            );
            commands.trigger(TimerPresetsLoadingTimeout {
                filename: key.to_owned(),
                timeout_time: elapsed_time,
            });
            return false;
        }

        true
    });
}

fn apply_preset(
    trigger: On<ApplyTimerPresetRequested>,
    assets: Res<Assets<TimerPresetSet>>,
    mut commands: Commands,
) {
    let event = trigger.event();

    let Some(preset_set) = assets.get(&event.preset_set) else {
        #[cfg(feature = "logging")]
        bevy::log::warn!(
            "ApplyTimerPresetRequested for {:?}: preset set {:?} is not loaded (yet?)",
            event.entity, event.preset_set
        );
        return;
    };

    let Some(config) = preset_set.get(event.preset.as_str()) else {
        #[cfg(feature = "logging")]
        bevy::log::warn!(
            "ApplyTimerPresetRequested for {:?}: no preset named {:?} in {:?}",
            event.entity, event.preset, preset_set.name
        );
        return;
    };

    commands.trigger(ConfigureIntervalTimerRequested {
        entity: event.entity,
        config: *config,
        on_complete: event.on_complete.clone(),
    });
}


pub struct TimerPresetAssetPlugin<B: TimerPresetLoaderBackend> {
    load_timeout: Seconds,
    backend: PhantomData<B>,
}

impl<B: TimerPresetLoaderBackend> Default for TimerPresetAssetPlugin<B> {
    fn default() -> Self {
        Self { load_timeout: DEFAULT_LOAD_TIMEOUT, backend: PhantomData }
    }
}

impl<B: TimerPresetLoaderBackend> TimerPresetAssetPlugin<B> {
    /// How long to wait for a requested file before raising TimerPresetsLoadingTimeout.
    pub fn with_load_timeout(mut self, seconds: Seconds) -> Self {
        self.load_timeout = seconds;
        self
    }
}

impl<B: TimerPresetLoaderBackend + Default> bevy::app::Plugin for TimerPresetAssetPlugin<B> {
    fn build(&self, app: &mut bevy::app::App) {
        if !app.is_plugin_added::<AssetPlugin>() {
            app.add_plugins(AssetPlugin::default());
        }

        app.init_asset_loader::<TimerPresetLoader<B>>();

        // Several backends can be installed side by side; the format-agnostic bits only go in once.
        if app.world().contains_resource::<TimerPresetHandles>() {
            return;
        }

        app
        .insert_resource(PresetLoadSettings { timeout: self.load_timeout })
        .init_resource::<TimerPresetHandles>()
        .init_asset::<TimerPresetSet>()
        .init_resource::<PresetLoadTimeouts>()
        .add_observer(load_asset)
        .add_observer(apply_preset)
        .add_systems(First, countdown)
        ;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::cbor_support::CborTimerPresetLoader;
    use super::json_support::JsonTimerPresetLoader;
    use super::msgpack_support::MsgpackTimerPresetLoader;
    use super::postcard_support::PostcardTimerPresetLoader;
    use super::ron_support::RonTimerPresetLoader;
    use super::toml_support::TomlTimerPresetLoader;
    use super::yaml_support::YamlTimerPresetLoader;
    use bevy::app::TaskPoolPlugin;
    use bevy::asset::io::AssetSourceBuilder;
    use core::time::Duration;
    use metronome_core::runtime;

    /// The format-specific documents below all describe this set.
    fn expected_patrol_set() -> TimerPresetSet {
        TimerPresetSet::new("patrol")
            .with_preset("pause", IntervalTimerConfig::one_shot(1.5))
            .with_preset("footsteps", IntervalTimerConfig::repeating(0.4))
            .with_preset("lookaround", IntervalTimerConfig::bounded(2., 3))
    }

    fn assert_matches_expected(loaded: TimerPresetSet) {
        let expected = expected_patrol_set();
        assert_eq!(loaded.name, expected.name);
        assert_eq!(loaded.presets, expected.presets);
    }

    #[test]
    fn test_load_json() {
        let raw = br#"{
            "name": "patrol",
            "presets": [
                { "name": "pause", "config": { "duration": 1.5 } },
                { "name": "footsteps", "config": { "duration": 0.4, "one_shot": false } },
                { "name": "lookaround", "config": { "duration": 2.0, "one_shot": false, "loop_stop_count": 3 } }
            ]
        }"#;
        assert_matches_expected(TimerPresetLoader::<JsonTimerPresetLoader>::from_slice(raw).unwrap());
    }

    #[test]
    fn test_load_ron() {
        let raw = br#"(
            name: "patrol",
            presets: [
                (name: "pause", config: (duration: 1.5)),
                (name: "footsteps", config: (duration: 0.4, one_shot: false)),
                (name: "lookaround", config: (duration: 2.0, one_shot: false, loop_stop_count: 3)),
            ],
        )"#;
        assert_matches_expected(TimerPresetLoader::<RonTimerPresetLoader>::from_slice(raw).unwrap());
    }

    #[test]
    fn test_load_yaml() {
        let raw = b"name: patrol
presets:
  - name: pause
    config:
      duration: 1.5
  - name: footsteps
    config:
      duration: 0.4
      one_shot: false
  - name: lookaround
    config:
      duration: 2.0
      one_shot: false
      loop_stop_count: 3
";
        assert_matches_expected(TimerPresetLoader::<YamlTimerPresetLoader>::from_slice(raw).unwrap());
    }

    #[test]
    fn test_load_toml() {
        let raw = br#"
name = "patrol"

[[presets]]
name = "pause"
config = { duration = 1.5 }

[[presets]]
name = "footsteps"
config = { duration = 0.4, one_shot = false }

[[presets]]
name = "lookaround"
config = { duration = 2.0, one_shot = false, loop_stop_count = 3 }
"#;
        assert_matches_expected(TimerPresetLoader::<TomlTimerPresetLoader>::from_slice(raw).unwrap());
    }

    #[test]
    fn test_load_binary_formats() {
        let set = expected_patrol_set();

        let msgpack = rmp_serde::to_vec(&set).unwrap();
        assert_matches_expected(TimerPresetLoader::<MsgpackTimerPresetLoader>::from_slice(&msgpack).unwrap());

        let mut cbor = Vec::new();
        ciborium::ser::into_writer(&set, &mut cbor).unwrap();
        assert_matches_expected(TimerPresetLoader::<CborTimerPresetLoader>::from_slice(&cbor).unwrap());

        let mut buffer = [0u8; 256];
        let postcard = postcard::to_slice(&set, &mut buffer).unwrap();
        assert_matches_expected(TimerPresetLoader::<PostcardTimerPresetLoader>::from_slice(postcard).unwrap());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(TimerPresetLoader::<JsonTimerPresetLoader>::from_slice(b"{ \"presets\": 12 }").is_err());
    }

    #[test]
    fn test_apply_preset_configures_entity() {
        let mut app = App::new();
        app
        .init_resource::<Time>()
        .init_resource::<Assets<TimerPresetSet>>()
        .add_observer(apply_preset)
        .add_observer(runtime::initialize_added_timers)
        .add_observer(runtime::configure_requested_timer)
        ;

        let handle = app.world_mut().resource_mut::<Assets<TimerPresetSet>>().add(expected_patrol_set());
        let entity = app.world_mut().spawn_empty().id();

        app.world_mut().trigger(ApplyTimerPresetRequested {
            entity,
            preset_set: handle.clone(),
            preset: "lookaround".into(),
            on_complete: None,
        });
        app.update();

        let timer = app.world().get::<IntervalTimer>(entity).unwrap();
        assert_eq!(timer.duration(), 2.);
        assert_eq!(timer.loop_stop_count(), 3);

        let other = app.world_mut().spawn_empty().id();
        app.world_mut().trigger(ApplyTimerPresetRequested {
            entity: other,
            preset_set: handle,
            preset: "no_such_preset".into(),
            on_complete: None,
        });
        app.update();

        assert!(app.world().get::<IntervalTimer>(other).is_none());
    }

    #[derive(Resource, Default, Debug)]
    struct LoadOutcomes {
        loaded: Vec<String>,
        timed_out: Vec<String>,
    }

    fn record_loaded(trigger: On<TimerPresetsLoaded>, mut outcomes: ResMut<LoadOutcomes>) {
        outcomes.loaded.push(trigger.event().filename.to_owned());
    }

    fn record_timeout(trigger: On<TimerPresetsLoadingTimeout>, mut outcomes: ResMut<LoadOutcomes>) {
        outcomes.timed_out.push(trigger.event().filename.to_owned());
    }

    /// An app with a real AssetServer reading from this crate's test_assets directory,
    /// and a hand-driven clock for the load deadlines.
    fn loader_test_app<B: TimerPresetLoaderBackend + Default>() -> App {
        let mut app = App::new();
        app
        .register_asset_source(
            "test_assets",
            AssetSourceBuilder::platform_default(
                "test_assets",
                None,
            )
        )
        .add_plugins((
            TaskPoolPlugin::default(),
            TimerPresetAssetPlugin::<B>::default(),
        ))
        .init_resource::<Time>()
        .init_resource::<LoadOutcomes>()
        .add_observer(record_loaded)
        .add_observer(record_timeout)
        ;
        app.finish();
        app.cleanup();
        app
    }

    fn step(app: &mut App, seconds: f32) {
        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn test_load_request_reports_loaded() {
        let path = "test_assets://patrol.timers.json";
        let mut app = loader_test_app::<JsonTimerPresetLoader>();

        app.world_mut().trigger(LoadTimerPresetsRequest::new(path));

        // The clock stays put, so only the file IO decides how long this takes.
        for _ in 0..400 {
            app.update();
            if !app.world().resource::<LoadOutcomes>().loaded.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        let outcomes = app.world().resource::<LoadOutcomes>();
        assert_eq!(outcomes.loaded, [path]);
        assert!(outcomes.timed_out.is_empty());
        assert!(app.world().resource::<PresetLoadTimeouts>().0.is_empty());

        let handle = app.world().resource::<TimerPresetHandles>().get(path).unwrap().clone();
        let loaded = app.world().resource::<Assets<TimerPresetSet>>().get(&handle).unwrap().clone();
        assert_matches_expected(loaded);
    }

    #[test]
    fn test_load_request_for_missing_file_times_out_once() {
        let path = "test_assets://no_such_file.timers.json";
        let mut app = loader_test_app::<JsonTimerPresetLoader>();

        app.world_mut().trigger(LoadTimerPresetsRequest::new(path));
        assert!(app.world().resource::<PresetLoadTimeouts>().0.contains_key(path));

        let frame = DEFAULT_LOAD_TIMEOUT / 4.;
        for _ in 0..3 {
            step(&mut app, frame);
        }
        assert!(app.world().resource::<LoadOutcomes>().timed_out.is_empty());

        step(&mut app, frame);
        {
            let outcomes = app.world().resource::<LoadOutcomes>();
            assert_eq!(outcomes.timed_out, [path]);
            assert!(outcomes.loaded.is_empty());
        }
        assert!(app.world().resource::<PresetLoadTimeouts>().0.is_empty());

        step(&mut app, DEFAULT_LOAD_TIMEOUT);
        assert_eq!(app.world().resource::<LoadOutcomes>().timed_out.len(), 1);
    }
}
