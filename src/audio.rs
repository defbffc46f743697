//! Sound effects. Gameplay systems send `SoundEffect` events; a single system turns them into
//! short-lived audio entities.
//!
//! Handles are cached in `AudioHandles` so each clip is decoded once. Missing files only produce
//! a loader warning; playback for that clip is then silent.

use bevy::prelude::*;

/// Registers sound effect events, the handle cache and the playback system.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_event::<SoundEffect>()
            .add_systems(Startup, load_audio_handles)
            .add_systems(Update, play_sound_effects);
    }
}

/// One-shot sounds requested by gameplay systems.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Coin,
    Stomp,
    Key,
    Door,
}

/// Cached audio handles. `None` until the startup loader runs.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub jump: Option<Handle<AudioSource>>,
    pub coin: Option<Handle<AudioSource>>,
    pub stomp: Option<Handle<AudioSource>>,
    pub key: Option<Handle<AudioSource>>,
    pub door: Option<Handle<AudioSource>>,
}

impl AudioHandles {
    pub fn get(&self, effect: SoundEffect) -> Option<&Handle<AudioSource>> {
        match effect {
            SoundEffect::Jump => self.jump.as_ref(),
            SoundEffect::Coin => self.coin.as_ref(),
            SoundEffect::Stomp => self.stomp.as_ref(),
            SoundEffect::Key => self.key.as_ref(),
            SoundEffect::Door => self.door.as_ref(),
        }
    }
}

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.jump = Some(asset_server.load("audio/jump.wav"));
    handles.coin = Some(asset_server.load("audio/coin.wav"));
    handles.stomp = Some(asset_server.load("audio/stomp.wav"));
    handles.key = Some(asset_server.load("audio/key.wav"));
    handles.door = Some(asset_server.load("audio/door.wav"));

    info!("Queued sound effects from assets/audio/");
}

fn play_sound_effects(
    mut commands: Commands,
    mut effects: EventReader<SoundEffect>,
    handles: Res<AudioHandles>,
) {
    for effect in effects.read() {
        let Some(source) = handles.get(*effect) else {
            continue;
        };

        commands.spawn(AudioBundle {
            source: source.clone(),
            settings: PlaybackSettings::DESPAWN,
        });
    }
}
