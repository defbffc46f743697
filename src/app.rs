//! High-level plugin composition.
//!
//! `LeatPlatformerPlugin` glues together the domain plugins (flow, physics, level spawning, actors,
//! collisions, overlays) and owns the two entities that outlive every screen: the camera and the
//! background.

use bevy::prelude::*;

use crate::animation::AnimationPlugin;
use crate::assets::{load_game_assets, GameAssets, GameAssetsPlugin};
use crate::audio::GameAudioPlugin;
use crate::collision::CollisionPlugin;
use crate::hero::HeroPlugin;
use crate::hud::HudPlugin;
use crate::level::LevelPlugin;
use crate::physics::{PhysicsPlugin, WorldBounds};
use crate::screens::ScreensPlugin;
use crate::spider::SpiderPlugin;
use crate::state::FlowPlugin;
use crate::tween::TweenPlugin;

/// Bundles every gameplay plugin plus the camera and backdrop into one unit for the `App`.
pub struct LeatPlatformerPlugin;

impl Plugin for LeatPlatformerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            FlowPlugin,       // Screen state machine + session.
            GameAssetsPlugin, // Texture and atlas handles.
            GameAudioPlugin,  // Sound effect playback.
            PhysicsPlugin,    // Gravity + world bounds.
            AnimationPlugin,
            TweenPlugin,
            LevelPlugin,     // Level data and spawning.
            HeroPlugin,
            SpiderPlugin,
            CollisionPlugin, // Per-frame response policy.
            HudPlugin,
            ScreensPlugin, // Menu and win overlays.
        ))
        .add_systems(
            Startup,
            (setup_camera, spawn_background.after(load_game_assets)),
        );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Name::new("MainCamera"), Camera2dBundle::default()));
}

/// The backdrop stays up across every screen, below all level entities.
fn spawn_background(mut commands: Commands, assets: Res<GameAssets>, bounds: Res<WorldBounds>) {
    commands.spawn((
        Name::new("Background"),
        SpriteBundle {
            texture: assets.background.clone(),
            sprite: Sprite {
                custom_size: Some(bounds.size),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 0.0, -100.0),
            ..default()
        },
    ));
}
