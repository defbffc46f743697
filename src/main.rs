//! Application entry point: window configuration, core Bevy plugins, and the game plugin from
//! `app.rs`.

mod animation;
mod app;
mod assets;
mod audio;
mod collision;
mod hero;
mod hud;
mod level;
mod physics;
mod screens;
mod spider;
mod state;
mod tween;

use app::LeatPlatformerPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResolution};

fn main() {
    // Route panics to the browser console instead of a bare wasm abort.
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    console_error_panic_hook::set_once();

    // The playfield is a fixed 960x600 so level coordinates map 1:1 to world units.
    let primary_window = Window {
        title: screens::TITLE.to_string(),
        resolution: WindowResolution::new(960.0, 600.0),
        resizable: false,
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // Hot reload only makes sense with a filesystem behind the asset server.
    let asset_plugin = AssetPlugin {
        file_path: "assets".to_owned(),
        watch_for_changes_override: Some(cfg!(not(target_arch = "wasm32"))),
        ..default()
    };

    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest())
        .set(asset_plugin);

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.08, 0.09, 0.14)))
        .add_plugins(default_plugins)
        .add_plugins(LeatPlatformerPlugin)
        .run();
}
