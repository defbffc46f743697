//! Texture and sprite-sheet handles, loaded once at startup and shared by every spawner.
//!
//! Spawners only ever read this resource, so a default (empty-handle) instance is enough for
//! headless runs that have no asset server.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::level::PlatformTile;

/// Registers the texture handle cache and queues its loads at startup.
pub struct GameAssetsPlugin;

impl Plugin for GameAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameAssets>()
            .add_systems(Startup, load_game_assets);
    }
}

/// An image cut into a horizontal strip of equally sized frames.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    pub image: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
}

impl SpriteSheet {
    pub fn atlas(&self, index: usize) -> TextureAtlas {
        TextureAtlas {
            layout: self.layout.clone(),
            index,
        }
    }
}

/// Every texture the spawners and overlays draw with.
#[derive(Resource, Debug, Default)]
pub struct GameAssets {
    pub background: Handle<Image>,
    pub platforms: HashMap<PlatformTile, Handle<Image>>,
    pub hero: SpriteSheet,
    pub spider: SpriteSheet,
    pub coin: SpriteSheet,
    pub door: SpriteSheet,
    pub key: Handle<Image>,
    pub key_icon: SpriteSheet,
    pub coin_icon: Handle<Image>,
}

impl GameAssets {
    pub fn platform(&self, tile: PlatformTile) -> Handle<Image> {
        self.platforms.get(&tile).cloned().unwrap_or_default()
    }
}

pub fn load_game_assets(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut assets: ResMut<GameAssets>,
) {
    let mut sheet = |path: &'static str, frame: UVec2, frames: u32| SpriteSheet {
        image: asset_server.load(path),
        layout: layouts.add(TextureAtlasLayout::from_grid(frame, frames, 1, None, None)),
    };

    assets.hero = sheet("images/hero.png", UVec2::new(36, 42), 5);
    assets.spider = sheet("images/spider.png", UVec2::new(42, 32), 5);
    assets.coin = sheet("images/coin_animated.png", UVec2::new(22, 22), 4);
    assets.door = sheet("images/door.png", UVec2::new(42, 66), 2);
    assets.key_icon = sheet("images/key_icon.png", UVec2::new(34, 30), 2);

    assets.background = asset_server.load("images/background.png");
    assets.key = asset_server.load("images/key.png");
    assets.coin_icon = asset_server.load("images/coin_icon.png");
    assets.platforms = PlatformTile::ALL
        .into_iter()
        .map(|tile| (tile, asset_server.load(tile.image_path())))
        .collect();

    info!(
        "Queued {} platform tiles and sprite sheets from assets/images/",
        assets.platforms.len()
    );
}
