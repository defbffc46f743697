//! Level descriptions and the spawning pipeline.
//!
//! Levels are small JSON documents embedded in the binary and parsed once into a
//! `LevelRegistry`. A pending level index is turned into entities by `spawn_pending_level`, which
//! first tears down whatever the previous attempt left behind, so restarts and level advances are
//! the same operation.

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::animation::{AnimationClip, Animator};
use crate::assets::GameAssets;
use crate::hero::spawn_hero;
use crate::physics::{Body, WorldBounds};
use crate::spider::spawn_spider;
use crate::state::{apply_screen_requests, FlowSet, Screen};
use crate::tween::VerticalYoyo;

/// Embedded level sources, in play order.
const LEVEL_SOURCES: [(&str, &str); 2] = [
    ("level00", include_str!("../assets/data/level00.json")),
    ("level01", include_str!("../assets/data/level01.json")),
];

pub const COIN_SIZE: Vec2 = Vec2::new(22.0, 22.0);
pub const DOOR_SIZE: Vec2 = Vec2::new(42.0, 66.0);
pub const KEY_SIZE: Vec2 = Vec2::new(28.0, 30.0);
pub const ENEMY_WALL_SIZE: Vec2 = Vec2::new(6.0, 42.0);

const KEY_BOB_AMPLITUDE: f32 = 3.0;
const KEY_BOB_SECONDS: f32 = 0.8;

/// Registers the level registry and the systems that spawn and clear level entities.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        let registry = LevelRegistry::builtin();
        if registry.is_empty() {
            warn!("No playable levels were loaded; the play screen will stay empty.");
        }

        app.insert_resource(registry)
            .init_resource::<PendingLevel>()
            .add_systems(
                Update,
                spawn_pending_level
                    .in_set(FlowSet)
                    .after(apply_screen_requests),
            )
            .add_systems(OnExit(Screen::Play), despawn_level);
    }
}

/// Failure to turn a level source into a `LevelDescription`.
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("Parse error in level '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A point in level space.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(point: Point) -> Self {
        Vec2::new(point.x, point.y)
    }
}

/// Logical platform image names used by the level files.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
pub enum PlatformTile {
    #[serde(rename = "ground")]
    Ground,
    #[serde(rename = "grass:8x1")]
    Grass8x1,
    #[serde(rename = "grass:6x1")]
    Grass6x1,
    #[serde(rename = "grass:4x1")]
    Grass4x1,
    #[serde(rename = "grass:2x1")]
    Grass2x1,
    #[serde(rename = "grass:1x1")]
    Grass1x1,
}

impl PlatformTile {
    pub const ALL: [PlatformTile; 6] = [
        PlatformTile::Ground,
        PlatformTile::Grass8x1,
        PlatformTile::Grass6x1,
        PlatformTile::Grass4x1,
        PlatformTile::Grass2x1,
        PlatformTile::Grass1x1,
    ];

    pub fn size(self) -> Vec2 {
        match self {
            PlatformTile::Ground => Vec2::new(960.0, 42.0),
            PlatformTile::Grass8x1 => Vec2::new(336.0, 42.0),
            PlatformTile::Grass6x1 => Vec2::new(252.0, 42.0),
            PlatformTile::Grass4x1 => Vec2::new(168.0, 42.0),
            PlatformTile::Grass2x1 => Vec2::new(84.0, 42.0),
            PlatformTile::Grass1x1 => Vec2::new(42.0, 42.0),
        }
    }

    pub fn image_path(self) -> &'static str {
        match self {
            PlatformTile::Ground => "images/ground.png",
            PlatformTile::Grass8x1 => "images/grass_8x1.png",
            PlatformTile::Grass6x1 => "images/grass_6x1.png",
            PlatformTile::Grass4x1 => "images/grass_4x1.png",
            PlatformTile::Grass2x1 => "images/grass_2x1.png",
            PlatformTile::Grass1x1 => "images/grass_1x1.png",
        }
    }
}

/// A platform placed by its top-left corner.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PlatformPlacement {
    pub x: f32,
    pub y: f32,
    pub image: PlatformTile,
}

impl PlatformPlacement {
    pub fn body(&self) -> Body {
        let size = self.image.size();
        Body::fixed(Vec2::new(self.x, self.y) + size * 0.5, size)
    }

    /// Invisible walls standing on the platform's top surface, flush against its left and right
    /// edges. Only spiders collide with them.
    pub fn enemy_walls(&self) -> [Body; 2] {
        let half = ENEMY_WALL_SIZE * 0.5;
        let center_y = self.y - half.y;
        let left = Vec2::new(self.x - half.x, center_y);
        let right = Vec2::new(self.x + self.image.size().x + half.x, center_y);

        [
            Body::fixed(left, ENEMY_WALL_SIZE),
            Body::fixed(right, ENEMY_WALL_SIZE),
        ]
    }
}

/// One level as stored in its JSON file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LevelDescription {
    pub platforms: Vec<PlatformPlacement>,
    pub hero: Point,
    #[serde(default)]
    pub spiders: Vec<Point>,
    #[serde(default)]
    pub coins: Vec<Point>,
    /// Bottom-centre of the door.
    pub door: Point,
    pub key: Point,
}

impl LevelDescription {
    pub fn from_json(name: &str, source: &str) -> Result<Self, LevelLoadError> {
        serde_json::from_str(source).map_err(|source| LevelLoadError::Parse {
            name: name.to_owned(),
            source,
        })
    }

    pub fn door_body(&self) -> Body {
        let bottom_center = Vec2::from(self.door);
        Body::floating(bottom_center - Vec2::new(0.0, DOOR_SIZE.y * 0.5), DOOR_SIZE)
    }
}

/// Every playable level, in order. The level count used for progression is `len()`.
#[derive(Resource, Debug, Default)]
pub struct LevelRegistry {
    levels: Vec<LevelDescription>,
}

impl LevelRegistry {
    /// Parses the embedded levels. A level that fails to parse is logged and left out.
    pub fn builtin() -> Self {
        let levels = LEVEL_SOURCES
            .iter()
            .filter_map(|(name, source)| match LevelDescription::from_json(name, source) {
                Ok(level) => Some(level),
                Err(err) => {
                    error!("{}", err);
                    None
                }
            })
            .collect();

        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDescription> {
        self.levels.get(index)
    }

    /// Maps any requested index onto the cyclic level range.
    pub fn wrap(&self, level: usize) -> usize {
        level % self.levels.len().max(1)
    }

    pub fn is_last(&self, level: usize) -> bool {
        level + 1 >= self.levels.len()
    }
}

/// Level index waiting to be spawned by the next flow pass.
#[derive(Resource, Debug, Default)]
pub struct PendingLevel(pub Option<usize>);

/// Everything belonging to the current level attempt; despawned wholesale on restart.
#[derive(Component)]
pub struct LevelEntity;

/// Solid ground for the hero and spiders.
#[derive(Component)]
pub struct Platform;

/// Invisible collider flanking a platform edge that turns patrolling spiders around.
#[derive(Component)]
pub struct EnemyWall;

#[derive(Component)]
pub struct Coin;

#[derive(Component)]
pub struct Door;

#[derive(Component)]
pub struct Key;

/// Non-colliding scenery group; the door and key live here.
#[derive(Component)]
pub struct Decoration;

fn spawn_pending_level(
    mut commands: Commands,
    mut pending: ResMut<PendingLevel>,
    registry: Res<LevelRegistry>,
    assets: Res<GameAssets>,
    bounds: Res<WorldBounds>,
    existing: Query<Entity, With<LevelEntity>>,
) {
    let Some(index) = pending.0.take() else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn_recursive();
    }

    let Some(level) = registry.get(index) else {
        warn!(
            "Level {} is not available ({} levels loaded); nothing to spawn.",
            index,
            registry.len()
        );
        return;
    };

    spawn_level(&mut commands, &assets, &bounds, level);

    info!(
        "Spawned level {}: {} platforms, {} spiders, {} coins",
        index,
        level.platforms.len(),
        level.spiders.len(),
        level.coins.len()
    );
}

pub fn spawn_level(
    commands: &mut Commands,
    assets: &GameAssets,
    bounds: &WorldBounds,
    level: &LevelDescription,
) {
    for platform in &level.platforms {
        spawn_platform(commands, assets, bounds, platform);
    }

    spawn_hero(commands, assets, bounds, level.hero.into());

    for spider in &level.spiders {
        spawn_spider(commands, assets, bounds, (*spider).into());
    }

    for coin in &level.coins {
        spawn_coin(commands, assets, bounds, (*coin).into());
    }

    spawn_door(commands, assets, bounds, level.door_body());
    spawn_key(commands, assets, bounds, level.key.into());
}

fn spawn_platform(
    commands: &mut Commands,
    assets: &GameAssets,
    bounds: &WorldBounds,
    placement: &PlatformPlacement,
) {
    let body = placement.body();

    commands.spawn((
        Name::new("Platform"),
        Platform,
        LevelEntity,
        SpriteBundle {
            texture: assets.platform(placement.image),
            transform: Transform::from_translation(bounds.to_world(body.position).extend(0.0)),
            ..default()
        },
        body,
    ));

    for wall in placement.enemy_walls() {
        commands.spawn((Name::new("EnemyWall"), EnemyWall, LevelEntity, wall));
    }
}

fn spawn_coin(commands: &mut Commands, assets: &GameAssets, bounds: &WorldBounds, at: Vec2) {
    commands.spawn((
        Name::new("Coin"),
        Coin,
        LevelEntity,
        SpriteBundle {
            texture: assets.coin.image.clone(),
            transform: Transform::from_translation(bounds.to_world(at).extend(2.0)),
            ..default()
        },
        assets.coin.atlas(0),
        Animator::default()
            .with_clip("rotate", AnimationClip::looping(&[0, 1, 2, 1], 6.0))
            .playing("rotate"),
        Body::floating(at, COIN_SIZE),
    ));
}

fn spawn_door(commands: &mut Commands, assets: &GameAssets, bounds: &WorldBounds, body: Body) {
    commands.spawn((
        Name::new("Door"),
        Door,
        Decoration,
        LevelEntity,
        SpriteBundle {
            texture: assets.door.image.clone(),
            transform: Transform::from_translation(bounds.to_world(body.position).extend(1.0)),
            ..default()
        },
        assets.door.atlas(0),
        body,
    ));
}

fn spawn_key(commands: &mut Commands, assets: &GameAssets, bounds: &WorldBounds, at: Vec2) {
    let tween = VerticalYoyo::around(at.y, KEY_BOB_AMPLITUDE, KEY_BOB_SECONDS);
    let start = Vec2::new(at.x, tween.value());

    commands.spawn((
        Name::new("Key"),
        Key,
        Decoration,
        LevelEntity,
        SpriteBundle {
            texture: assets.key.clone(),
            transform: Transform::from_translation(bounds.to_world(start).extend(2.0)),
            ..default()
        },
        Body::floating(start, KEY_SIZE),
        tween,
    ));
}

fn despawn_level(mut commands: Commands, query: Query<Entity, With<LevelEntity>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
