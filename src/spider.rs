//! Spider enemies: a two-state horizontal patrol and a one-shot death.

use bevy::prelude::*;

use crate::animation::{AnimationClip, AnimationFinished, Animator};
use crate::assets::GameAssets;
use crate::level::LevelEntity;
use crate::physics::{Body, WorldBounds};
use crate::state::{GameSet, Screen};

pub const SPIDER_SPEED: f32 = 100.0;
pub const SPIDER_SIZE: Vec2 = Vec2::new(42.0, 32.0);

const DIE_CLIP: &str = "die";

/// Registers spider patrol and removal of spiders whose death clip ended.
pub struct SpiderPlugin;

impl Plugin for SpiderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (patrol_spiders, remove_dead_spiders)
                .in_set(GameSet::Behavior)
                .run_if(in_state(Screen::Play)),
        );
    }
}

/// Patrolling enemy. Dead spiders keep the component until their death clip ends.
#[derive(Component, Debug)]
pub struct Spider {
    alive: bool,
}

impl Default for Spider {
    fn default() -> Self {
        Self { alive: true }
    }
}

impl Spider {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Turns around on contact with a wall, platform side or world edge.
    pub fn patrol(body: &mut Body) {
        if body.touching.right || body.blocked.right {
            body.velocity.x = -SPIDER_SPEED;
        } else if body.touching.left || body.blocked.left {
            body.velocity.x = SPIDER_SPEED;
        }
    }

    /// Takes the spider out of play immediately and starts the death clip; the entity is removed
    /// when the clip ends. Returns false if the spider was already dying.
    pub fn die(&mut self, body: &mut Body, animator: &mut Animator) -> bool {
        if !self.alive {
            return false;
        }

        self.alive = false;
        body.enabled = false;
        body.velocity = Vec2::ZERO;
        animator.play(DIE_CLIP);
        true
    }
}

fn spider_animator() -> Animator {
    Animator::default()
        .with_clip("crawl", AnimationClip::looping(&[0, 1, 2], 8.0))
        .with_clip(
            DIE_CLIP,
            AnimationClip::once(&[0, 4, 0, 4, 0, 4, 3, 3, 3, 3, 3, 3], 12.0),
        )
        .playing("crawl")
}

pub fn spawn_spider(
    commands: &mut Commands,
    assets: &GameAssets,
    bounds: &WorldBounds,
    at: Vec2,
) -> Entity {
    commands
        .spawn((
            Name::new("Spider"),
            Spider::default(),
            LevelEntity,
            SpriteBundle {
                texture: assets.spider.image.clone(),
                transform: Transform::from_translation(bounds.to_world(at).extend(3.0)),
                ..default()
            },
            assets.spider.atlas(0),
            spider_animator(),
            Body::dynamic(at, SPIDER_SIZE)
                .with_world_bounds()
                .with_velocity(Vec2::new(SPIDER_SPEED, 0.0)),
        ))
        .id()
}

fn patrol_spiders(mut query: Query<(&Spider, &mut Body)>) {
    for (spider, mut body) in &mut query {
        if spider.is_alive() {
            Spider::patrol(&mut body);
        }
    }
}

fn remove_dead_spiders(
    mut commands: Commands,
    mut finished: EventReader<AnimationFinished>,
    spiders: Query<&Spider>,
) {
    for event in finished.read() {
        if event.clip != DIE_CLIP {
            continue;
        }

        if let Ok(spider) = spiders.get(event.entity) {
            if !spider.is_alive() {
                debug!("Removing dead spider {:?}", event.entity);
                commands.entity(event.entity).despawn_recursive();
            }
        }
    }
}
