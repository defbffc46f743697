//! The hero: keyboard-driven movement, jumping, stomp bounces, and an animation derived each frame
//! from the physics body.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::animation::{AnimationClip, Animator};
use crate::assets::GameAssets;
use crate::audio::SoundEffect;
use crate::level::LevelEntity;
use crate::physics::{Body, WorldBounds};
use crate::state::{GameSet, Screen};

pub const SPEED: f32 = 200.0;
pub const JUMP_SPEED: f32 = 600.0;
pub const BOUNCE_SPEED: f32 = 200.0;
pub const HERO_SIZE: Vec2 = Vec2::new(36.0, 42.0);

/// Registers hero input and animation systems.
pub struct HeroPlugin;

impl Plugin for HeroPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                read_hero_input.in_set(GameSet::Input),
                update_hero.in_set(GameSet::Behavior),
            )
                .run_if(in_state(Screen::Play)),
        );
    }
}

/// Horizontal direction the hero sprite faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player character. Movement lives on its `Body`; this only tracks facing.
#[derive(Component, Debug, Default)]
pub struct Hero {
    pub facing: Facing,
}

impl Hero {
    /// Sets horizontal velocity for `direction` in {-1, 0, 1}. Facing follows the sign of the
    /// resulting velocity and is kept as-is when standing still.
    pub fn move_horizontally(&mut self, body: &mut Body, direction: f32) {
        body.velocity.x = direction * SPEED;

        if body.velocity.x < 0.0 {
            self.facing = Facing::Left;
        } else if body.velocity.x > 0.0 {
            self.facing = Facing::Right;
        }
    }

    /// Jumps only from ground contact. The caller plays the jump sound when this returns true.
    pub fn jump(body: &mut Body) -> bool {
        let can_jump = body.on_ground();
        if can_jump {
            body.velocity.y = -JUMP_SPEED;
        }
        can_jump
    }

    /// Upward kick after stomping an enemy.
    pub fn bounce(body: &mut Body) {
        body.velocity.y = -BOUNCE_SPEED;
    }
}

/// Hero clips, one per motion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroAnimation {
    Stop,
    Run,
    Jump,
    Fall,
}

impl HeroAnimation {
    /// Picks the clip for the body's current motion, by priority jump > fall > run > stop.
    pub fn for_body(body: &Body) -> Self {
        let grounded = body.on_ground();

        if body.velocity.y < 0.0 {
            HeroAnimation::Jump
        } else if !grounded {
            HeroAnimation::Fall
        } else if body.velocity.x != 0.0 {
            HeroAnimation::Run
        } else {
            HeroAnimation::Stop
        }
    }

    pub fn clip(self) -> &'static str {
        match self {
            HeroAnimation::Stop => "stop",
            HeroAnimation::Run => "run",
            HeroAnimation::Jump => "jump",
            HeroAnimation::Fall => "fall",
        }
    }
}

fn hero_animator() -> Animator {
    Animator::default()
        .with_clip("stop", AnimationClip::still(0))
        .with_clip("run", AnimationClip::looping(&[1, 2], 8.0))
        .with_clip("jump", AnimationClip::still(3))
        .with_clip("fall", AnimationClip::still(4))
        .playing("stop")
}

pub fn spawn_hero(
    commands: &mut Commands,
    assets: &GameAssets,
    bounds: &WorldBounds,
    at: Vec2,
) -> Entity {
    commands
        .spawn((
            Name::new("Hero"),
            Hero::default(),
            LevelEntity,
            SpriteBundle {
                texture: assets.hero.image.clone(),
                transform: Transform::from_translation(bounds.to_world(at).extend(4.0)),
                ..default()
            },
            assets.hero.atlas(0),
            hero_animator(),
            Body::dynamic(at, HERO_SIZE).with_world_bounds(),
        ))
        .id()
}

fn read_hero_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut Hero, &mut Body)>,
    mut sounds: EventWriter<SoundEffect>,
) {
    for (mut hero, mut body) in &mut query {
        let direction = if keyboard.pressed(KeyCode::ArrowLeft) {
            -1.0
        } else if keyboard.pressed(KeyCode::ArrowRight) {
            1.0
        } else {
            0.0
        };

        hero.move_horizontally(&mut body, direction);

        if keyboard.just_pressed(KeyCode::ArrowUp) && Hero::jump(&mut body) {
            sounds.send(SoundEffect::Jump);
        }
    }
}

/// Recomputes the hero's clip from its body every frame; `Animator::play` ignores repeats.
fn update_hero(mut query: Query<(&Hero, &Body, &mut Animator, &mut Sprite)>) {
    for (hero, body, mut animator, mut sprite) in &mut query {
        animator.play(HeroAnimation::for_body(body).clip());

        let flip = hero.facing == Facing::Left;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}
