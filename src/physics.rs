//! Arcade body layer. Bodies live in level space (origin top-left, y grows downward) so the values
//! read straight off the level files, and a sync system mirrors them into Bevy transforms.
//!
//! It covers gravity integration, world-bound clamping, and two pairwise
//! queries (`separate` for blocking collisions and `overlaps` for triggers). Which pairs get tested
//! is decided by the collision policy, not here.

use bevy::prelude::*;

use crate::state::{GameSet, Screen};

/// Registers body integration and transform sync, both limited to the play screen.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsSettings>()
            .init_resource::<WorldBounds>()
            .add_systems(
                Update,
                (
                    integrate_bodies.in_set(GameSet::Physics),
                    sync_body_transforms.in_set(GameSet::Presentation),
                )
                    .run_if(in_state(Screen::Play)),
            );
    }
}

/// Tunables for the integration step.
#[derive(Resource, Clone, Copy)]
pub struct PhysicsSettings {
    pub gravity: f32,
    /// Upper bound on the integration step so a long frame cannot tunnel bodies through platforms.
    pub max_step: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            max_step: 1.0 / 30.0,
        }
    }
}

/// Size of the playfield in level units. Level space and Bevy world space share the same scale;
/// only the origin and the direction of the y axis differ.
#[derive(Resource, Clone, Copy)]
pub struct WorldBounds {
    pub size: Vec2,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            size: Vec2::new(960.0, 600.0),
        }
    }
}

impl WorldBounds {
    /// Converts a level-space point into a Bevy world translation centred on the camera.
    pub fn to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x - self.size.x * 0.5, self.size.y * 0.5 - point.y)
    }

    fn clamp(&self, body: &mut Body) {
        let half = body.half_extents;

        if body.min().x < 0.0 {
            body.position.x = half.x;
            body.velocity.x = body.velocity.x.max(0.0);
            body.blocked.left = true;
        } else if body.max().x > self.size.x {
            body.position.x = self.size.x - half.x;
            body.velocity.x = body.velocity.x.min(0.0);
            body.blocked.right = true;
        }

        if body.min().y < 0.0 {
            body.position.y = half.y;
            body.velocity.y = body.velocity.y.max(0.0);
            body.blocked.up = true;
        } else if body.max().y > self.size.y {
            body.position.y = self.size.y - half.y;
            body.velocity.y = body.velocity.y.min(0.0);
            body.blocked.down = true;
        }
    }
}

/// Per-side contact flags, cleared at the start of every physics step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Axis-aligned box taking part in the arcade physics layer.
#[derive(Component, Debug, Clone)]
pub struct Body {
    /// Centre of the box in level space.
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub collide_world_bounds: bool,
    /// Disabled bodies neither move nor take part in any collision or overlap query.
    pub enabled: bool,
    /// Contacts with other bodies resolved by `separate` this frame.
    pub touching: Sides,
    /// Contacts with the world bounds this frame.
    pub blocked: Sides,
}

impl Body {
    /// A gravity-affected body, as used by the hero and spiders.
    pub fn dynamic(center: Vec2, size: Vec2) -> Self {
        Self {
            position: center,
            velocity: Vec2::ZERO,
            half_extents: size * 0.5,
            allow_gravity: true,
            immovable: false,
            collide_world_bounds: false,
            enabled: true,
            touching: Sides::default(),
            blocked: Sides::default(),
        }
    }

    /// A static collider that never moves (platforms, enemy walls).
    pub fn fixed(center: Vec2, size: Vec2) -> Self {
        Self {
            allow_gravity: false,
            immovable: true,
            ..Self::dynamic(center, size)
        }
    }

    /// A trigger volume that ignores gravity (coins, door, key).
    pub fn floating(center: Vec2, size: Vec2) -> Self {
        Self {
            allow_gravity: false,
            ..Self::dynamic(center, size)
        }
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Ground contact: the body rests on another body this frame.
    pub fn on_ground(&self) -> bool {
        self.touching.down
    }

    pub fn min(&self) -> Vec2 {
        self.position - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.position + self.half_extents
    }

    /// True when a physics step would leave the body exactly as it is: static or disabled, with
    /// no contact flags left over from the previous frame.
    pub fn is_settled(&self) -> bool {
        (self.immovable || !self.enabled)
            && self.touching == Sides::default()
            && self.blocked == Sides::default()
    }

    fn penetration(&self, other: &Body) -> Option<Vec2> {
        let delta = (self.position - other.position).abs();
        let overlap = self.half_extents + other.half_extents - delta;
        (overlap.x > 0.0 && overlap.y > 0.0).then_some(overlap)
    }
}

/// Non-blocking proximity test between two enabled bodies.
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.enabled && b.enabled && a.penetration(b).is_some()
}

/// Pushes `mover` out of `solid` along the axis of least penetration, zeroing the velocity
/// component that drove it in and recording the touching side. Returns whether a contact happened.
pub fn separate(mover: &mut Body, solid: &Body) -> bool {
    if !mover.enabled || !solid.enabled {
        return false;
    }

    let Some(overlap) = mover.penetration(solid) else {
        return false;
    };

    if overlap.y <= overlap.x {
        if mover.position.y < solid.position.y {
            mover.position.y -= overlap.y;
            mover.velocity.y = mover.velocity.y.min(0.0);
            mover.touching.down = true;
        } else {
            mover.position.y += overlap.y;
            mover.velocity.y = mover.velocity.y.max(0.0);
            mover.touching.up = true;
        }
    } else if mover.position.x < solid.position.x {
        mover.position.x -= overlap.x;
        mover.velocity.x = mover.velocity.x.min(0.0);
        mover.touching.right = true;
    } else {
        mover.position.x += overlap.x;
        mover.velocity.x = mover.velocity.x.max(0.0);
        mover.touching.left = true;
    }

    true
}

/// Advances one body by `dt` seconds: clears contact flags, applies gravity and velocity, and
/// clamps to the world bounds when requested.
pub fn step_body(body: &mut Body, settings: &PhysicsSettings, bounds: &WorldBounds, dt: f32) {
    body.touching = Sides::default();
    body.blocked = Sides::default();

    if !body.enabled || body.immovable {
        return;
    }

    if body.allow_gravity {
        body.velocity.y += settings.gravity * dt;
    }

    let step = body.velocity * dt;
    body.position += step;

    if body.collide_world_bounds {
        bounds.clamp(body);
    }
}

fn integrate_bodies(
    time: Res<Time>,
    settings: Res<PhysicsSettings>,
    bounds: Res<WorldBounds>,
    mut bodies: Query<&mut Body>,
) {
    let dt = time.delta_seconds().min(settings.max_step);

    for mut body in &mut bodies {
        // Reading through `Mut` keeps static bodies out of `Changed<Body>`.
        if body.is_settled() {
            continue;
        }
        step_body(&mut body, &settings, &bounds, dt);
    }
}

/// Mirrors level-space body positions into render transforms. Z is left untouched so spawn-time
/// layering survives.
pub fn sync_body_transforms(
    bounds: Res<WorldBounds>,
    mut query: Query<(&Body, &mut Transform), Changed<Body>>,
) {
    for (body, mut transform) in &mut query {
        let world = bounds.to_world(body.position);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}
