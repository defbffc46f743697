//! Looping yoyo tween on a body's vertical position.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::physics::Body;
use crate::state::{GameSet, Screen};

/// Registers the system that drives `VerticalYoyo` tweens.
pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            advance_tweens
                .in_set(GameSet::Behavior)
                .run_if(in_state(Screen::Play)),
        );
    }
}

/// Moves a body's centre between `from` and `to` and back again, forever, with sinusoidal
/// in/out easing. One leg lasts `duration` seconds.
#[derive(Component, Debug, Clone)]
pub struct VerticalYoyo {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    elapsed: f32,
}

impl VerticalYoyo {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Oscillates around `center` by `amplitude` in both directions.
    pub fn around(center: f32, amplitude: f32, duration: f32) -> Self {
        Self::new(center - amplitude, center + amplitude, duration)
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.from;
        }

        self.elapsed = (self.elapsed + dt) % (self.duration * 2.0);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.from;
        }

        let leg = self.elapsed / self.duration;
        let progress = if leg <= 1.0 { leg } else { 2.0 - leg };
        let eased = 0.5 - 0.5 * (PI * progress).cos();
        self.from + (self.to - self.from) * eased
    }
}

fn advance_tweens(time: Res<Time>, mut query: Query<(&mut Body, &mut VerticalYoyo)>) {
    let dt = time.delta_seconds();

    for (mut body, mut tween) in &mut query {
        body.position.y = tween.advance(dt);
    }
}
