//! Named sprite-sheet clips. An `Animator` owns a small clip table and drives the entity's
//! `TextureAtlas` index; one-shot clips announce their completion with `AnimationFinished`.

use std::collections::HashMap;

use bevy::prelude::*;

/// Registers the finished-clip event and the system that steps every `Animator`.
pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimationFinished>()
            .add_systems(Update, advance_animations);
    }
}

/// A run of atlas frames played at a fixed rate.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<usize>,
    /// Zero means the clip holds its first frame forever.
    pub fps: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub fn looping(frames: &[usize], fps: f32) -> Self {
        Self {
            frames: frames.to_vec(),
            fps,
            looping: true,
        }
    }

    pub fn once(frames: &[usize], fps: f32) -> Self {
        Self {
            frames: frames.to_vec(),
            fps,
            looping: false,
        }
    }

    pub fn still(frame: usize) -> Self {
        Self {
            frames: vec![frame],
            fps: 0.0,
            looping: false,
        }
    }
}

/// Sent once when a non-looping clip plays its last frame out.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFinished {
    pub entity: Entity,
    pub clip: &'static str,
}

/// Plays one named clip at a time and exposes its current atlas frame.
#[derive(Component, Debug, Clone, Default)]
pub struct Animator {
    clips: HashMap<&'static str, AnimationClip>,
    current: Option<&'static str>,
    cursor: usize,
    elapsed: f32,
    finished: bool,
}

impl Animator {
    pub fn with_clip(mut self, name: &'static str, clip: AnimationClip) -> Self {
        self.clips.insert(name, clip);
        self
    }

    /// Builder variant of `play` for spawn-time setup.
    pub fn playing(mut self, name: &'static str) -> Self {
        self.play(name);
        self
    }

    pub fn current(&self) -> Option<&'static str> {
        self.current
    }

    /// Starts `name` from its first frame. Asking for the clip that is already playing is a
    /// no-op, as is asking for an unknown clip. Returns whether playback changed.
    pub fn play(&mut self, name: &'static str) -> bool {
        if self.current == Some(name) {
            return false;
        }

        if !self.clips.contains_key(name) {
            warn!("Animator has no clip named '{}'", name);
            return false;
        }

        self.current = Some(name);
        self.cursor = 0;
        self.elapsed = 0.0;
        self.finished = false;
        true
    }

    /// Atlas index of the frame currently shown.
    pub fn frame(&self) -> usize {
        self.current
            .and_then(|name| self.clips.get(name))
            .and_then(|clip| clip.frames.get(self.cursor).copied())
            .unwrap_or_default()
    }

    /// Moves playback forward by `dt` seconds. Returns true exactly once, on the tick a one-shot
    /// clip completes.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }

        let Some((fps, len, looping)) = self
            .current
            .and_then(|name| self.clips.get(name))
            .map(|clip| (clip.fps, clip.frames.len(), clip.looping))
        else {
            return false;
        };

        if fps <= 0.0 || len == 0 {
            return false;
        }

        let frame_time = 1.0 / fps;
        self.elapsed += dt;

        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;

            if self.cursor + 1 < len {
                self.cursor += 1;
            } else if looping {
                self.cursor = 0;
            } else {
                self.finished = true;
                return true;
            }
        }

        false
    }
}

fn advance_animations(
    time: Res<Time>,
    mut query: Query<(Entity, &mut Animator, Option<&mut TextureAtlas>)>,
    mut finished: EventWriter<AnimationFinished>,
) {
    let dt = time.delta_seconds();

    for (entity, mut animator, atlas) in &mut query {
        if animator.advance(dt) {
            if let Some(clip) = animator.current() {
                finished.send(AnimationFinished { entity, clip });
            }
        }

        if let Some(mut atlas) = atlas {
            let frame = animator.frame();
            if atlas.index != frame {
                atlas.index = frame;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin() -> Animator {
        Animator::default()
            .with_clip("rotate", AnimationClip::looping(&[0, 1, 2, 1], 4.0))
            .playing("rotate")
    }

    #[test]
    fn looping_clip_wraps_around() {
        let mut animator = coin();
        let frames: Vec<usize> = (0..5)
            .map(|_| {
                let frame = animator.frame();
                assert!(!animator.advance(0.25));
                frame
            })
            .collect();

        assert_eq!(frames, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn one_shot_clip_reports_completion_once() {
        let mut animator = Animator::default()
            .with_clip("die", AnimationClip::once(&[0, 4, 3], 10.0))
            .playing("die");

        assert!(!animator.advance(0.15));
        assert_eq!(animator.frame(), 4);
        assert!(animator.advance(0.2));
        assert_eq!(animator.frame(), 3);
        assert!(!animator.advance(1.0));
    }

    #[test]
    fn replaying_current_clip_is_a_no_op() {
        let mut animator = coin();
        animator.advance(0.25);

        assert!(!animator.play("rotate"));
        assert_eq!(animator.frame(), 1);
    }

    #[test]
    fn unknown_clips_are_ignored() {
        let mut animator = coin();
        assert!(!animator.play("missing"));
        assert_eq!(animator.current(), Some("rotate"));
    }

    #[test]
    fn still_clips_never_finish() {
        let mut animator = Animator::default()
            .with_clip("stop", AnimationClip::still(0))
            .playing("stop");

        assert!(!animator.advance(10.0));
        assert_eq!(animator.frame(), 0);
    }
}
