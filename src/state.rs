//! Screen flow and per-attempt session state. Screens are a Bevy `States` enum; every change of
//! screen goes through a typed `ScreenRequest` so the payload (level index, coin total) travels
//! with the transition instead of living in globals.

use bevy::prelude::*;

use crate::level::{LevelRegistry, PendingLevel};

/// Registers the screen state machine, session resources and system set ordering.
pub struct FlowPlugin;

impl Plugin for FlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<Screen>()
            .add_event::<ScreenRequest>()
            .init_resource::<Session>()
            .init_resource::<WinSummary>()
            // Gameplay systems run in this order, and only on the play screen. Collision
            // responses therefore always see this frame's input and integrated positions.
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Physics,
                    GameSet::Collisions,
                    GameSet::Behavior,
                    GameSet::Presentation,
                )
                    .chain()
                    .run_if(in_state(Screen::Play)),
            )
            .configure_sets(Update, FlowSet.after(GameSet::Presentation))
            .add_systems(Update, apply_screen_requests.in_set(FlowSet));
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Screen {
    #[default]
    Menu,
    Play,
    Win,
}

/// Named system sets to structure the Update schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Physics,
    Collisions,
    Behavior,
    Presentation,
}

/// Screen requests are applied and levels respawned here, after all gameplay systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowSet;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRequest {
    Menu,
    /// Starts (or restarts) play on `level`, wrapped into the available level range.
    Play { level: usize },
    Win { coins: u32 },
}

/// Progress within one level attempt. Rebuilt from scratch on every `ScreenRequest::Play`.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub level: usize,
    pub coins: u32,
    pub has_key: bool,
}

impl Session {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            ..default()
        }
    }

    pub fn collect_coin(&mut self) {
        self.coins += 1;
    }

    pub fn pick_up_key(&mut self) {
        self.has_key = true;
    }
}

/// Payload shown by the win screen.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinSummary {
    pub coins: u32,
}

pub fn apply_screen_requests(
    mut requests: EventReader<ScreenRequest>,
    state: Res<State<Screen>>,
    mut next_state: ResMut<NextState<Screen>>,
    registry: Res<LevelRegistry>,
    mut session: ResMut<Session>,
    mut pending: ResMut<PendingLevel>,
    mut summary: ResMut<WinSummary>,
) {
    // Several requests in one frame cannot happen through normal play; the latest one wins.
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    match request {
        ScreenRequest::Menu => {
            info!("Returning to menu");
            next_state.set(Screen::Menu);
        }
        ScreenRequest::Play { level } => {
            let level = registry.wrap(level);
            info!("Starting level {}", level);

            *session = Session::new(level);
            pending.0 = Some(level);

            // Restarts happen in place; the play screen is never exited for them.
            if *state.get() != Screen::Play {
                next_state.set(Screen::Play);
            }
        }
        ScreenRequest::Win { coins } => {
            info!("All levels cleared with {} coins", coins);
            summary.coins = coins;
            next_state.set(Screen::Win);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::animation::AnimationPlugin;
    use crate::assets::GameAssets;
    use crate::audio::SoundEffect;
    use crate::collision::CollisionPlugin;
    use crate::hero::HeroPlugin;
    use crate::level::LevelPlugin;
    use crate::physics::{PhysicsPlugin, WorldBounds};
    use crate::spider::SpiderPlugin;
    use crate::tween::TweenPlugin;

    const FRAME: f32 = 1.0 / 60.0;

    /// Headless app with the flow and level pipeline but no rendering, audio or asset server.
    pub(crate) fn headless_app() -> App {
        headless_app_with(|_| {})
    }

    /// Like `headless_app`, with extra plugins registered before the first frame so their
    /// `OnEnter(Screen::Menu)` systems run.
    pub(crate) fn headless_app_with(extra: impl FnOnce(&mut App)) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, FlowPlugin, LevelPlugin))
            .add_event::<SoundEffect>()
            .init_resource::<GameAssets>()
            .init_resource::<WorldBounds>()
            .init_resource::<ButtonInput<KeyCode>>();
        extra(&mut app);
        app.update();
        app
    }

    /// Headless app running the whole play pipeline on a fixed 60 Hz clock, already on `level`.
    pub(crate) fn gameplay_app(level: usize) -> App {
        let mut app = headless_app_with(|app| {
            app.add_plugins((
                PhysicsPlugin,
                AnimationPlugin,
                TweenPlugin,
                HeroPlugin,
                SpiderPlugin,
                CollisionPlugin,
            ))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
                FRAME,
            )));
        });
        request(&mut app, ScreenRequest::Play { level });
        app
    }

    pub(crate) fn run_frames(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.update();
        }
    }

    pub(crate) fn request(app: &mut App, request: ScreenRequest) {
        app.world_mut().send_event(request);
        // One frame applies the request and spawns, the next runs the state transition.
        app.update();
        app.update();
    }

    pub(crate) fn screen(app: &App) -> Screen {
        *app.world().resource::<State<Screen>>().get()
    }

    #[test]
    fn starts_on_the_menu() {
        let app = headless_app();
        assert_eq!(screen(&app), Screen::Menu);
    }

    #[test]
    fn play_request_wraps_level_and_resets_session() {
        let mut app = headless_app();
        app.world_mut().resource_mut::<Session>().coins = 9;

        request(&mut app, ScreenRequest::Play { level: 3 });

        assert_eq!(screen(&app), Screen::Play);
        assert_eq!(*app.world().resource::<Session>(), Session::new(1));
    }

    #[test]
    fn win_request_carries_coins() {
        let mut app = headless_app();
        request(&mut app, ScreenRequest::Play { level: 0 });
        request(&mut app, ScreenRequest::Win { coins: 4 });

        assert_eq!(screen(&app), Screen::Win);
        assert_eq!(app.world().resource::<WinSummary>().coins, 4);
    }

    #[test]
    fn session_tracks_pickups() {
        let mut session = Session::new(1);
        session.collect_coin();
        session.collect_coin();
        session.pick_up_key();

        assert_eq!(session.coins, 2);
        assert!(session.has_key);
        assert_eq!(session.level, 1);
    }
}
