//! Per-frame collision policy: which groups block each other, which overlaps trigger gameplay,
//! and what those triggers do to the session.

use bevy::prelude::*;

use crate::animation::Animator;
use crate::audio::SoundEffect;
use crate::hero::Hero;
use crate::level::{Coin, Door, EnemyWall, Key, LevelRegistry, Platform};
use crate::physics::{overlaps, separate, Body};
use crate::spider::Spider;
use crate::state::{GameSet, Screen, ScreenRequest, Session};

/// Registers the per-frame collision policy on the play screen.
pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            resolve_collisions
                .in_set(GameSet::Collisions)
                .run_if(in_state(Screen::Play)),
        );
    }
}

/// Outcome of the hero touching a live spider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyContact {
    /// The hero came down on the spider.
    Stomp,
    /// Anything else kills the hero.
    HeroKilled,
}

impl EnemyContact {
    pub fn classify(hero: &Body) -> Self {
        if hero.velocity.y > 0.0 {
            EnemyContact::Stomp
        } else {
            EnemyContact::HeroKilled
        }
    }
}

/// The door only opens for a hero who holds the key and stands on the ground.
pub fn door_opens(session: &Session, hero: &Body) -> bool {
    session.has_key && hero.on_ground()
}

/// Where walking through the door leads: the next level, or the win screen after the last one.
pub fn door_destination(session: &Session, registry: &LevelRegistry) -> ScreenRequest {
    if registry.is_last(session.level) {
        ScreenRequest::Win {
            coins: session.coins,
        }
    } else {
        ScreenRequest::Play {
            level: session.level + 1,
        }
    }
}

type HeroBody<'w, 's> = Query<'w, 's, &'static mut Body, (With<Hero>, Without<Spider>)>;
type SpiderBodies<'w, 's> =
    Query<'w, 's, (&'static mut Spider, &'static mut Body, &'static mut Animator), Without<Hero>>;
type StaticBodies<'w, 's, F> =
    Query<'w, 's, (Entity, &'static Body), (F, Without<Hero>, Without<Spider>)>;

/// Runs the checks in a fixed order. The first check that ends the attempt (death or door)
/// stops the pass so nothing else fires against a level that is about to be replaced.
#[allow(clippy::too_many_arguments)]
fn resolve_collisions(
    mut commands: Commands,
    mut session: ResMut<Session>,
    registry: Res<LevelRegistry>,
    mut heroes: HeroBody,
    mut spiders: SpiderBodies,
    platforms: StaticBodies<With<Platform>>,
    walls: StaticBodies<With<EnemyWall>>,
    coins: StaticBodies<With<Coin>>,
    keys: StaticBodies<With<Key>>,
    doors: StaticBodies<With<Door>>,
    mut sounds: EventWriter<SoundEffect>,
    mut screens: EventWriter<ScreenRequest>,
) {
    for (_, mut body, _) in &mut spiders {
        for (_, platform) in &platforms {
            separate(&mut body, platform);
        }
    }

    for (_, mut body, _) in &mut spiders {
        for (_, wall) in &walls {
            separate(&mut body, wall);
        }
    }

    let Ok(mut hero) = heroes.get_single_mut() else {
        return;
    };

    for (_, platform) in &platforms {
        separate(&mut hero, platform);
    }

    for (entity, coin) in &coins {
        if overlaps(&hero, coin) {
            sounds.send(SoundEffect::Coin);
            commands.entity(entity).despawn_recursive();
            session.collect_coin();
            debug!("Coin collected ({} total)", session.coins);
        }
    }

    for (mut spider, mut body, mut animator) in &mut spiders {
        if !overlaps(&hero, &body) {
            continue;
        }

        match EnemyContact::classify(&hero) {
            EnemyContact::Stomp => {
                Hero::bounce(&mut hero);
                spider.die(&mut body, &mut animator);
                sounds.send(SoundEffect::Stomp);
            }
            EnemyContact::HeroKilled => {
                info!("Hero killed on level {}; restarting", session.level);
                sounds.send(SoundEffect::Stomp);
                screens.send(ScreenRequest::Play {
                    level: session.level,
                });
                return;
            }
        }
    }

    for (entity, key) in &keys {
        if overlaps(&hero, key) {
            sounds.send(SoundEffect::Key);
            commands.entity(entity).despawn_recursive();
            session.pick_up_key();
            debug!("Key picked up on level {}", session.level);
        }
    }

    for (_, door) in &doors {
        if !overlaps(&hero, door) || !door_opens(&session, &hero) {
            continue;
        }

        sounds.send(SoundEffect::Door);
        screens.send(door_destination(&session, &registry));
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::HERO_SIZE;
    use crate::level::LevelEntity;
    use crate::state::tests::{headless_app, request, screen};
    use crate::state::WinSummary;

    fn policy_app(level: usize) -> App {
        let mut app = headless_app();
        app.add_plugins(CollisionPlugin);
        request(&mut app, ScreenRequest::Play { level });
        app
    }

    fn place_hero(app: &mut App, position: Vec2, velocity: Vec2) {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&mut Body, With<Hero>>();
        let mut body = query.single_mut(world);
        body.position = position;
        body.velocity = velocity;
    }

    fn hero_body(app: &mut App) -> Body {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Body, With<Hero>>();
        query.single(world).clone()
    }

    /// Centre of a hero standing on the ground 1 unit deep, so the platform pass reports contact.
    fn standing_at_door(app: &App) -> Vec2 {
        let session = app.world().resource::<Session>();
        let registry = app.world().resource::<LevelRegistry>();
        let door = registry.get(session.level).map(|level| level.door).unwrap();
        Vec2::new(door.x, door.y - HERO_SIZE.y * 0.5 + 1.0)
    }

    fn sounds(app: &App) -> Vec<SoundEffect> {
        let events = app.world().resource::<Events<SoundEffect>>();
        let mut reader = events.get_reader();
        reader.read(events).copied().collect()
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let world = app.world_mut();
        let mut query = world.query_filtered::<Entity, F>();
        query.iter(world).count()
    }

    #[test]
    fn enemy_contact_depends_on_falling() {
        let mut hero = Body::dynamic(Vec2::ZERO, HERO_SIZE);
        hero.velocity.y = 1.0;
        assert_eq!(EnemyContact::classify(&hero), EnemyContact::Stomp);
        hero.velocity.y = 0.0;
        assert_eq!(EnemyContact::classify(&hero), EnemyContact::HeroKilled);
        hero.velocity.y = -600.0;
        assert_eq!(EnemyContact::classify(&hero), EnemyContact::HeroKilled);
    }

    #[test]
    fn door_guard_needs_key_and_ground() {
        let mut hero = Body::dynamic(Vec2::ZERO, HERO_SIZE);
        let mut session = Session::new(0);

        hero.touching.down = true;
        assert!(!door_opens(&session, &hero));

        session.pick_up_key();
        assert!(door_opens(&session, &hero));

        hero.touching.down = false;
        assert!(!door_opens(&session, &hero));
    }

    #[test]
    fn door_leads_to_next_level_or_win() {
        let registry = LevelRegistry::builtin();
        let mut session = Session::new(0);
        session.coins = 5;
        assert_eq!(
            door_destination(&session, &registry),
            ScreenRequest::Play { level: 1 }
        );

        session.level = 1;
        assert_eq!(
            door_destination(&session, &registry),
            ScreenRequest::Win { coins: 5 }
        );
    }

    #[test]
    fn coins_are_collected_once() {
        let mut app = policy_app(0);
        let coins_before = count::<With<Coin>>(&mut app);

        place_hero(&mut app, Vec2::new(63.0, 138.0), Vec2::ZERO);
        app.update();
        app.update();

        assert_eq!(app.world().resource::<Session>().coins, 1);
        assert_eq!(count::<With<Coin>>(&mut app), coins_before - 1);
        assert!(sounds(&app).contains(&SoundEffect::Coin));
    }

    #[test]
    fn key_pickup_sets_the_flag() {
        let mut app = policy_app(0);

        place_hero(&mut app, Vec2::new(840.0, 120.0), Vec2::ZERO);
        app.update();

        assert!(app.world().resource::<Session>().has_key);
        assert_eq!(count::<With<Key>>(&mut app), 0);
        assert!(sounds(&app).contains(&SoundEffect::Key));
    }

    #[test]
    fn door_without_key_does_nothing() {
        let mut app = policy_app(1);
        let at = standing_at_door(&app);

        place_hero(&mut app, at, Vec2::ZERO);
        app.update();
        app.update();

        assert_eq!(screen(&app), Screen::Play);
        assert_eq!(app.world().resource::<Session>().level, 1);
        assert!(!sounds(&app).contains(&SoundEffect::Door));
    }

    #[test]
    fn door_in_mid_air_does_nothing() {
        let mut app = policy_app(1);
        app.world_mut().resource_mut::<Session>().has_key = true;
        let at = standing_at_door(&app) - Vec2::new(0.0, 10.0);

        place_hero(&mut app, at, Vec2::ZERO);
        app.update();
        app.update();

        assert_eq!(screen(&app), Screen::Play);
        assert!(app.world().resource::<Session>().has_key);
        assert!(!sounds(&app).contains(&SoundEffect::Door));
    }

    #[test]
    fn door_on_last_level_wins_with_session_coins() {
        let mut app = policy_app(1);
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            session.has_key = true;
            session.coins = 7;
        }
        let at = standing_at_door(&app);

        place_hero(&mut app, at, Vec2::ZERO);
        app.update();
        assert!(sounds(&app).contains(&SoundEffect::Door));
        app.update();

        assert_eq!(screen(&app), Screen::Win);
        assert_eq!(app.world().resource::<WinSummary>().coins, 7);
        assert_eq!(count::<With<LevelEntity>>(&mut app), 0);
    }

    #[test]
    fn door_advances_to_the_next_level() {
        let mut app = policy_app(0);
        app.world_mut().resource_mut::<Session>().has_key = true;
        let at = standing_at_door(&app);

        place_hero(&mut app, at, Vec2::ZERO);
        app.update();
        app.update();

        assert_eq!(screen(&app), Screen::Play);
        assert_eq!(*app.world().resource::<Session>(), Session::new(1));
    }

    #[test]
    fn stomping_kills_the_spider_and_bounces() {
        let mut app = policy_app(0);
        {
            let world = app.world_mut();
            let mut query = world.query::<(&Spider, &mut Body)>();
            let (_, mut body) = query.iter_mut(world).next().unwrap();
            body.position = Vec2::new(150.0, 310.0);
            body.velocity = Vec2::ZERO;
        }

        place_hero(&mut app, Vec2::new(150.0, 290.0), Vec2::new(0.0, 100.0));
        app.update();

        assert_eq!(hero_body(&mut app).velocity.y, -200.0);
        assert_eq!(screen(&app), Screen::Play);
        assert!(sounds(&app).contains(&SoundEffect::Stomp));

        let world = app.world_mut();
        let mut query = world.query::<(&Spider, &Body)>();
        let dead: Vec<_> = query
            .iter(world)
            .filter(|(spider, body)| !spider.is_alive() && !body.enabled)
            .collect();
        assert_eq!(dead.len(), 1);
    }

    #[test]
    fn touching_a_spider_restarts_the_level() {
        let mut app = policy_app(0);
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            session.coins = 3;
            session.has_key = true;
        }
        let hero = hero_body(&mut app);
        {
            let world = app.world_mut();
            let mut query = world.query::<(&Spider, &mut Body)>();
            let (_, mut body) = query.iter_mut(world).next().unwrap();
            body.position = hero.position;
        }

        app.update();
        app.update();

        assert_eq!(screen(&app), Screen::Play);
        assert_eq!(*app.world().resource::<Session>(), Session::new(0));
        assert_eq!(count::<With<Hero>>(&mut app), 1);
        let registry = LevelRegistry::builtin();
        assert_eq!(
            count::<With<Spider>>(&mut app),
            registry.get(0).map(|level| level.spiders.len()).unwrap()
        );
    }
}
