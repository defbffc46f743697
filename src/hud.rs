//! In-play overlay: key indicator and coin counter in the top-left corner.

use bevy::prelude::*;

use crate::assets::GameAssets;
use crate::state::{GameSet, Screen, Session};

/// Registers HUD spawn/despawn around the play screen and its per-frame refresh.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Play), spawn_hud)
            .add_systems(OnExit(Screen::Play), despawn_hud)
            .add_systems(
                Update,
                update_hud
                    .in_set(GameSet::Presentation)
                    .run_if(in_state(Screen::Play)),
            );
    }
}

#[derive(Component)]
struct Hud;

#[derive(Component)]
struct KeyIcon;

#[derive(Component)]
struct CoinLabel;

pub fn coin_label(coins: u32) -> String {
    format!("x{coins}")
}

/// Frame 0 is the empty key outline, frame 1 the filled key.
pub fn key_icon_frame(has_key: bool) -> usize {
    usize::from(has_key)
}

fn spawn_hud(mut commands: Commands, assets: Res<GameAssets>, session: Res<Session>) {
    commands
        .spawn((
            Hud,
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Px(10.0),
                    top: Val::Px(10.0),
                    align_items: AlignItems::Center,
                    column_gap: Val::Px(6.0),
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                KeyIcon,
                ImageBundle {
                    image: UiImage::new(assets.key_icon.image.clone()),
                    ..default()
                },
                assets.key_icon.atlas(key_icon_frame(session.has_key)),
            ));
            parent.spawn(ImageBundle {
                image: UiImage::new(assets.coin_icon.clone()),
                ..default()
            });
            parent.spawn((
                CoinLabel,
                TextBundle::from_section(
                    coin_label(session.coins),
                    TextStyle {
                        font_size: 28.0,
                        color: Color::WHITE,
                        ..default()
                    },
                ),
            ));
        });
}

fn update_hud(
    session: Res<Session>,
    mut icons: Query<&mut TextureAtlas, With<KeyIcon>>,
    mut labels: Query<&mut Text, With<CoinLabel>>,
) {
    let frame = key_icon_frame(session.has_key);
    for mut atlas in &mut icons {
        if atlas.index != frame {
            atlas.index = frame;
        }
    }

    let label = coin_label(session.coins);
    for mut text in &mut labels {
        if let Some(section) = text.sections.first_mut() {
            if section.value != label {
                section.value.clone_from(&label);
            }
        }
    }
}

fn despawn_hud(mut commands: Commands, query: Query<Entity, With<Hud>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{headless_app_with, request, screen};
    use crate::state::ScreenRequest;

    fn hud_app() -> App {
        headless_app_with(|app| {
            app.add_plugins(HudPlugin);
        })
    }

    fn label_text(app: &mut App) -> String {
        let mut query = app
            .world_mut()
            .query_filtered::<&Text, With<CoinLabel>>();
        query.single(app.world()).sections[0].value.clone()
    }

    #[test]
    fn label_and_key_frame_follow_the_session() {
        assert_eq!(coin_label(0), "x0");
        assert_eq!(coin_label(12), "x12");
        assert_eq!(key_icon_frame(false), 0);
        assert_eq!(key_icon_frame(true), 1);
    }

    #[test]
    fn hud_tracks_pickups_during_play() {
        let mut app = hud_app();
        request(&mut app, ScreenRequest::Play { level: 0 });
        assert_eq!(screen(&app), Screen::Play);
        assert_eq!(label_text(&mut app), "x0");

        {
            let mut session = app.world_mut().resource_mut::<Session>();
            session.collect_coin();
            session.collect_coin();
            session.pick_up_key();
        }
        app.update();

        assert_eq!(label_text(&mut app), "x2");
        let mut icons = app
            .world_mut()
            .query_filtered::<&TextureAtlas, With<KeyIcon>>();
        assert_eq!(icons.single(app.world()).index, 1);
    }

    #[test]
    fn hud_is_removed_when_play_ends() {
        let mut app = hud_app();
        request(&mut app, ScreenRequest::Play { level: 0 });
        request(&mut app, ScreenRequest::Menu);

        let mut huds = app.world_mut().query_filtered::<Entity, With<Hud>>();
        assert_eq!(huds.iter(app.world()).count(), 0);
    }
}
