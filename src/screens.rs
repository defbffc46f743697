//! Title and win screens. Both are plain UI overlays spawned on state entry and torn down on exit.
//!
//! UI entities are part of Bevy's ECS; despawning the root drops all of its text children.

use bevy::prelude::*;

use crate::animation::{AnimationClip, Animator};
use crate::assets::GameAssets;
use crate::state::{FlowSet, Screen, ScreenRequest, WinSummary};

pub const TITLE: &str = "Adventures of Leat";

/// Registers the menu and win overlays and their W-key transitions.
pub struct ScreensPlugin;

impl Plugin for ScreensPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Menu), spawn_menu_screen)
            .add_systems(OnExit(Screen::Menu), despawn_screen::<MenuScreen>)
            .add_systems(OnEnter(Screen::Win), spawn_win_screen)
            .add_systems(OnExit(Screen::Win), despawn_screen::<WinScreen>)
            .add_systems(
                Update,
                (
                    start_from_menu.run_if(in_state(Screen::Menu)),
                    return_to_menu.run_if(in_state(Screen::Win)),
                )
                    .before(FlowSet),
            );
    }
}

#[derive(Component)]
struct MenuScreen;

#[derive(Component)]
struct WinScreen;

pub fn win_message(coins: u32) -> String {
    format!("You collected {coins} coins. Nice job!")
}

fn text_style(font_size: f32) -> TextStyle {
    TextStyle {
        font_size,
        color: Color::srgb(0.95, 0.95, 0.9),
        ..default()
    }
}

fn screen_root() -> NodeBundle {
    NodeBundle {
        background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.4)),
        style: Style {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(24.0),
            ..default()
        },
        ..default()
    }
}

fn spawn_menu_screen(mut commands: Commands) {
    commands
        .spawn((MenuScreen, Name::new("MenuScreen"), screen_root()))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(TITLE, text_style(56.0)));
            parent.spawn(TextBundle::from_section(
                "Press the \"W\" key to start",
                text_style(28.0),
            ));
        });
}

fn spawn_win_screen(mut commands: Commands, assets: Res<GameAssets>, summary: Res<WinSummary>) {
    commands
        .spawn((WinScreen, Name::new("WinScreen"), screen_root()))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section("Yay!", text_style(56.0)));
            parent.spawn((
                ImageBundle {
                    image: UiImage::new(assets.coin.image.clone()),
                    style: Style {
                        width: Val::Px(44.0),
                        height: Val::Px(44.0),
                        ..default()
                    },
                    ..default()
                },
                assets.coin.atlas(0),
                Animator::default()
                    .with_clip("rotate", AnimationClip::looping(&[0, 1, 2, 1], 6.0))
                    .playing("rotate"),
            ));
            parent.spawn(TextBundle::from_section(
                win_message(summary.coins),
                text_style(32.0),
            ));
            parent.spawn(TextBundle::from_section(
                "Press the \"W\" key to restart",
                text_style(28.0),
            ));
        });
}

fn start_from_menu(keys: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<ScreenRequest>) {
    if keys.just_pressed(KeyCode::KeyW) {
        requests.send(ScreenRequest::Play { level: 0 });
    }
}

fn return_to_menu(keys: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<ScreenRequest>) {
    if keys.just_pressed(KeyCode::KeyW) {
        requests.send(ScreenRequest::Menu);
    }
}

fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
