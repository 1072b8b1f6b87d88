use bevy::prelude::*;
use bevy::ui::BackgroundColor;

use crate::movement::{MovementState, Mover, Player};
use crate::physics::RigidBody;
use crate::weapon::{ActiveWeapon, GunState, Weapon};

#[derive(Component)]
pub struct PauseOverlay;

#[derive(Component)]
pub struct VelocityText;

#[derive(Component)]
pub struct SpeedText;

#[derive(Component)]
pub struct AmmoText;

pub fn format_velocity(v: Vec3) -> String {
    format!("Velocity:({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

pub fn format_speed(state: MovementState, horizontal_speed: f32) -> String {
    format!("{state:?}  Speed: {horizontal_speed:.1}")
}

pub fn format_ammo(ammo: u32, max_ammo: u32, gun_state: GunState) -> String {
    match gun_state {
        GunState::Reloading => format!("Reloading... / {max_ammo}"),
        GunState::Full | GunState::Empty => format!("{ammo} / {max_ammo}"),
    }
}

pub fn spawn_pause_overlay(mut commands: Commands) {
    commands.spawn((
        // Fullscreen transparent overlay node
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::linear_rgba(0.0, 0.0, 0.0, 0.7)),
        PauseOverlay,
    ))
    .with_children(|parent| {
        parent.spawn((
            Text::new("Paused"),
            TextFont {
                font_size: 64.0,
                ..default()
            },
            TextLayout::new_with_justify(JustifyText::Center),
            TextColor(Color::WHITE),
        ));
    });
}

pub fn despawn_pause_overlay(
    mut commands: Commands,
    query: Query<Entity, With<PauseOverlay>>,
) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

pub fn spawn_hud(mut commands: Commands) {
    let font = TextFont { font_size: 20.0, ..default() };

    // Top-left: motion readouts
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            flex_direction: FlexDirection::Column,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((Text::new(format_velocity(Vec3::ZERO)), font.clone(), TextColor(Color::WHITE), VelocityText));
            parent.spawn((Text::new(""), font.clone(), TextColor(Color::WHITE), SpeedText));
        });

    // Bottom-right: ammo
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            right: Val::Px(16.0),
            ..default()
        },
        Text::new(""),
        TextFont { font_size: 32.0, ..default() },
        TextColor(Color::WHITE),
        AmmoText,
    ));

    // Crosshair
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Node { width: Val::Px(4.0), height: Val::Px(4.0), ..default() },
                BackgroundColor(Color::WHITE),
            ));
        });
}

pub fn update_motion_text(
    players: Query<(&Mover, &RigidBody), With<Player>>,
    mut velocity_text: Query<&mut Text, (With<VelocityText>, Without<SpeedText>)>,
    mut speed_text: Query<&mut Text, (With<SpeedText>, Without<VelocityText>)>,
) {
    let Ok((mover, body)) = players.single() else { return };
    let v = body.velocity;

    if let Ok(mut text) = velocity_text.single_mut() {
        text.0 = format_velocity(v);
    }
    if let Ok(mut text) = speed_text.single_mut() {
        text.0 = format_speed(mover.state, Vec2::new(v.x, v.z).length());
    }
}

pub fn update_ammo_text(
    weapons: Query<&Weapon, With<ActiveWeapon>>,
    mut ammo_text: Query<&mut Text, With<AmmoText>>,
) {
    let Ok(mut text) = ammo_text.single_mut() else { return };
    let Ok(weapon) = weapons.single() else {
        text.0.clear();
        return;
    };
    let s = &weapon.state;
    text.0 = format_ammo(s.ammo(), s.max_ammo(), s.gun_state());
}
