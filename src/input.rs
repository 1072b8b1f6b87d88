use bevy::input::{mouse::MouseMotion, keyboard::KeyCode, ButtonInput};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use std::f32::consts::FRAC_PI_2;

use crate::actions::{ActionState, PlayerAction};
use crate::config::ActiveConfig;
use crate::movement::{Orientation, Player};
use crate::setup::MainCamera;
use crate::state::GameState;

/// Eye height above the body origin, before crouch scaling.
pub const EYE_OFFSET: f32 = 0.6;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Everything that turns raw devices into `ActionState` / view changes.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputSet;

pub fn input_mapping_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    config: Res<ActiveConfig>,
    mut action_state: ResMut<ActionState>,
) {
    let b = &config.bindings;
    action_state.set(PlayerAction::MoveForward, keys.pressed(b.forward));
    action_state.set(PlayerAction::MoveBackward, keys.pressed(b.backward));
    action_state.set(PlayerAction::MoveLeft, keys.pressed(b.left));
    action_state.set(PlayerAction::MoveRight, keys.pressed(b.right));
    action_state.set(PlayerAction::Jump, keys.pressed(b.jump));
    action_state.set(PlayerAction::Sprint, keys.pressed(b.sprint));
    action_state.set(PlayerAction::Crouch, keys.pressed(b.crouch));
    action_state.set(PlayerAction::Reload, keys.pressed(b.reload));
    action_state.set(PlayerAction::NextWeapon, keys.pressed(b.next_weapon));
    action_state.set(PlayerAction::PrevWeapon, keys.pressed(b.prev_weapon));
    action_state.set(PlayerAction::Fire, mouse_buttons.pressed(b.fire));

    action_state.look_delta = motion_evr.read().map(|ev| ev.delta).sum();
}

/// Mouse look: yaw turns the body, pitch only the camera.
pub fn look_system(
    action_state: Res<ActionState>,
    config: Res<ActiveConfig>,
    mut players: Query<(&mut Orientation, &mut Transform), With<Player>>,
) {
    let delta = action_state.look_delta * config.mouse_sensitivity;
    for (mut orientation, mut tf) in &mut players {
        orientation.yaw -= delta.x;
        orientation.pitch = (orientation.pitch - delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        tf.rotation = orientation.yaw_rotation();
    }
}

pub fn camera_follow(
    players: Query<(&Transform, &Orientation), With<Player>>,
    mut cameras: Query<&mut Transform, (With<MainCamera>, Without<Player>)>,
) {
    let Ok((player_tf, orientation)) = players.single() else { return };
    let Ok(mut cam_tf) = cameras.single_mut() else { return };

    cam_tf.translation = player_tf.translation + Vec3::Y * EYE_OFFSET * player_tf.scale.y;
    cam_tf.rotation = orientation.look_rotation();
}

pub fn pause_toggle_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
    current_state: Res<State<GameState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        if current_state.get() == &GameState::Running {
            next_state.set(GameState::Paused);
            info!("Paused game");
        } else if current_state.get() == &GameState::Paused {
            next_state.set(GameState::Running);
            info!("Resumed game");
        }
    }
}

pub fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.single_mut() else { return };
    window.cursor_options.grab_mode = CursorGrabMode::Locked;
    window.cursor_options.visible = false;
}

pub fn release_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.single_mut() else { return };
    window.cursor_options.grab_mode = CursorGrabMode::None;
    window.cursor_options.visible = true;
}
