use bevy::prelude::*;

mod actions;
mod config;
mod input;
mod level;
mod movement;
mod physics;
mod projectile;
mod setup;
mod state;
mod ui;
mod weapon;

use actions::ActionState;
use config::{config_ready, ConfigPlugin};
use input::{
    camera_follow, grab_cursor, input_mapping_system, look_system, pause_toggle_system,
    release_cursor, InputSet,
};
use level::LevelPlugin;
use movement::{MovementPlugin, Player};
use physics::PhysicsPlugin;
use projectile::ProjectilePlugin;
use state::GameState;
use ui::{despawn_pause_overlay, spawn_hud, spawn_pause_overlay, update_ammo_text, update_motion_text};
use weapon::{WeaponPlugin, WeaponSet};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "strafe".into(),
                ..default()
            }),
            ..default()
        }))
        // data + simulation
        .add_plugins(ConfigPlugin::default())
        .add_plugins(PhysicsPlugin)
        .add_plugins(MovementPlugin)
        .add_plugins(ProjectilePlugin)
        .add_plugins(WeaponPlugin)
        .add_plugins(LevelPlugin)
        // init resources & game-state
        .init_resource::<ActionState>()
        .init_state::<GameState>()
        // level, camera, HUD
        .add_systems(Startup, (setup::setup, spawn_hud))
        .add_systems(
            Update,
            setup::spawn_player.run_if(config_ready.and(not(any_with_component::<Player>))),
        )
        // pause menu + cursor
        .add_systems(OnEnter(GameState::Paused), (spawn_pause_overlay, release_cursor))
        .add_systems(OnExit(GameState::Paused), despawn_pause_overlay)
        .add_systems(OnEnter(GameState::Running), grab_cursor)
        // input + camera + pause toggle each frame
        .add_systems(Update, pause_toggle_system)
        .add_systems(
            Update,
            (input_mapping_system, look_system, camera_follow)
                .chain()
                .in_set(InputSet)
                .run_if(in_state(GameState::Running).and(config_ready)),
        )
        .add_systems(Update, (update_motion_text, update_ammo_text).after(WeaponSet))
        .run();
}
