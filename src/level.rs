// src/level.rs
//! Level exit pads: standing on one starts a countdown, after which a
//! `LoadLevel` request goes out. Scene loading itself lives elsewhere; here
//! the request just puts the player back on its spawn point.

use bevy::prelude::*;

use crate::movement::{Player, SpawnPoint};
use crate::physics::{CollisionScene, CollisionWorld, Layer, LayerMask, PhysicsSet, RigidBody};
use crate::state::GameState;

#[derive(Component, Clone, Debug)]
pub struct LevelExit {
    pub target_level: String,
    /// Seconds between touching the pad and the load request.
    pub transition_time: f32,
    pub radius: f32,
}

/// Countdown running on an exit the player has touched.
#[derive(Component, Deref, DerefMut)]
pub struct PendingTransition(pub Timer);

#[derive(Event, Clone, Debug, PartialEq, Eq)]
pub struct LoadLevel {
    pub name: String,
}

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LoadLevel>().add_systems(
            FixedUpdate,
            (detect_exit_overlap, tick_transitions, handle_load_level)
                .chain()
                .after(PhysicsSet::Resolve)
                .run_if(in_state(GameState::Running)),
        );
    }
}

fn detect_exit_overlap(
    mut commands: Commands,
    scene: Res<CollisionScene>,
    exits: Query<(Entity, &Transform, &LevelExit), Without<PendingTransition>>,
) {
    let mask = LayerMask::of(Layer::Player);
    for (entity, tf, exit) in &exits {
        if scene.overlap_sphere(tf.translation, exit.radius, mask).is_empty() {
            continue;
        }
        info!("Reached exit to '{}', leaving in {:.1}s", exit.target_level, exit.transition_time);
        commands
            .entity(entity)
            .insert(PendingTransition(Timer::from_seconds(exit.transition_time, TimerMode::Once)));
    }
}

fn tick_transitions(
    time: Res<Time>,
    mut commands: Commands,
    mut requests: EventWriter<LoadLevel>,
    mut exits: Query<(Entity, &LevelExit, &mut PendingTransition)>,
) {
    for (entity, exit, mut pending) in &mut exits {
        pending.tick(time.delta());
        if pending.finished() {
            requests.write(LoadLevel { name: exit.target_level.clone() });
            commands.entity(entity).remove::<PendingTransition>();
        }
    }
}

fn handle_load_level(
    mut requests: EventReader<LoadLevel>,
    mut players: Query<(&SpawnPoint, &mut Transform, &mut RigidBody), With<Player>>,
) {
    for request in requests.read() {
        info!("Load level requested: '{}'", request.name);
        for (spawn, mut tf, mut body) in &mut players {
            tf.translation = spawn.0;
            body.velocity = Vec3::ZERO;
        }
    }
}
