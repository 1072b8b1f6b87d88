use bevy::prelude::*;

use crate::physics::body::{
    ground_collision_system, integrate_bodies, record_previous_system, Gravity,
};
use crate::physics::ground::Ground;
use crate::physics::query::{sync_collision_scene, CollisionScene};
use crate::state::GameState;

/// Fixed-step ordering. Gameplay forces go between `Prepare` and `Integrate`,
/// speed limits and hit tests after `Resolve`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PhysicsSet {
    Prepare,
    Integrate,
    Resolve,
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<Gravity>()
            .init_resource::<Ground>()
            .init_resource::<CollisionScene>()
            .configure_sets(
                FixedUpdate,
                (PhysicsSet::Prepare, PhysicsSet::Integrate, PhysicsSet::Resolve)
                    .chain()
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(
                FixedUpdate,
                (
                    (record_previous_system, sync_collision_scene).in_set(PhysicsSet::Prepare),
                    integrate_bodies.in_set(PhysicsSet::Integrate),
                    ground_collision_system.in_set(PhysicsSet::Resolve),
                ),
            );
    }
}
