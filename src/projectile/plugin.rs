use bevy::prelude::*;

use crate::movement::MovementSet;
use crate::physics::PhysicsSet;
use crate::state::GameState;
use super::components::ProjectileImpact;
use super::systems::{expire_projectiles, resolve_impacts, sweep_projectiles};

/// Hit tests run once bodies have been moved and pushed out of the ground,
/// and before speed limits so blast impulses are clamped the same step.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ProjectileSet;

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app
            .add_event::<ProjectileImpact>()
            .configure_sets(
                FixedUpdate,
                ProjectileSet
                    .after(PhysicsSet::Resolve)
                    .before(MovementSet::Limit)
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(
                FixedUpdate,
                (sweep_projectiles, resolve_impacts).chain().in_set(ProjectileSet),
            )
            .add_systems(Update, expire_projectiles.run_if(in_state(GameState::Running)));
    }
}
