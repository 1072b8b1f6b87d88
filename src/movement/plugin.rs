use bevy::prelude::*;
use bevy::ecs::schedule::common_conditions::resource_exists_and_changed;

use crate::config::ActiveConfig;
use crate::input::InputSet;
use crate::movement::systems::{
    apply_movement_tuning, crouch_system, jump_system, move_player, probe_ground,
    select_movement_state, speed_control, tick_jump_cooldown,
};
use crate::physics::PhysicsSet;
use crate::state::GameState;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum MovementSet {
    /// Jump cooldown, probes, state, jump and forces (before integration).
    Drive,
    /// Speed limits (after ground resolution).
    Limit,
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app
            .configure_sets(
                FixedUpdate,
                (
                    MovementSet::Drive
                        .after(PhysicsSet::Prepare)
                        .before(PhysicsSet::Integrate),
                    MovementSet::Limit.after(PhysicsSet::Resolve),
                )
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(
                FixedUpdate,
                (
                    (
                        tick_jump_cooldown,
                        probe_ground,
                        select_movement_state,
                        jump_system,
                        move_player,
                    )
                        .chain()
                        .in_set(MovementSet::Drive),
                    speed_control.in_set(MovementSet::Limit),
                ),
            )
            .add_systems(
                Update,
                (
                    crouch_system.after(InputSet).run_if(in_state(GameState::Running)),
                    apply_movement_tuning.run_if(resource_exists_and_changed::<ActiveConfig>),
                ),
            );
    }
}
