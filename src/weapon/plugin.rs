use bevy::prelude::*;
use bevy::ecs::schedule::common_conditions::resource_exists_and_changed;

use crate::config::ActiveConfig;
use crate::input::InputSet;
use crate::state::GameState;
use super::components::{FireShot, SpreadRng};
use super::systems::{
    advance_weapon_timers, fire_projectiles, release_shots, reseed_spread_rng,
    switch_weapon_system, weapon_input_system,
};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct WeaponSet;

pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_event::<FireShot>()
            .init_resource::<SpreadRng>()
            .configure_sets(
                Update,
                WeaponSet
                    .after(InputSet)
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                (
                    switch_weapon_system,
                    advance_weapon_timers,
                    weapon_input_system,
                    release_shots,
                    fire_projectiles,
                )
                    .chain()
                    .in_set(WeaponSet),
            )
            .add_systems(
                Update,
                reseed_spread_rng.run_if(resource_exists_and_changed::<ActiveConfig>),
            );
    }
}
