// src/movement/mod.rs

mod components;
mod locomotion;
mod plugin;
mod systems;

pub use components::{MovementState, MovementTuning, Mover, Orientation, Player, SpawnPoint, StandingScale};
pub use plugin::{MovementPlugin, MovementSet};
