use bevy::prelude::*;

use crate::config::MovementConfig;

/// Marks the locally controlled character.
#[derive(Component)]
pub struct Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MovementState {
    #[default]
    Walking,
    Sprinting,
    Crouching,
    Air,
}

/// Locomotion state. Velocity itself lives on the `RigidBody`.
#[derive(Component, Clone, Debug)]
pub struct Mover {
    pub grounded: bool,
    pub state: MovementState,
    pub move_speed: f32,
    /// Normal of the walkable slope under the mover, if any.
    pub slope_normal: Option<Vec3>,
    /// Set by a jump so slope forces do not pin the mover down.
    pub exiting_slope: bool,
    pub ready_to_jump: bool,
    /// Last input direction (world space, not normalized).
    pub move_direction: Vec3,
}

impl Mover {
    pub fn new(move_speed: f32) -> Self {
        Self {
            grounded: false,
            state: MovementState::Air,
            move_speed,
            slope_normal: None,
            exiting_slope: false,
            ready_to_jump: true,
            move_direction: Vec3::ZERO,
        }
    }

    pub fn on_slope(&self) -> bool {
        self.slope_normal.is_some()
    }
}

/// Per-mover tuning (copied from the active config).
#[derive(Component, Clone, Debug, Deref)]
pub struct MovementTuning(pub MovementConfig);

/// Look direction. Movement only follows `yaw`.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn look_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.yaw_rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.yaw_rotation() * Vec3::X
    }
}

/// Counts down until the mover may jump again.
#[derive(Component, Deref, DerefMut)]
pub struct JumpCooldown(pub Timer);

/// Y-scale restored when standing up.
#[derive(Component, Clone, Copy, Debug)]
pub struct StandingScale(pub f32);

/// Where the player respawns.
#[derive(Component, Clone, Copy, Debug)]
pub struct SpawnPoint(pub Vec3);
