// src/movement/systems.rs

use bevy::prelude::*;

use crate::actions::{ActionState, PlayerAction};
use crate::config::ActiveConfig;
use crate::physics::{CollisionScene, CollisionWorld, ForceMode, GroundCollider, Layer, LayerMask, RigidBody};
use super::components::{JumpCooldown, MovementTuning, Mover, Orientation, Player, StandingScale};
use super::locomotion::{
    clamp_speed, is_walkable_slope, plan_move, select_state, wish_direction, MoveContext,
    CROUCH_IMPULSE, GROUND_PROBE_MARGIN, SLOPE_PROBE_MARGIN,
};

/// (1) Downward probes: grounded flag + walkable slope normal.
pub fn probe_ground(
    scene: Res<CollisionScene>,
    mut query: Query<(&Transform, &MovementTuning, &mut Mover)>,
) {
    let mask = LayerMask::of(Layer::Ground);
    for (tf, tuning, mut mover) in &mut query {
        let half_h = tuning.player_height * 0.5;
        let origin = tf.translation;

        mover.grounded = scene
            .raycast(origin, Vec3::NEG_Y, half_h + GROUND_PROBE_MARGIN, mask)
            .is_some();
        mover.slope_normal = scene
            .raycast(origin, Vec3::NEG_Y, half_h + SLOPE_PROBE_MARGIN, mask)
            .map(|hit| hit.normal)
            .filter(|n| is_walkable_slope(*n, tuning.max_slope_angle));
    }
}

/// (2) Walking / sprinting / crouching / air, and the matching speed.
pub fn select_movement_state(
    actions: Res<ActionState>,
    mut query: Query<(&MovementTuning, &mut Mover), With<Player>>,
) {
    for (tuning, mut mover) in &mut query {
        let (state, speed) = select_state(
            actions.pressed(PlayerAction::Crouch),
            actions.pressed(PlayerAction::Sprint),
            mover.grounded,
            mover.move_speed,
            tuning,
        );
        mover.state = state;
        mover.move_speed = speed;
    }
}

/// (3) Jump while held, grounded and off cooldown.
pub fn jump_system(
    mut commands: Commands,
    actions: Res<ActionState>,
    mut query: Query<(Entity, &Transform, &MovementTuning, &mut Mover, &mut RigidBody), With<Player>>,
) {
    if !actions.pressed(PlayerAction::Jump) {
        return;
    }
    for (entity, tf, tuning, mut mover, mut body) in &mut query {
        if !(mover.ready_to_jump && mover.grounded) {
            continue;
        }
        mover.ready_to_jump = false;
        mover.exiting_slope = true;

        body.velocity.y = 0.0;
        body.add_force(tf.up() * tuning.jump_force, ForceMode::Impulse);

        commands
            .entity(entity)
            .insert(JumpCooldown(Timer::from_seconds(tuning.jump_cooldown, TimerMode::Once)));
        debug!("Jump (state {:?})", mover.state);
    }
}

pub fn tick_jump_cooldown(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut JumpCooldown, &mut Mover)>,
) {
    for (entity, mut cooldown, mut mover) in &mut query {
        cooldown.tick(time.delta());
        if cooldown.finished() {
            mover.ready_to_jump = true;
            mover.exiting_slope = false;
            commands.entity(entity).remove::<JumpCooldown>();
        }
    }
}

/// (4) Turn input into forces (slope / ground / air).
pub fn move_player(
    time: Res<Time>,
    actions: Res<ActionState>,
    mut query: Query<(&Orientation, &MovementTuning, &mut Mover, &mut RigidBody), With<Player>>,
) {
    let dt = time.delta_secs();
    for (orientation, tuning, mut mover, mut body) in &mut query {
        mover.move_direction = wish_direction(
            orientation.forward(),
            orientation.right(),
            actions.horizontal(),
            actions.vertical(),
        );

        let plan = plan_move(
            &MoveContext {
                move_dir: mover.move_direction,
                velocity: body.velocity,
                move_speed: mover.move_speed,
                grounded: mover.grounded,
                slope_normal: mover.slope_normal,
                exiting_slope: mover.exiting_slope,
                dt,
            },
            tuning,
        );

        body.velocity = plan.velocity;
        body.add_force(plan.force, ForceMode::Force);
        body.use_gravity = plan.use_gravity;
        body.linear_damping = plan.drag;
    }
}

/// (5) After integration: cap speed for the current state.
pub fn speed_control(mut query: Query<(&Mover, &mut RigidBody)>) {
    for (mover, mut body) in &mut query {
        let on_slope = mover.on_slope() && !mover.exiting_slope;
        body.velocity = clamp_speed(body.velocity, mover.move_speed, on_slope);
    }
}

/// Crouch edges: shrink + push down on press, stand back up on release.
pub fn crouch_system(
    actions: Res<ActionState>,
    mut query: Query<(&MovementTuning, &StandingScale, &mut Transform, &mut RigidBody), With<Player>>,
) {
    let pressed = actions.just_pressed(PlayerAction::Crouch);
    let released = actions.just_released(PlayerAction::Crouch);
    if !pressed && !released {
        return;
    }
    for (tuning, standing, mut tf, mut body) in &mut query {
        if pressed {
            tf.scale.y = tuning.crouch_y_scale;
            body.add_force(Vec3::NEG_Y * CROUCH_IMPULSE, ForceMode::Impulse);
        } else {
            tf.scale.y = standing.0;
        }
    }
}

/// Re-apply tuning when the config asset (re)loads.
pub fn apply_movement_tuning(
    config: Res<ActiveConfig>,
    mut query: Query<(&mut MovementTuning, &mut RigidBody, &mut GroundCollider), With<Mover>>,
) {
    let m = &config.movement;
    for (mut tuning, mut body, mut collider) in &mut query {
        tuning.0 = m.clone();
        body.mass = m.mass;
        collider.half_height = m.player_height * 0.5;
        collider.max_climb_deg = m.max_climb_angle;
    }
}
