// src/movement/locomotion.rs
//! Pure movement math: state selection, slope handling, air strafing and
//! speed limits. Systems feed these from the ECS; tests feed them directly.

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::physics::slope_angle_deg;
use super::components::MovementState;

/// Force per unit of move speed while on a walkable slope.
pub const SLOPE_FORCE_SCALE: f32 = 20.0;
/// Force per unit of move speed on flat ground (and, scaled, in the air).
pub const GROUND_FORCE_SCALE: f32 = 10.0;
/// Extra downward force while travelling up a slope.
pub const SLOPE_DOWNFORCE: f32 = 30.0;
/// Downward impulse when starting to crouch.
pub const CROUCH_IMPULSE: f32 = 5.0;
/// Probe margins below the feet.
pub const GROUND_PROBE_MARGIN: f32 = 0.2;
pub const SLOPE_PROBE_MARGIN: f32 = 0.3;
/// Below this many degrees the ground counts as flat.
const FLAT_EPSILON_DEG: f32 = 0.01;

/// Crouch wins, then sprint (grounded only), then walk; airborne keeps the
/// previous move speed.
pub fn select_state(
    crouch_held: bool,
    sprint_held: bool,
    grounded: bool,
    current_speed: f32,
    cfg: &MovementConfig,
) -> (MovementState, f32) {
    if crouch_held {
        (MovementState::Crouching, cfg.crouch_speed)
    } else if grounded && sprint_held {
        (MovementState::Sprinting, cfg.sprint_speed)
    } else if grounded {
        (MovementState::Walking, cfg.walk_speed)
    } else {
        (MovementState::Air, current_speed)
    }
}

/// `forward * vertical + right * horizontal`, not normalized.
pub fn wish_direction(forward: Vec3, right: Vec3, horizontal: f32, vertical: f32) -> Vec3 {
    forward * vertical + right * horizontal
}

/// True when `normal` is tilted but no steeper than `max_slope_deg`.
pub fn is_walkable_slope(normal: Vec3, max_slope_deg: f32) -> bool {
    let angle = slope_angle_deg(normal);
    angle < max_slope_deg && angle > FLAT_EPSILON_DEG
}

/// Move direction projected onto the slope plane, normalized.
pub fn slope_move_direction(move_dir: Vec3, normal: Vec3) -> Vec3 {
    move_dir.reject_from_normalized(normal.normalize_or(Vec3::Y)).normalize_or_zero()
}

/// Quake-style air acceleration: only adds speed along `move_dir` until the
/// projected speed reaches the wish speed.
pub fn air_accelerate(velocity: Vec3, move_dir: Vec3, move_speed: f32, cfg: &MovementConfig, dt: f32) -> Vec3 {
    let wish_dir = move_dir.normalize_or_zero();
    if wish_dir == Vec3::ZERO {
        return velocity;
    }
    let wish_speed = (move_speed * cfg.air_multiplier).min(cfg.air_speed_cap);
    let proj_speed = velocity.dot(wish_dir);
    let add_speed = wish_speed - proj_speed;
    if add_speed <= 0.0 {
        return velocity;
    }
    let accel_speed = (cfg.air_accelerate * wish_speed * dt).min(add_speed);
    velocity + wish_dir * accel_speed
}

/// On a slope the whole velocity is limited; elsewhere only the XZ part.
pub fn clamp_speed(velocity: Vec3, max_speed: f32, on_slope: bool) -> Vec3 {
    if on_slope {
        return velocity.clamp_length_max(max_speed);
    }
    let flat = Vec3::new(velocity.x, 0.0, velocity.z);
    if flat.length() > max_speed {
        let limited = flat.normalize() * max_speed;
        Vec3::new(limited.x, velocity.y, limited.z)
    } else {
        velocity
    }
}

/// What the mover should do with its body this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovePlan {
    /// Continuous force to add.
    pub force: Vec3,
    /// Velocity after any direct (air-strafe) change.
    pub velocity: Vec3,
    pub use_gravity: bool,
    pub drag: f32,
}

/// Inputs for one movement step.
#[derive(Clone, Copy, Debug)]
pub struct MoveContext {
    pub move_dir: Vec3,
    pub velocity: Vec3,
    pub move_speed: f32,
    pub grounded: bool,
    /// Walkable slope normal under the mover, if any.
    pub slope_normal: Option<Vec3>,
    pub exiting_slope: bool,
    pub dt: f32,
}

pub fn plan_move(ctx: &MoveContext, cfg: &MovementConfig) -> MovePlan {
    let on_slope = ctx.slope_normal.is_some();
    let mut plan = MovePlan {
        force: Vec3::ZERO,
        velocity: ctx.velocity,
        use_gravity: !on_slope,
        drag: if ctx.grounded || on_slope { cfg.ground_drag } else { 0.0 },
    };

    match ctx.slope_normal {
        Some(normal) if !ctx.exiting_slope => {
            plan.force = slope_move_direction(ctx.move_dir, normal) * ctx.move_speed * SLOPE_FORCE_SCALE;
            if ctx.velocity.y > 0.0 {
                plan.force += Vec3::NEG_Y * SLOPE_DOWNFORCE;
            }
        }
        _ if ctx.grounded => {
            plan.force = ctx.move_dir.normalize_or_zero() * ctx.move_speed * GROUND_FORCE_SCALE;
        }
        _ => {
            plan.velocity = air_accelerate(ctx.velocity, ctx.move_dir, ctx.move_speed, cfg, ctx.dt);
            plan.force =
                ctx.move_dir.normalize_or_zero() * ctx.move_speed * GROUND_FORCE_SCALE * cfg.air_multiplier;
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn cfg() -> MovementConfig {
        MovementConfig::default()
    }

    #[test]
    fn state_priority() {
        let c = cfg();
        assert_eq!(select_state(true, true, true, 0.0, &c), (MovementState::Crouching, c.crouch_speed));
        assert_eq!(select_state(true, false, false, 0.0, &c), (MovementState::Crouching, c.crouch_speed));
        assert_eq!(select_state(false, true, true, 0.0, &c), (MovementState::Sprinting, c.sprint_speed));
        assert_eq!(select_state(false, false, true, 0.0, &c), (MovementState::Walking, c.walk_speed));
        // airborne keeps whatever speed it had
        assert_eq!(select_state(false, true, false, 10.0, &c), (MovementState::Air, 10.0));
    }

    #[test]
    fn slope_walkability() {
        let tilt = |deg: f32| Quat::from_rotation_z(deg.to_radians()) * Vec3::Y;
        assert!(!is_walkable_slope(Vec3::Y, 40.0));
        assert!(is_walkable_slope(tilt(20.0), 40.0));
        assert!(!is_walkable_slope(tilt(45.0), 40.0));
    }

    #[test]
    fn slope_direction_lies_in_plane() {
        let normal = (Quat::from_rotation_z(30f32.to_radians()) * Vec3::Y).normalize();
        let up = slope_move_direction(Vec3::X, normal);
        assert!(up.dot(normal).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        // a normal leaning -X means the ground rises towards +X
        assert!(up.y > 0.0);
        assert!(slope_move_direction(Vec3::NEG_X, normal).y < 0.0);
    }

    #[test]
    fn air_accel_caps_added_speed() {
        let c = cfg();
        let wish = 7.0 * c.air_multiplier;

        // from rest: reaches exactly the wish speed, not beyond
        let v = air_accelerate(Vec3::ZERO, Vec3::X, 7.0, &c, 1.0 / 64.0);
        assert!((v.x - wish).abs() < 1e-5);

        // already faster along the wish dir: unchanged
        let fast = Vec3::new(20.0, 0.0, 0.0);
        assert_eq!(air_accelerate(fast, Vec3::X, 7.0, &c, 1.0 / 64.0), fast);

        // perpendicular strafe adds speed sideways only
        let v = air_accelerate(fast, Vec3::Z, 7.0, &c, 1.0 / 64.0);
        assert_eq!(v.x, 20.0);
        assert!(v.z > 0.0 && v.z <= wish + 1e-5);
    }

    #[test]
    fn air_accel_small_dt_is_partial() {
        let mut c = cfg();
        c.air_accelerate = 1.0;
        let v = air_accelerate(Vec3::ZERO, Vec3::X, 10.0, &c, 0.01);
        let wish = 10.0 * c.air_multiplier;
        assert!((v.x - wish * 0.01).abs() < 1e-6);
    }

    #[test]
    fn clamp_never_exceeds_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let v = Vec3::new(
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
            );
            let max = rng.random_range(0.5..15.0);

            let on_slope = clamp_speed(v, max, true);
            assert!(on_slope.length() <= max + 1e-4);

            let flat = clamp_speed(v, max, false);
            assert!(Vec2::new(flat.x, flat.z).length() <= max + 1e-4);
            assert_eq!(flat.y, v.y, "vertical speed is untouched off-slope");
        }
    }

    #[test]
    fn plan_on_ground_pushes_along_input() {
        let c = cfg();
        let plan = plan_move(
            &MoveContext {
                move_dir: Vec3::new(0.0, 0.0, -2.0),
                velocity: Vec3::ZERO,
                move_speed: 7.0,
                grounded: true,
                slope_normal: None,
                exiting_slope: false,
                dt: 1.0 / 64.0,
            },
            &c,
        );
        assert_eq!(plan.force, Vec3::new(0.0, 0.0, -70.0));
        assert!(plan.use_gravity);
        assert_eq!(plan.drag, c.ground_drag);
    }

    #[test]
    fn plan_on_slope_disables_gravity_and_adds_downforce() {
        let c = cfg();
        let normal = (Quat::from_rotation_z(20f32.to_radians()) * Vec3::Y).normalize();
        let plan = plan_move(
            &MoveContext {
                move_dir: Vec3::NEG_X,
                velocity: Vec3::new(-1.0, 0.5, 0.0),
                move_speed: 7.0,
                grounded: true,
                slope_normal: Some(normal),
                exiting_slope: false,
                dt: 1.0 / 64.0,
            },
            &c,
        );
        assert!(!plan.use_gravity);
        let along = slope_move_direction(Vec3::NEG_X, normal) * 7.0 * SLOPE_FORCE_SCALE;
        assert!((plan.force - (along + Vec3::NEG_Y * SLOPE_DOWNFORCE)).length() < 1e-4);
    }

    #[test]
    fn plan_in_air_strafes_without_drag() {
        let c = cfg();
        let plan = plan_move(
            &MoveContext {
                move_dir: Vec3::X,
                velocity: Vec3::ZERO,
                move_speed: 7.0,
                grounded: false,
                slope_normal: None,
                exiting_slope: false,
                dt: 1.0 / 64.0,
            },
            &c,
        );
        assert_eq!(plan.drag, 0.0);
        assert!(plan.velocity.x > 0.0);
        assert!((plan.force.x - 7.0 * GROUND_FORCE_SCALE * c.air_multiplier).abs() < 1e-4);
    }
}
