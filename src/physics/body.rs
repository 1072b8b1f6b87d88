// src/physics/body.rs

use bevy::prelude::*;

use super::ground::{slope_angle_deg, Ground, HeightSampler, SlopeSampler};

/// How `RigidBody::add_force` interprets its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force, integrated over the next physics step.
    Force,
    /// Instant change in momentum.
    Impulse,
    /// Instant change in velocity, ignoring mass.
    VelocityChange,
}

#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    pub velocity: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub use_gravity: bool,
    pub(crate) accumulated_force: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 1.0,
            linear_damping: 0.0,
            use_gravity: true,
            accumulated_force: Vec3::ZERO,
        }
    }
}

impl RigidBody {
    pub fn with_mass(mass: f32) -> Self {
        Self { mass, ..default() }
    }

    pub fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        match mode {
            ForceMode::Force => self.accumulated_force += force,
            ForceMode::Impulse => self.velocity += force / self.mass,
            ForceMode::VelocityChange => self.velocity += force,
        }
    }

    pub fn pending_force(&self) -> Vec3 {
        self.accumulated_force
    }

    /// Advance one step and return the displacement.
    pub fn step(&mut self, gravity: Vec3, dt: f32) -> Vec3 {
        let mut accel = self.accumulated_force / self.mass;
        if self.use_gravity {
            accel += gravity;
        }
        self.velocity += accel * dt;
        self.velocity *= 1.0 / (1.0 + self.linear_damping * dt);
        self.accumulated_force = Vec3::ZERO;
        self.velocity * dt
    }
}

#[derive(Resource, Clone, Copy, Debug, Deref)]
pub struct Gravity(pub Vec3);

impl Default for Gravity {
    fn default() -> Self {
        Self(Vec3::new(0.0, -9.81, 0.0))
    }
}

/// Keeps a body on top of the ground.
/// `half_height` = distance from origin to feet at scale 1.
#[derive(Component, Clone, Copy, Debug)]
pub struct GroundCollider {
    pub half_height: f32,
    /// Degrees. Steeper ground than this cannot be climbed.
    pub max_climb_deg: f32,
}

#[derive(Component, Deref, DerefMut, Clone, Copy, Debug, Default)]
pub struct PreviousPosition(pub Vec3);

/// (1) Snapshot each body's current position before it moves.
pub fn record_previous_system(mut query: Query<(&mut PreviousPosition, &Transform)>) {
    for (mut prev, t) in &mut query {
        **prev = t.translation;
    }
}

/// (2) Integrate forces, gravity and drag into motion.
pub fn integrate_bodies(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut query: Query<(&mut RigidBody, &mut Transform)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    for (mut body, mut tf) in &mut query {
        tf.translation += body.step(gravity.0, dt);
    }
}

/// (3) Push bodies out of the ground and stop them walking up walls.
pub fn ground_collision_system(
    ground: Res<Ground>,
    mut query: Query<(&GroundCollider, &PreviousPosition, &mut Transform, &mut RigidBody)>,
) {
    for (collider, prev, mut tf, mut body) in &mut query {
        let half_h = collider.half_height * tf.scale.y;
        let pos = tf.translation;

        // 1) Reject moving onto ground that is too steep and higher than before
        let prev_ground = ground.sample_height(prev.x, prev.z);
        let ground_y = ground.sample_height(pos.x, pos.z);
        let steep = slope_angle_deg(ground.sample_normal(pos.x, pos.z)) > collider.max_climb_deg;
        if steep && ground_y > prev_ground + 1e-3 && pos.y - half_h < ground_y {
            tf.translation.x = prev.x;
            tf.translation.z = prev.z;
            body.velocity.x = 0.0;
            body.velocity.z = 0.0;
        }

        // 2) Clamp to ground and cancel velocity into the surface
        let pos = tf.translation;
        let ground_y = ground.sample_height(pos.x, pos.z);
        if pos.y - half_h < ground_y {
            tf.translation.y = ground_y + half_h;
            let n = ground.sample_normal(pos.x, pos.z);
            let into = body.velocity.dot(n);
            if into < 0.0 {
                body.velocity -= n * into;
            }
        }
    }
}
