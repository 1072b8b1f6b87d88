// src/physics/mod.rs

mod body;
mod ground;
mod plugin;
mod query;

pub use body::{ground_collision_system, integrate_bodies, record_previous_system, ForceMode, Gravity, GroundCollider, PreviousPosition, RigidBody};
pub use ground::{slope_angle_deg, FlatGround, Ground, HeightSampler, Ramp, RampAxis, RampGround, SlopeSampler};
pub use plugin::{PhysicsPlugin, PhysicsSet};
pub use query::{sync_collision_scene, CollisionScene, CollisionWorld, Layer, LayerMask, OverlapHit, RayHit, SphereCollider};
