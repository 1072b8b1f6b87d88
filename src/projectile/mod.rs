// src/projectile/mod.rs

mod components;
mod plugin;
mod systems;

pub use components::{Enemy, Projectile, ProjectileAssets, ProjectileKind};
pub use plugin::ProjectilePlugin;
pub use systems::{spawn_projectile, PROJECTILE_MASK};
