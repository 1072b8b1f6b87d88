use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What a weapon launches.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Kills enemies it passes through, stops on anything else.
    #[default]
    Bullet,
    /// Explodes on first contact.
    Rocket {
        radius: f32,
        /// Peak impulse on enemies at the blast centre.
        launch_force: f32,
        /// Upward impulse on a player close to the blast.
        player_launch_force: f32,
    },
}

#[derive(Component, Clone, Copy, Debug)]
pub struct Projectile {
    pub kind: ProjectileKind,
}

/// Despawns the entity when it runs out.
#[derive(Component, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

/// Something bullets can kill.
#[derive(Component)]
pub struct Enemy;

/// A projectile's swept path touched something this step.
#[derive(Event, Clone, Copy, Debug)]
pub struct ProjectileImpact {
    pub projectile: Entity,
    pub kind: ProjectileKind,
    pub point: Vec3,
    /// `None` when the ground was hit.
    pub target: Option<Entity>,
}

/// Optional visuals for spawned projectiles (absent in headless tests).
#[derive(Resource, Clone)]
pub struct ProjectileAssets {
    pub bullet_mesh: Handle<Mesh>,
    pub bullet_material: Handle<StandardMaterial>,
    pub rocket_mesh: Handle<Mesh>,
    pub rocket_material: Handle<StandardMaterial>,
}
