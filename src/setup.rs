use bevy::prelude::*;

use crate::config::ActiveConfig;
use crate::level::LevelExit;
use crate::movement::{MovementTuning, Mover, Orientation, Player, SpawnPoint, StandingScale};
use crate::physics::{
    Ground, GroundCollider, Layer, PreviousPosition, Ramp, RampAxis, RampGround, RigidBody,
    SphereCollider,
};
use crate::projectile::{Enemy, ProjectileAssets};
use crate::weapon::{ActiveWeapon, Weapon, WeaponInventory};

#[derive(Component)]
pub struct MainCamera;

const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 10.0);
const ENEMY_RADIUS: f32 = 0.5;
const ENEMY_SPAWNS: [Vec3; 4] = [
    Vec3::new(0.0, 0.5, -20.0),
    Vec3::new(6.0, 0.5, -25.0),
    Vec3::new(-6.0, 0.5, -25.0),
    Vec3::new(12.0, 0.5, -2.0),
];
const FLOOR_SIZE: f32 = 120.0;
const RAMP_THICKNESS: f32 = 0.2;

/// Test course: flat floor, a walkable ramp and one too steep to climb.
pub fn level_ground() -> RampGround {
    RampGround {
        floor_y: 0.0,
        ramps: vec![
            Ramp {
                min_xz: Vec2::new(5.0, -15.0),
                max_xz: Vec2::new(20.0, -5.0),
                axis: RampAxis::PosX,
                angle_deg: 20.0,
            },
            Ramp {
                min_xz: Vec2::new(-20.0, -15.0),
                max_xz: Vec2::new(-10.0, -5.0),
                axis: RampAxis::PosZ,
                angle_deg: 65.0,
            },
        ],
    }
}

/// Thin slab lying on the ramp surface.
fn ramp_slab(ramp: &Ramp, floor_y: f32) -> (Cuboid, Transform) {
    let size = ramp.max_xz - ramp.min_xz;
    let theta = ramp.angle_deg.to_radians();
    let center = ramp.center_xz();
    let translation = Vec3::new(center.x, floor_y + ramp.top_height() * 0.5, center.y);

    let (cuboid, rotation) = match ramp.axis {
        RampAxis::PosX => (
            Cuboid::new(size.x / theta.cos(), RAMP_THICKNESS, size.y),
            Quat::from_rotation_z(theta),
        ),
        RampAxis::PosZ => (
            Cuboid::new(size.x, RAMP_THICKNESS, size.y / theta.cos()),
            Quat::from_rotation_x(-theta),
        ),
    };
    (cuboid, Transform::from_translation(translation).with_rotation(rotation))
}

pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Camera (follows the player once it exists)
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(PLAYER_SPAWN).looking_to(Vec3::NEG_Z, Vec3::Y),
        MainCamera,
    ));

    // 3) Ground: collision surface + visuals
    let ground = level_ground();
    let floor_material = materials.add(Color::srgb(0.35, 0.4, 0.35));
    let ramp_material = materials.add(Color::srgb(0.55, 0.5, 0.45));
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FLOOR_SIZE, FLOOR_SIZE))),
        MeshMaterial3d(floor_material),
        Transform::from_xyz(0.0, ground.floor_y, 0.0),
    ));
    for ramp in &ground.ramps {
        let (cuboid, transform) = ramp_slab(ramp, ground.floor_y);
        commands.spawn((Mesh3d(meshes.add(cuboid)), MeshMaterial3d(ramp_material.clone()), transform));
    }
    commands.insert_resource(Ground::new(ground));

    // 4) Enemies
    let enemy_mesh = meshes.add(Sphere::new(ENEMY_RADIUS));
    let enemy_material = materials.add(Color::srgb(0.8, 0.15, 0.15));
    for pos in ENEMY_SPAWNS {
        commands.spawn((
            Enemy,
            Mesh3d(enemy_mesh.clone()),
            MeshMaterial3d(enemy_material.clone()),
            Transform::from_translation(pos),
            RigidBody { linear_damping: 1.0, ..default() },
            GroundCollider { half_height: ENEMY_RADIUS, max_climb_deg: 60.0 },
            PreviousPosition(pos),
            SphereCollider { radius: ENEMY_RADIUS, layer: Layer::Enemy },
        ));
    }

    // 5) Level exit pad
    commands.spawn((
        LevelExit { target_level: "level_02".to_string(), transition_time: 1.5, radius: 1.5 },
        Mesh3d(meshes.add(Cylinder::new(1.5, 0.1))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 0.9))),
        Transform::from_xyz(0.0, 0.05, 30.0),
    ));

    // 6) Projectile visuals
    commands.insert_resource(ProjectileAssets {
        bullet_mesh: meshes.add(Sphere::new(0.05)),
        bullet_material: materials.add(Color::srgb(1.0, 0.85, 0.3)),
        rocket_mesh: meshes.add(Capsule3d::new(0.1, 0.4)),
        rocket_material: materials.add(Color::srgb(0.3, 0.3, 0.3)),
    });

    info!("Level ready");
}

/// Spawns the player and its weapons once the config is available.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<ActiveConfig>,
    camera: Query<Entity, With<MainCamera>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(camera) = camera.single() else { return };
    let movement = config.movement.clone();

    let gun_mesh = meshes.add(Cuboid::new(0.1, 0.15, 0.5));
    let gun_material = materials.add(Color::srgb(0.15, 0.15, 0.18));
    let weapons: Vec<Entity> = config
        .weapons
        .iter()
        .enumerate()
        .map(|(i, cfg)| {
            let mut gun = commands.spawn((
                Weapon::new(cfg.clone()),
                Mesh3d(gun_mesh.clone()),
                MeshMaterial3d(gun_material.clone()),
                Transform::from_translation(cfg.muzzle_offset + Vec3::new(0.0, 0.0, 0.25)),
                if i == 0 { Visibility::Inherited } else { Visibility::Hidden },
                ChildOf(camera),
            ));
            if i == 0 {
                gun.insert(ActiveWeapon);
            }
            gun.id()
        })
        .collect();

    commands.spawn((
        Player,
        Transform::from_translation(PLAYER_SPAWN),
        Orientation::default(),
        Mover::new(movement.walk_speed),
        RigidBody::with_mass(movement.mass),
        GroundCollider {
            half_height: movement.player_height * 0.5,
            max_climb_deg: movement.max_climb_angle,
        },
        PreviousPosition(PLAYER_SPAWN),
        SphereCollider { radius: 0.5, layer: Layer::Player },
        StandingScale(1.0),
        SpawnPoint(PLAYER_SPAWN),
        MovementTuning(movement),
        WeaponInventory::new(weapons),
    ));

    info!("Player spawned with {} weapons", config.weapons.len());
}
