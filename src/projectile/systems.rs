// src/projectile/systems.rs

use bevy::prelude::*;
use std::collections::HashSet;

use crate::config::WeaponConfig;
use crate::movement::Player;
use crate::physics::{
    CollisionScene, CollisionWorld, ForceMode, Layer, LayerMask, PreviousPosition, RigidBody,
};
use super::components::{Enemy, Lifetime, Projectile, ProjectileAssets, ProjectileImpact, ProjectileKind};

/// Everything a projectile can run into.
pub const PROJECTILE_MASK: LayerMask = LayerMask::ALL
    .without(Layer::Player)
    .without(Layer::Projectile)
    .without(Layer::Trigger);
/// Bodies a rocket blast can push.
const BLAST_MASK: LayerMask = LayerMask::of(Layer::Player).with(Layer::Enemy);
/// A player closer than this to a blast gets rocket-jumped.
pub const PLAYER_LAUNCH_RANGE: f32 = 2.5;

/// Spawn a projectile at `origin` flying along `direction`.
pub fn spawn_projectile(
    commands: &mut Commands,
    assets: Option<&ProjectileAssets>,
    origin: Vec3,
    direction: Vec3,
    weapon: &WeaponConfig,
) -> Entity {
    let dir = direction.normalize_or(Vec3::NEG_Z);
    let mut body = RigidBody { use_gravity: false, ..default() };
    body.add_force(dir * weapon.bullet_velocity, ForceMode::Impulse);

    let mut entity = commands.spawn((
        Projectile { kind: weapon.projectile },
        Transform::from_translation(origin).looking_to(dir, Vec3::Y),
        body,
        PreviousPosition(origin),
        Lifetime(Timer::from_seconds(weapon.bullet_lifetime, TimerMode::Once)),
    ));

    if let Some(assets) = assets {
        let (mesh, material) = match weapon.projectile {
            ProjectileKind::Bullet => (&assets.bullet_mesh, &assets.bullet_material),
            ProjectileKind::Rocket { .. } => (&assets.rocket_mesh, &assets.rocket_material),
        };
        entity.insert((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));
    }
    entity.id()
}

/// Impulse on a body at `target` from a blast at `center`: points away from
/// the blast and falls off linearly to zero at `radius`.
pub fn explosion_impulse(target: Vec3, center: Vec3, radius: f32, force: f32) -> Vec3 {
    let offset = target - center;
    let distance = offset.length();
    if radius <= 0.0 || distance >= radius {
        return Vec3::ZERO;
    }
    offset.normalize_or(Vec3::Y) * force * (1.0 - distance / radius)
}

/// Test the path each projectile travelled this step. Bullets report every
/// enemy along the path up to and including the first thing that stops them.
pub fn sweep_projectiles(
    scene: Res<CollisionScene>,
    mut impacts: EventWriter<ProjectileImpact>,
    enemies: Query<(), With<Enemy>>,
    query: Query<(Entity, &Projectile, &PreviousPosition, &Transform)>,
) {
    for (entity, projectile, prev, tf) in &query {
        let travel = tf.translation - **prev;
        for hit in scene.raycast_all(**prev, travel, travel.length(), PROJECTILE_MASK) {
            impacts.write(ProjectileImpact {
                projectile: entity,
                kind: projectile.kind,
                point: hit.point,
                target: hit.entity,
            });
            let passes_through = matches!(projectile.kind, ProjectileKind::Bullet)
                && hit.entity.is_some_and(|e| enemies.contains(e));
            if !passes_through {
                break;
            }
        }
    }
}

pub fn resolve_impacts(
    mut commands: Commands,
    mut impacts: EventReader<ProjectileImpact>,
    scene: Res<CollisionScene>,
    enemies: Query<(), With<Enemy>>,
    mut bodies: Query<(&Transform, &mut RigidBody, Has<Player>), Without<Projectile>>,
) {
    let mut gone = HashSet::new();

    for impact in impacts.read() {
        match impact.kind {
            ProjectileKind::Bullet => match impact.target {
                Some(target) if enemies.contains(target) => {
                    if gone.insert(target) {
                        info!("Enemy {target} destroyed");
                    }
                }
                _ => {
                    gone.insert(impact.projectile);
                }
            },
            ProjectileKind::Rocket { radius, launch_force, player_launch_force } => {
                for hit in scene.overlap_sphere(impact.point, radius, BLAST_MASK) {
                    let Ok((tf, mut body, is_player)) = bodies.get_mut(hit.entity) else { continue };
                    if is_player {
                        if tf.translation.distance(impact.point) < PLAYER_LAUNCH_RANGE {
                            body.velocity.y = 0.0;
                            body.add_force(tf.up() * player_launch_force, ForceMode::Impulse);
                            debug!("Rocket jump");
                        }
                    } else {
                        let push = explosion_impulse(tf.translation, impact.point, radius, launch_force);
                        body.add_force(push, ForceMode::Impulse);
                    }
                }
                debug!("Rocket exploded at {:?}", impact.point);
                gone.insert(impact.projectile);
            }
        }
    }

    for entity in gone {
        commands.entity(entity).despawn();
    }
}

pub fn expire_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in &mut query {
        lifetime.tick(time.delta());
        if lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{integrate_bodies, record_previous_system, sync_collision_scene, Gravity, Ground, SphereCollider};
    use std::time::Duration;

    const DT: f32 = 1.0 / 64.0;

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(Ground::default());
        world.insert_resource(CollisionScene::default());
        world.insert_resource(Gravity::default());
        world.insert_resource(Time::<()>::default());
        world.init_resource::<Events<ProjectileImpact>>();
        world
    }

    fn flight_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                record_previous_system,
                sync_collision_scene,
                integrate_bodies,
                sweep_projectiles,
                resolve_impacts,
            )
                .chain(),
        );
        schedule
    }

    fn step(world: &mut World, schedule: &mut Schedule, n: usize) {
        for _ in 0..n {
            world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(DT));
            schedule.run(world);
        }
    }

    fn launch(world: &mut World, origin: Vec3, dir: Vec3, weapon: &WeaponConfig) -> Entity {
        let mut queue = bevy::ecs::world::CommandQueue::default();
        let id = {
            let mut commands = Commands::new(&mut queue, world);
            spawn_projectile(&mut commands, None, origin, dir, weapon)
        };
        queue.apply(world);
        id
    }

    #[test]
    fn falloff_is_linear_and_zero_outside() {
        let c = Vec3::ZERO;
        assert_eq!(explosion_impulse(Vec3::new(0.0, 0.0, 6.0), c, 5.0, 10.0), Vec3::ZERO);
        let half = explosion_impulse(Vec3::new(2.5, 0.0, 0.0), c, 5.0, 10.0);
        assert!((half - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        // dead centre pushes straight up
        assert_eq!(explosion_impulse(c, c, 5.0, 10.0), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn bullet_passes_through_enemy_then_stops_on_ground() {
        let mut world = world();
        let enemy = world
            .spawn((
                Enemy,
                Transform::from_xyz(0.0, 1.0, -5.0),
                SphereCollider { radius: 0.5, layer: Layer::Enemy },
            ))
            .id();

        // 64 m/s is one metre per step; aimed slightly down so it lands at z ~ -20
        let weapon = WeaponConfig { bullet_velocity: 64.0, ..default() };
        let dir = Vec3::new(0.0, -0.05, -1.0);
        let bullet = launch(&mut world, Vec3::new(0.0, 1.0, 0.0), dir, &weapon);
        let mut schedule = flight_schedule();

        step(&mut world, &mut schedule, 8);
        assert!(world.get::<Enemy>(enemy).is_none(), "enemy should be destroyed");
        assert!(world.get::<Projectile>(bullet).is_some(), "bullet keeps flying");

        step(&mut world, &mut schedule, 20);
        assert!(world.get::<Projectile>(bullet).is_none(), "bullet stops on the ground");
    }

    #[test]
    fn steep_bullet_kills_enemy_and_stops_in_same_step() {
        let mut world = world();
        let enemy = world
            .spawn((
                Enemy,
                Transform::from_xyz(0.0, 0.5, -5.0),
                SphereCollider { radius: 0.5, layer: Layer::Enemy },
            ))
            .id();

        // two metres per step at 45° down: clips the enemy, then the floor
        let weapon = WeaponConfig { bullet_velocity: 128.0, ..default() };
        let bullet = launch(&mut world, Vec3::new(0.0, 1.2, -4.0), Vec3::new(0.0, -1.0, -1.0), &weapon);
        let mut schedule = flight_schedule();

        step(&mut world, &mut schedule, 1);
        assert!(world.get::<Enemy>(enemy).is_none(), "enemy should be destroyed");
        assert!(world.get::<Projectile>(bullet).is_none(), "bullet must not tunnel underground");
    }

    #[test]
    fn bullet_kills_every_enemy_along_one_step() {
        let mut world = world();
        let spawn_enemy = |world: &mut World, z: f32| {
            world
                .spawn((
                    Enemy,
                    Transform::from_xyz(0.0, 1.0, z),
                    SphereCollider { radius: 0.5, layer: Layer::Enemy },
                ))
                .id()
        };
        let first = spawn_enemy(&mut world, -1.0);
        let second = spawn_enemy(&mut world, -2.5);

        // one step covers four metres
        let weapon = WeaponConfig { bullet_velocity: 256.0, ..default() };
        let bullet = launch(&mut world, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, &weapon);
        let mut schedule = flight_schedule();

        step(&mut world, &mut schedule, 1);
        assert!(world.get::<Enemy>(first).is_none());
        assert!(world.get::<Enemy>(second).is_none());
        assert!(world.get::<Projectile>(bullet).is_some());
    }

    #[test]
    fn rocket_stops_at_first_enemy() {
        let mut world = world();
        let spawn_enemy = |world: &mut World, z: f32| {
            world
                .spawn((
                    Enemy,
                    Transform::from_xyz(0.0, 1.0, z),
                    RigidBody::default(),
                    SphereCollider { radius: 0.5, layer: Layer::Enemy },
                ))
                .id()
        };
        spawn_enemy(&mut world, -1.0);
        spawn_enemy(&mut world, -2.5);

        let kind = ProjectileKind::Rocket { radius: 0.1, launch_force: 1.0, player_launch_force: 1.0 };
        let weapon = WeaponConfig { bullet_velocity: 256.0, projectile: kind, ..default() };
        launch(&mut world, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, &weapon);

        let mut schedule = Schedule::default();
        schedule.add_systems((record_previous_system, sync_collision_scene, integrate_bodies, sweep_projectiles).chain());
        world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(DT));
        schedule.run(&mut world);

        assert_eq!(world.resource::<Events<ProjectileImpact>>().len(), 1);
    }

    #[test]
    fn bullet_expires_after_lifetime() {
        let mut world = world();
        let weapon = WeaponConfig { bullet_lifetime: 0.1, ..default() };
        let bullet = launch(&mut world, Vec3::new(0.0, 50.0, 0.0), Vec3::Y, &weapon);

        let mut schedule = Schedule::default();
        schedule.add_systems(expire_projectiles);

        world.resource_mut::<Time>().advance_by(Duration::from_millis(60));
        schedule.run(&mut world);
        assert!(world.get::<Projectile>(bullet).is_some());

        world.resource_mut::<Time>().advance_by(Duration::from_millis(60));
        schedule.run(&mut world);
        assert!(world.get::<Projectile>(bullet).is_none());
    }

    #[test]
    fn rocket_launches_nearby_player_and_pushes_enemy() {
        let mut world = world();
        let player = world
            .spawn((
                Player,
                Transform::from_xyz(0.0, 1.0, 0.0),
                RigidBody { velocity: Vec3::new(0.0, -3.0, 0.0), ..default() },
                SphereCollider { radius: 0.5, layer: Layer::Player },
            ))
            .id();
        let enemy = world
            .spawn((
                Enemy,
                Transform::from_xyz(3.0, 1.0, -1.0),
                RigidBody::default(),
                SphereCollider { radius: 0.5, layer: Layer::Enemy },
            ))
            .id();

        let kind = ProjectileKind::Rocket { radius: 5.0, launch_force: 10.0, player_launch_force: 8.0 };
        let rocket = world.spawn(Projectile { kind }).id();
        world.send_event(ProjectileImpact {
            projectile: rocket,
            kind,
            point: Vec3::new(0.0, 0.0, -1.0),
            target: None,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems((sync_collision_scene, resolve_impacts).chain());
        schedule.run(&mut world);

        let body = world.get::<RigidBody>(player).unwrap();
        assert!((body.velocity.y - 8.0).abs() < 1e-4, "downward speed replaced by launch");

        let pushed = world.get::<RigidBody>(enemy).unwrap();
        assert!(pushed.velocity.x > 0.0);
        assert!(world.get::<Projectile>(rocket).is_none());
    }

    #[test]
    fn far_player_is_not_launched() {
        let mut world = world();
        let player = world
            .spawn((
                Player,
                Transform::from_xyz(4.0, 1.0, 0.0),
                RigidBody::default(),
                SphereCollider { radius: 0.5, layer: Layer::Player },
            ))
            .id();
        let kind = ProjectileKind::Rocket { radius: 5.0, launch_force: 10.0, player_launch_force: 8.0 };
        let rocket = world.spawn(Projectile { kind }).id();
        world.send_event(ProjectileImpact { projectile: rocket, kind, point: Vec3::ZERO, target: None });

        let mut schedule = Schedule::default();
        schedule.add_systems((sync_collision_scene, resolve_impacts).chain());
        schedule.run(&mut world);

        assert_eq!(world.get::<RigidBody>(player).unwrap().velocity, Vec3::ZERO);
    }
}
