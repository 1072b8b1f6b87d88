// src/weapon/systems.rs

use bevy::prelude::*;
use rand::Rng;

use crate::actions::{ActionState, PlayerAction};
use crate::config::ActiveConfig;
use crate::movement::Player;
use crate::physics::{CollisionScene, CollisionWorld};
use crate::projectile::{spawn_projectile, ProjectileAssets, PROJECTILE_MASK};
use crate::setup::MainCamera;
use super::components::{ActiveWeapon, FireShot, SpreadRng, Weapon, WeaponInventory};
use super::state::TriggerOutcome;

/// Aim point when the camera ray hits nothing.
pub const AIM_FALLBACK_DISTANCE: f32 = 100.0;
/// How far the aim ray looks for a target.
const AIM_RAY_LENGTH: f32 = 1000.0;

/// Where the crosshair points: first hit along the camera ray, or a point
/// far along it.
pub fn aim_point(scene: &impl CollisionWorld, camera: &Transform) -> Vec3 {
    let forward = *camera.forward();
    scene
        .raycast(camera.translation, forward, AIM_RAY_LENGTH, PROJECTILE_MASK)
        .map(|hit| hit.point)
        .unwrap_or(camera.translation + forward * AIM_FALLBACK_DISTANCE)
}

/// `target - muzzle` perturbed by `(x, y, 0)`, normalized.
pub fn shot_direction(muzzle: Vec3, target: Vec3, spread: Vec2) -> Vec3 {
    ((target - muzzle) + spread.extend(0.0)).normalize_or(Vec3::NEG_Z)
}

fn sample_spread(rng: &mut SpreadRng, spread: f32) -> Vec2 {
    if spread <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.0.random_range(-spread..=spread),
        rng.0.random_range(-spread..=spread),
    )
}

pub fn advance_weapon_timers(time: Res<Time>, mut weapons: Query<&mut Weapon>) {
    for mut weapon in &mut weapons {
        if weapon.state.tick(time.delta()) {
            info!("{} reloaded ({} rounds)", weapon.name(), weapon.state.ammo());
        }
    }
}

/// Trigger + reload for the weapon in hand.
pub fn weapon_input_system(
    actions: Res<ActionState>,
    mut weapons: Query<&mut Weapon, With<ActiveWeapon>>,
) {
    let Ok(mut weapon) = weapons.single_mut() else { return };

    if actions.just_pressed(PlayerAction::Reload) && weapon.state.start_reload() {
        info!("Reloading {}", weapon.name());
    }

    let outcome = weapon.state.pull_trigger(
        actions.pressed(PlayerAction::Fire),
        actions.just_pressed(PlayerAction::Fire),
    );
    match outcome {
        TriggerOutcome::Fired { shots } => {
            debug!("{} fired {shots} ({} left)", weapon.name(), weapon.state.ammo());
        }
        TriggerOutcome::DryFire => debug!("{} is empty", weapon.name()),
        TriggerOutcome::NotEnoughAmmo => debug!("{}: not enough ammo for a burst", weapon.name()),
        TriggerOutcome::Idle | TriggerOutcome::Cooling | TriggerOutcome::Reloading => {}
    }
}

/// Turn due (possibly delayed burst) shots into `FireShot` events.
pub fn release_shots(mut shots: EventWriter<FireShot>, mut weapons: Query<(Entity, &mut Weapon)>) {
    for (entity, mut weapon) in &mut weapons {
        for _ in 0..weapon.state.take_due_shots() {
            shots.write(FireShot { weapon: entity });
        }
    }
}

pub fn fire_projectiles(
    mut commands: Commands,
    mut shots: EventReader<FireShot>,
    weapons: Query<&Weapon>,
    camera: Query<&Transform, With<MainCamera>>,
    scene: Res<CollisionScene>,
    mut rng: ResMut<SpreadRng>,
    assets: Option<Res<ProjectileAssets>>,
) {
    let Ok(camera) = camera.single() else {
        shots.clear();
        return;
    };
    for shot in shots.read() {
        let Ok(weapon) = weapons.get(shot.weapon) else { continue };
        let cfg = &weapon.config;

        let muzzle = camera.transform_point(cfg.muzzle_offset);
        let target = aim_point(&*scene, camera);
        let dir = shot_direction(muzzle, target, sample_spread(&mut rng, cfg.spread));

        spawn_projectile(&mut commands, assets.as_deref(), muzzle, dir, cfg);
    }
}

/// Next / previous weapon with wrap-around.
pub fn switch_weapon_system(
    mut commands: Commands,
    actions: Res<ActionState>,
    mut players: Query<&mut WeaponInventory, With<Player>>,
    mut weapons: Query<(&mut Weapon, &mut Visibility)>,
) {
    let step = match (
        actions.just_pressed(PlayerAction::NextWeapon),
        actions.just_pressed(PlayerAction::PrevWeapon),
    ) {
        (true, false) => 1,
        (false, true) => -1,
        _ => return,
    };
    let Ok(mut inventory) = players.single_mut() else { return };
    let Some((from, to)) = inventory.cycle(step) else { return };

    if let Ok((mut weapon, mut visibility)) = weapons.get_mut(from) {
        weapon.state.holster();
        *visibility = Visibility::Hidden;
    }
    commands.entity(from).remove::<ActiveWeapon>();

    if let Ok((weapon, mut visibility)) = weapons.get_mut(to) {
        *visibility = Visibility::Inherited;
        info!("Switched to {}", weapon.name());
    }
    commands.entity(to).insert(ActiveWeapon);
}

pub fn reseed_spread_rng(mut commands: Commands, config: Res<ActiveConfig>) {
    debug!("Spread RNG seeded with {}", config.seed);
    commands.insert_resource(SpreadRng::from_seed(config.seed));
}
