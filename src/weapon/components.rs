use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::WeaponConfig;
use super::state::WeaponState;

/// A gun entity (child of the camera). Stats come from the config.
#[derive(Component, Clone, Debug)]
pub struct Weapon {
    pub config: WeaponConfig,
    pub state: WeaponState,
}

impl Weapon {
    pub fn new(config: WeaponConfig) -> Self {
        let state = WeaponState::new(&config);
        Self { config, state }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// The weapon currently in hand.
#[derive(Component)]
pub struct ActiveWeapon;

/// Ordered loadout carried by the player.
#[derive(Component, Clone, Debug, Default)]
pub struct WeaponInventory {
    pub weapons: Vec<Entity>,
    pub current: usize,
}

impl WeaponInventory {
    pub fn new(weapons: Vec<Entity>) -> Self {
        Self { weapons, current: 0 }
    }

    pub fn current(&self) -> Option<Entity> {
        self.weapons.get(self.current).copied()
    }

    /// Step through the loadout with wrap-around. Returns `(from, to)` when
    /// the selection actually changed.
    pub fn cycle(&mut self, step: i32) -> Option<(Entity, Entity)> {
        let len = self.weapons.len();
        if len < 2 || step == 0 {
            return None;
        }
        let from = self.current;
        let to = (from as i64 + step as i64).rem_euclid(len as i64) as usize;
        if to == from {
            return None;
        }
        self.current = to;
        Some((self.weapons[from], self.weapons[to]))
    }
}

/// Shared RNG for shot spread; reseeded from the config.
#[derive(Resource)]
pub struct SpreadRng(pub ChaCha8Rng);

impl SpreadRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for SpreadRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}

/// One projectile to spawn from `weapon` this frame.
#[derive(Event, Clone, Copy, Debug)]
pub struct FireShot {
    pub weapon: Entity,
}
