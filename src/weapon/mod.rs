// src/weapon/mod.rs

mod components;
mod plugin;
mod state;
mod systems;

pub use components::{ActiveWeapon, Weapon, WeaponInventory};
pub use plugin::{WeaponPlugin, WeaponSet};
pub use state::{FireMode, GunState};
