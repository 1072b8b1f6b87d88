// src/config.rs
//! Data-driven game tuning + loader.
//!
//! Everything the designers tweak lives in one `*.fps.ron` asset: movement
//! tuning, the weapon loadout, key bindings and the spread RNG seed.

use bevy::asset::{io::Reader, AssetLoader, LoadContext, LoadState};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::projectile::ProjectileKind;
use crate::weapon::FireMode;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.fps.ron";

// ---------- Public plugin to register asset+loader ----------

pub struct ConfigPlugin {
    pub path: String,
}

impl Default for ConfigPlugin {
    fn default() -> Self {
        Self { path: DEFAULT_CONFIG_PATH.to_string() }
    }
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<GameConfig>()
            .register_asset_loader(GameConfigLoader)
            .insert_resource(ConfigPath(self.path.clone()))
            .add_systems(PreStartup, request_config)
            .add_systems(PreUpdate, (apply_loaded_config, fallback_on_load_failure));
    }
}

// ---------- Movement (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub crouch_speed: f32,
    pub ground_drag: f32,

    pub jump_force: f32,
    /// Seconds before another jump is allowed.
    pub jump_cooldown: f32,
    /// Scales movement force and wish speed while airborne.
    pub air_multiplier: f32,
    /// Air-strafe acceleration (like `sv_airaccelerate`).
    pub air_accelerate: f32,
    /// Upper bound on the air-strafe wish speed.
    pub air_speed_cap: f32,

    pub crouch_y_scale: f32,

    /// Full standing height; ground probes reach half of it plus a margin.
    pub player_height: f32,
    /// Degrees. Slopes shallower than this are walked along their plane.
    pub max_slope_angle: f32,
    /// Degrees. Ground steeper than this blocks horizontal movement.
    pub max_climb_angle: f32,
    pub mass: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 7.0,
            sprint_speed: 10.0,
            crouch_speed: 3.5,
            ground_drag: 5.0,
            jump_force: 12.0,
            jump_cooldown: 0.25,
            air_multiplier: 0.4,
            air_accelerate: 300.0,
            air_speed_cap: 30.0,
            crouch_y_scale: 0.5,
            player_height: 2.0,
            max_slope_angle: 40.0,
            max_climb_angle: 60.0,
            mass: 1.0,
        }
    }
}

// ---------- Weapons (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub name: String,
    pub mode: FireMode,
    /// Seconds between trigger pulls; a burst spreads its shots over it.
    pub shooting_delay: f32,
    pub reload_time: f32,
    pub max_ammo: u32,
    pub bullets_per_burst: u32,
    pub bullet_velocity: f32,
    /// Seconds before an unhit projectile despawns.
    pub bullet_lifetime: f32,
    pub spread: f32,
    /// Muzzle position in camera space.
    pub muzzle_offset: Vec3,
    pub projectile: ProjectileKind,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            name: "Pistol".to_string(),
            mode: FireMode::Single,
            shooting_delay: 0.5,
            reload_time: 2.0,
            max_ammo: 12,
            bullets_per_burst: 3,
            bullet_velocity: 30.0,
            bullet_lifetime: 3.0,
            spread: 0.0,
            muzzle_offset: Vec3::new(0.3, -0.25, -0.6),
            projectile: ProjectileKind::Bullet,
        }
    }
}

// ---------- Bindings (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub jump: KeyCode,
    pub sprint: KeyCode,
    pub crouch: KeyCode,
    pub reload: KeyCode,
    pub next_weapon: KeyCode,
    pub prev_weapon: KeyCode,
    pub fire: MouseButton,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            jump: KeyCode::Space,
            sprint: KeyCode::ShiftLeft,
            crouch: KeyCode::ControlLeft,
            reload: KeyCode::KeyR,
            next_weapon: KeyCode::Digit3,
            prev_weapon: KeyCode::Digit2,
            fire: MouseButton::Left,
        }
    }
}

// ---------- Root asset ----------

#[derive(Asset, TypePath, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub movement: MovementConfig,
    pub weapons: Vec<WeaponConfig>,
    pub bindings: KeyBindings,
    /// Radians of view rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Seed for the shot-spread RNG.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            weapons: vec![WeaponConfig::default()],
            bindings: KeyBindings::default(),
            mouse_sensitivity: 0.002,
            seed: 1337,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        positive("movement.walk_speed", m.walk_speed)?;
        positive("movement.sprint_speed", m.sprint_speed)?;
        positive("movement.crouch_speed", m.crouch_speed)?;
        positive("movement.player_height", m.player_height)?;
        positive("movement.mass", m.mass)?;
        positive("movement.crouch_y_scale", m.crouch_y_scale)?;
        angle("movement.max_slope_angle", m.max_slope_angle)?;
        angle("movement.max_climb_angle", m.max_climb_angle)?;
        non_negative("movement.ground_drag", m.ground_drag)?;
        non_negative("movement.jump_force", m.jump_force)?;
        non_negative("movement.jump_cooldown", m.jump_cooldown)?;
        non_negative("movement.air_multiplier", m.air_multiplier)?;
        non_negative("movement.air_accelerate", m.air_accelerate)?;
        non_negative("movement.air_speed_cap", m.air_speed_cap)?;
        non_negative("mouse_sensitivity", self.mouse_sensitivity)?;

        if self.weapons.is_empty() {
            return Err(ConfigError::Invalid {
                field: "weapons".to_string(),
                reason: "at least one weapon is required".to_string(),
            });
        }
        for (i, w) in self.weapons.iter().enumerate() {
            if w.max_ammo == 0 {
                return Err(invalid(format!("weapons[{i}].max_ammo"), "must be at least 1"));
            }
            if w.bullets_per_burst == 0 {
                return Err(invalid(format!("weapons[{i}].bullets_per_burst"), "must be at least 1"));
            }
            if w.mode == FireMode::Burst && w.bullets_per_burst > w.max_ammo {
                return Err(invalid(
                    format!("weapons[{i}].bullets_per_burst"),
                    "burst larger than the magazine can never fire",
                ));
            }
            positive(&format!("weapons[{i}].shooting_delay"), w.shooting_delay)?;
            positive(&format!("weapons[{i}].bullet_lifetime"), w.bullet_lifetime)?;
            non_negative(&format!("weapons[{i}].reload_time"), w.reload_time)?;
            non_negative(&format!("weapons[{i}].spread"), w.spread)?;
            non_negative(&format!("weapons[{i}].bullet_velocity"), w.bullet_velocity)?;
            if let ProjectileKind::Rocket { radius, launch_force, player_launch_force } = w.projectile {
                non_negative(&format!("weapons[{i}].projectile.radius"), radius)?;
                non_negative(&format!("weapons[{i}].projectile.launch_force"), launch_force)?;
                non_negative(&format!("weapons[{i}].projectile.player_launch_force"), player_launch_force)?;
            }
        }
        Ok(())
    }
}

fn invalid(field: String, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

fn positive(field: &str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field.to_string(), &format!("must be positive, got {v}")))
    }
}

/// Finite and `>= 0`; NaN fails.
fn non_negative(field: &str, v: f32) -> Result<(), ConfigError> {
    if v >= 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field.to_string(), &format!("must be finite and not negative, got {v}")))
    }
}

fn angle(field: &str, deg: f32) -> Result<(), ConfigError> {
    if deg > 0.0 && deg < 90.0 {
        Ok(())
    } else {
        Err(invalid(field.to_string(), &format!("must be within (0, 90) degrees, got {deg}")))
    }
}

/// Parse + validate a RON config document.
pub fn parse_config(bytes: &[u8]) -> Result<GameConfig, ConfigError> {
    let cfg: GameConfig =
        ron::de::from_bytes(bytes).map_err(|e| ConfigError::Ron(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

// ---------- Asset loader for `.fps.ron` ----------

#[derive(Default)]
pub struct GameConfigLoader;

impl AssetLoader for GameConfigLoader {
    type Asset = GameConfig;
    type Settings = ();
    type Error = ConfigError;

    fn extensions(&self) -> &[&str] {
        &["fps.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        parse_config(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O while reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

// ---------- Runtime resources & systems ----------

#[derive(Resource, Clone)]
pub struct ConfigPath(pub String);

/// Handle to the loaded GameConfig asset.
#[derive(Resource, Default)]
pub struct ConfigHandle(pub Handle<GameConfig>);

/// The config the simulation is currently running with.
#[derive(Resource, Clone, Debug, Deref)]
pub struct ActiveConfig(pub GameConfig);

fn request_config(mut commands: Commands, asset_server: Res<AssetServer>, path: Res<ConfigPath>) {
    info!("Loading game config from '{}'", path.0);
    commands.insert_resource(ConfigHandle(asset_server.load(path.0.clone())));
}

/// Copies the asset into `ActiveConfig` whenever it (re)loads.
fn apply_loaded_config(
    mut commands: Commands,
    mut events: EventReader<AssetEvent<GameConfig>>,
    handle: Res<ConfigHandle>,
    configs: Res<Assets<GameConfig>>,
) {
    for ev in events.read() {
        let id = match ev {
            AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id } => *id,
            _ => continue,
        };
        if id != handle.0.id() {
            continue;
        }
        if let Some(cfg) = configs.get(id) {
            info!("Applied game config ({} weapons)", cfg.weapons.len());
            commands.insert_resource(ActiveConfig(cfg.clone()));
        }
    }
}

fn fallback_on_load_failure(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    handle: Res<ConfigHandle>,
    active: Option<Res<ActiveConfig>>,
) {
    if active.is_some() {
        return;
    }
    if let LoadState::Failed(err) = asset_server.load_state(handle.0.id()) {
        warn!("Game config failed to load ({err}); using defaults");
        commands.insert_resource(ActiveConfig(GameConfig::default()));
    }
}

/// Run condition: the simulation has a config to work with.
pub fn config_ready(active: Option<Res<ActiveConfig>>) -> bool {
    active.is_some()
}
