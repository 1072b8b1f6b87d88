// src/weapon/state.rs
//! Ammo / fire-mode state machine. No ECS in here: systems drive it with
//! trigger samples and frame deltas, and spawn whatever shots come due.

use bevy::prelude::*;
use bevy::time::Stopwatch;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::WeaponConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FireMode {
    /// One shot per trigger press.
    #[default]
    Single,
    /// N shots spread evenly over the shooting delay.
    Burst,
    /// Fires while the trigger is held.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GunState {
    Full,
    Empty,
    Reloading,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Trigger not pulled (for this mode).
    Idle,
    /// Still waiting for the shot reset.
    Cooling,
    Fired { shots: u32 },
    DryFire,
    Reloading,
    NotEnoughAmmo,
}

#[derive(Clone, Debug)]
pub struct WeaponState {
    mode: FireMode,
    shooting_delay: f32,
    reload_time: f32,
    max_ammo: u32,
    bullets_per_burst: u32,

    ammo: u32,
    gun_state: GunState,
    ready_to_shoot: bool,
    shot_reset: Option<Timer>,
    reload: Option<Timer>,

    /// Offsets (from the trigger pull) of shots not yet released.
    pending: VecDeque<Duration>,
    burst_clock: Stopwatch,
}

impl WeaponState {
    pub fn new(cfg: &WeaponConfig) -> Self {
        Self {
            mode: cfg.mode,
            shooting_delay: cfg.shooting_delay,
            reload_time: cfg.reload_time,
            max_ammo: cfg.max_ammo,
            bullets_per_burst: cfg.bullets_per_burst.max(1),
            ammo: cfg.max_ammo,
            gun_state: GunState::Full,
            ready_to_shoot: true,
            shot_reset: None,
            reload: None,
            pending: VecDeque::new(),
            burst_clock: Stopwatch::new(),
        }
    }

    pub fn mode(&self) -> FireMode { self.mode }
    pub fn ammo(&self) -> u32 { self.ammo }
    pub fn max_ammo(&self) -> u32 { self.max_ammo }
    pub fn gun_state(&self) -> GunState { self.gun_state }
    pub fn is_ready(&self) -> bool { self.ready_to_shoot }
    pub fn pending_shots(&self) -> usize { self.pending.len() }

    /// `held` = trigger down this frame, `pressed` = went down this frame.
    pub fn pull_trigger(&mut self, held: bool, pressed: bool) -> TriggerOutcome {
        let shooting = match self.mode {
            FireMode::Auto => held,
            FireMode::Single | FireMode::Burst => pressed,
        };
        if !shooting {
            return TriggerOutcome::Idle;
        }
        if !self.ready_to_shoot {
            return TriggerOutcome::Cooling;
        }
        if self.gun_state == GunState::Reloading {
            return TriggerOutcome::Reloading;
        }
        if self.ammo == 0 {
            self.gun_state = GunState::Empty;
            return TriggerOutcome::DryFire;
        }

        let shots = match self.mode {
            FireMode::Burst => self.bullets_per_burst,
            FireMode::Single | FireMode::Auto => 1,
        };
        if shots > self.ammo {
            return TriggerOutcome::NotEnoughAmmo;
        }

        self.ammo -= shots;
        self.gun_state = if self.ammo == 0 { GunState::Empty } else { GunState::Full };

        let spacing = self.shooting_delay / shots as f32;
        if self.pending.is_empty() {
            self.burst_clock.reset();
        }
        let base = self.burst_clock.elapsed();
        self.pending
            .extend((0..shots).map(|i| base + Duration::from_secs_f32(spacing * i as f32)));

        self.ready_to_shoot = false;
        self.shot_reset = Some(Timer::from_seconds(self.shooting_delay, TimerMode::Once));

        TriggerOutcome::Fired { shots }
    }

    pub fn can_reload(&self) -> bool {
        self.gun_state != GunState::Reloading && self.ammo < self.max_ammo
    }

    /// Returns false when a reload is pointless or already running.
    pub fn start_reload(&mut self) -> bool {
        if !self.can_reload() {
            return false;
        }
        self.gun_state = GunState::Reloading;
        self.reload = Some(Timer::from_seconds(self.reload_time, TimerMode::Once));
        true
    }

    /// Advance cooldowns. Returns true when a reload finished this tick.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.pending.is_empty() {
            self.burst_clock.tick(delta);
        }

        if let Some(timer) = self.shot_reset.as_mut() {
            timer.tick(delta);
            if timer.finished() {
                self.ready_to_shoot = true;
                self.shot_reset = None;
            }
        }

        let mut reloaded = false;
        if let Some(timer) = self.reload.as_mut() {
            timer.tick(delta);
            if timer.finished() {
                self.ammo = self.max_ammo;
                self.gun_state = GunState::Full;
                self.ready_to_shoot = true;
                self.reload = None;
                reloaded = true;
            }
        }
        reloaded
    }

    /// Pop every scheduled shot whose offset has been reached.
    pub fn take_due_shots(&mut self) -> u32 {
        let elapsed = self.burst_clock.elapsed();
        let mut due = 0;
        while self.pending.front().is_some_and(|&at| at <= elapsed) {
            self.pending.pop_front();
            due += 1;
        }
        due
    }

    /// Put away: abort a reload. The shot reset and any paid burst shots keep
    /// running while holstered.
    pub fn holster(&mut self) {
        if self.gun_state == GunState::Reloading {
            self.gun_state = if self.ammo == 0 { GunState::Empty } else { GunState::Full };
        }
        self.reload = None;
    }
}
