use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
    Sprint,
    Crouch,
    Fire,
    Reload,
    NextWeapon,
    PrevWeapon,
}

/// Per-frame input snapshot. Everything downstream of `input.rs` reads this
/// instead of the keyboard/mouse resources.
#[derive(Default, Resource)]
pub struct ActionState {
    pressed: HashSet<PlayerAction>,
    just_pressed: HashSet<PlayerAction>,
    just_released: HashSet<PlayerAction>,
    /// Mouse motion accumulated this frame (pixels).
    pub look_delta: Vec2,
}

impl ActionState {
    pub fn set(&mut self, action: PlayerAction, is_pressed: bool) {
        let was = self.pressed.contains(&action);
        self.just_pressed.remove(&action);
        self.just_released.remove(&action);

        if is_pressed && !was {
            self.just_pressed.insert(action);
        } else if !is_pressed && was {
            self.just_released.insert(action);
        }

        if is_pressed {
            self.pressed.insert(action);
        } else {
            self.pressed.remove(&action);
        }
    }

    pub fn pressed(&self, action: PlayerAction) -> bool {
        self.pressed.contains(&action)
    }

    pub fn just_pressed(&self, action: PlayerAction) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn just_released(&self, action: PlayerAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Raw strafe axis: -1 (left), 0, +1 (right).
    pub fn horizontal(&self) -> f32 {
        self.axis(PlayerAction::MoveLeft, PlayerAction::MoveRight)
    }

    /// Raw forward axis: -1 (back), 0, +1 (forward).
    pub fn vertical(&self) -> f32 {
        self.axis(PlayerAction::MoveBackward, PlayerAction::MoveForward)
    }

    fn axis(&self, negative: PlayerAction, positive: PlayerAction) -> f32 {
        let mut v = 0.0;
        if self.pressed(negative) { v -= 1.0; }
        if self.pressed(positive) { v += 1.0; }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_last_one_frame() {
        let mut a = ActionState::default();
        a.set(PlayerAction::Fire, true);
        assert!(a.pressed(PlayerAction::Fire));
        assert!(a.just_pressed(PlayerAction::Fire));

        a.set(PlayerAction::Fire, true);
        assert!(a.pressed(PlayerAction::Fire));
        assert!(!a.just_pressed(PlayerAction::Fire));

        a.set(PlayerAction::Fire, false);
        assert!(!a.pressed(PlayerAction::Fire));
        assert!(a.just_released(PlayerAction::Fire));

        a.set(PlayerAction::Fire, false);
        assert!(!a.just_released(PlayerAction::Fire));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut a = ActionState::default();
        a.set(PlayerAction::MoveLeft, true);
        assert_eq!(a.horizontal(), -1.0);
        a.set(PlayerAction::MoveRight, true);
        assert_eq!(a.horizontal(), 0.0);
        a.set(PlayerAction::MoveForward, true);
        assert_eq!(a.vertical(), 1.0);
    }
}
