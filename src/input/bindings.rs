//! Key to action bindings
//!
//! Physical keys map to logical sandbox actions so the controller never
//! matches on key codes directly and bindings can be changed at runtime.
//!
//! # Example
//!
//! ```ignore
//! let mut mapper = InputMapper::with_defaults();
//! mapper.bind(KeyCode::KeyC, SandboxAction::SpawnCube);
//!
//! if mapper.get_action(KeyCode::KeyO) == Some(SandboxAction::SpawnCube) {
//!     sandbox.spawn_cube();
//! }
//! ```

use rustc_hash::FxHashMap;
use winit::keyboard::KeyCode;

use super::state::Input;

// ============================================================================
// Sandbox Actions
// ============================================================================

/// Logical actions of the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SandboxAction {
    // -------------------------------------------------------------------------
    // Objects (press edge)
    // -------------------------------------------------------------------------
    /// Drop a cube above the crosshair hit
    SpawnCube,
    /// Drop a cylinder above the crosshair hit
    SpawnCylinder,
    /// Drop two linked cubes above the crosshair hit
    SpawnDumbbell,
    /// Place a static copy of the imported model at the crosshair hit
    SpawnImport,
    /// Delete the object under the crosshair
    Delete,
    /// Kick every scene-bound body upwards
    Launch,

    // -------------------------------------------------------------------------
    // Held
    // -------------------------------------------------------------------------
    /// Push every body upwards while held
    AntiGravity,

    // -------------------------------------------------------------------------
    // Camera
    // -------------------------------------------------------------------------
    /// Move forward
    MoveForward,
    /// Move backward
    MoveBackward,
    /// Strafe left
    MoveLeft,
    /// Strafe right
    MoveRight,
    /// Fly up
    MoveUp,
    /// Fly down
    MoveDown,
    /// Pitch up
    LookUp,
    /// Pitch down
    LookDown,
    /// Yaw left
    LookLeft,
    /// Yaw right
    LookRight,
}

impl SandboxAction {
    /// Actions that fire once per key press
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(
            self,
            Self::SpawnCube
                | Self::SpawnCylinder
                | Self::SpawnDumbbell
                | Self::SpawnImport
                | Self::Delete
                | Self::Launch
        )
    }
}

// ============================================================================
// Input Mapper
// ============================================================================

/// Maps physical keys to sandbox actions.
#[derive(Debug, Clone)]
pub struct InputMapper {
    /// Key to action bindings
    key_bindings: FxHashMap<KeyCode, SandboxAction>,
    /// Reverse lookup: action to keys
    action_keys: FxHashMap<SandboxAction, Vec<KeyCode>>,
}

impl InputMapper {
    /// Create an empty input mapper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key_bindings: FxHashMap::default(),
            action_keys: FxHashMap::default(),
        }
    }

    /// Create an input mapper with the sandbox's default layout.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mapper = Self::new();

        // Objects
        mapper.bind(KeyCode::KeyO, SandboxAction::SpawnCube);
        mapper.bind(KeyCode::KeyP, SandboxAction::SpawnCylinder);
        mapper.bind(KeyCode::KeyK, SandboxAction::SpawnDumbbell);
        mapper.bind(KeyCode::KeyL, SandboxAction::SpawnImport);
        mapper.bind(KeyCode::KeyR, SandboxAction::Delete);
        mapper.bind(KeyCode::Space, SandboxAction::Launch);
        mapper.bind(KeyCode::KeyM, SandboxAction::AntiGravity);

        // Movement (WASD + Q/E)
        mapper.bind(KeyCode::KeyW, SandboxAction::MoveForward);
        mapper.bind(KeyCode::KeyS, SandboxAction::MoveBackward);
        mapper.bind(KeyCode::KeyA, SandboxAction::MoveLeft);
        mapper.bind(KeyCode::KeyD, SandboxAction::MoveRight);
        mapper.bind(KeyCode::KeyE, SandboxAction::MoveUp);
        mapper.bind(KeyCode::KeyQ, SandboxAction::MoveDown);

        // Look
        mapper.bind(KeyCode::ArrowUp, SandboxAction::LookUp);
        mapper.bind(KeyCode::ArrowDown, SandboxAction::LookDown);
        mapper.bind(KeyCode::ArrowLeft, SandboxAction::LookLeft);
        mapper.bind(KeyCode::ArrowRight, SandboxAction::LookRight);

        mapper
    }

    /// Bind a key to an action.
    ///
    /// If the key was previously bound, the old binding is replaced.
    pub fn bind(&mut self, key: KeyCode, action: SandboxAction) {
        if let Some(old_action) = self.key_bindings.get(&key)
            && let Some(keys) = self.action_keys.get_mut(old_action)
        {
            keys.retain(|k| *k != key);
        }

        self.key_bindings.insert(key, action);
        self.action_keys.entry(action).or_default().push(key);
    }

    /// Unbind a key.
    pub fn unbind(&mut self, key: KeyCode) {
        if let Some(action) = self.key_bindings.remove(&key)
            && let Some(keys) = self.action_keys.get_mut(&action)
        {
            keys.retain(|k| *k != key);
        }
    }

    /// Get the action for a key.
    #[must_use]
    pub fn get_action(&self, key: KeyCode) -> Option<SandboxAction> {
        self.key_bindings.get(&key).copied()
    }

    /// Get all keys bound to an action.
    #[must_use]
    pub fn get_keys(&self, action: SandboxAction) -> &[KeyCode] {
        self.action_keys
            .get(&action)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Check if any key bound to `action` is held.
    #[must_use]
    pub fn is_action_held(&self, action: SandboxAction, input: &Input) -> bool {
        self.get_keys(action).iter().any(|&key| input.is_key_down(key))
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KeyState;

    #[test]
    fn test_default_layout() {
        let mapper = InputMapper::with_defaults();
        assert_eq!(mapper.get_action(KeyCode::KeyO), Some(SandboxAction::SpawnCube));
        assert_eq!(mapper.get_action(KeyCode::KeyP), Some(SandboxAction::SpawnCylinder));
        assert_eq!(mapper.get_action(KeyCode::KeyK), Some(SandboxAction::SpawnDumbbell));
        assert_eq!(mapper.get_action(KeyCode::KeyL), Some(SandboxAction::SpawnImport));
        assert_eq!(mapper.get_action(KeyCode::KeyR), Some(SandboxAction::Delete));
        assert_eq!(mapper.get_action(KeyCode::KeyM), Some(SandboxAction::AntiGravity));
        assert_eq!(mapper.get_action(KeyCode::Space), Some(SandboxAction::Launch));
        assert_eq!(mapper.get_action(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_rebind_moves_key() {
        let mut mapper = InputMapper::with_defaults();
        mapper.bind(KeyCode::KeyO, SandboxAction::Delete);

        assert_eq!(mapper.get_action(KeyCode::KeyO), Some(SandboxAction::Delete));
        assert!(mapper.get_keys(SandboxAction::SpawnCube).is_empty());
        assert_eq!(mapper.get_keys(SandboxAction::Delete).len(), 2);

        mapper.unbind(KeyCode::KeyO);
        assert_eq!(mapper.get_action(KeyCode::KeyO), None);
        assert_eq!(mapper.get_keys(SandboxAction::Delete), &[KeyCode::KeyR]);
    }

    #[test]
    fn test_action_held_follows_any_bound_key() {
        let mut mapper = InputMapper::with_defaults();
        mapper.bind(KeyCode::KeyG, SandboxAction::AntiGravity);
        let mut input = Input::new();
        assert!(!mapper.is_action_held(SandboxAction::AntiGravity, &input));

        input.process_key(KeyCode::KeyG, KeyState::Pressed);
        assert!(mapper.is_action_held(SandboxAction::AntiGravity, &input));
        input.process_key(KeyCode::KeyG, KeyState::Released);
        assert!(!mapper.is_action_held(SandboxAction::AntiGravity, &input));
    }

    #[test]
    fn test_triggered_actions() {
        assert!(SandboxAction::SpawnCube.is_triggered());
        assert!(!SandboxAction::AntiGravity.is_triggered());
        assert!(!SandboxAction::MoveForward.is_triggered());
    }
}
