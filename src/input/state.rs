//! Held and edge-triggered key/mouse state

use rustc_hash::FxHashSet;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::core::{EngineEvent, KeyState};

/// Input state for the current frame
///
/// Level-sensitive queries (`is_key_down`) hold across frames; edge queries
/// (`is_key_just_pressed`) are valid until the next `begin_frame`.
#[derive(Debug, Default)]
pub struct Input {
    held_keys: FxHashSet<KeyCode>,
    just_pressed_keys: FxHashSet<KeyCode>,
    just_released_keys: FxHashSet<KeyCode>,
    held_buttons: FxHashSet<MouseButton>,
    just_pressed_buttons: FxHashSet<MouseButton>,
}

impl Input {
    /// Create an input state with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame edges
    pub fn begin_frame(&mut self) {
        self.just_pressed_keys.clear();
        self.just_released_keys.clear();
        self.just_pressed_buttons.clear();
    }

    /// Feed a keyboard transition
    pub fn process_key(&mut self, key: KeyCode, state: KeyState) {
        match state {
            KeyState::Pressed | KeyState::Repeat => {
                if self.held_keys.insert(key) {
                    self.just_pressed_keys.insert(key);
                }
            }
            KeyState::Released => {
                if self.held_keys.remove(&key) {
                    self.just_released_keys.insert(key);
                }
            }
        }
    }

    /// Feed a mouse button transition
    pub fn process_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.held_buttons.insert(button) {
                self.just_pressed_buttons.insert(button);
            }
        } else {
            self.held_buttons.remove(&button);
        }
    }

    /// Feed an engine event; non-input events are ignored
    pub fn process_event(&mut self, event: &EngineEvent) {
        match *event {
            EngineEvent::Keyboard { key, state } => self.process_key(key, state),
            EngineEvent::MouseButton { button, pressed } => {
                self.process_mouse_button(button, pressed)
            }
            _ => {}
        }
    }

    /// Check if a key is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Check if a key went down this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a key went up this frame
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.just_released_keys.contains(&key)
    }

    /// Check if a mouse button is held
    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Check if a mouse button went down this frame
    pub fn is_mouse_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge_lasts_one_frame() {
        let mut input = Input::new();
        input.process_key(KeyCode::KeyM, KeyState::Pressed);
        assert!(input.is_key_down(KeyCode::KeyM));
        assert!(input.is_key_just_pressed(KeyCode::KeyM));

        input.begin_frame();
        input.process_key(KeyCode::KeyM, KeyState::Repeat);
        assert!(input.is_key_down(KeyCode::KeyM));
        assert!(!input.is_key_just_pressed(KeyCode::KeyM));

        input.process_key(KeyCode::KeyM, KeyState::Released);
        assert!(!input.is_key_down(KeyCode::KeyM));
        assert!(input.is_key_just_released(KeyCode::KeyM));
    }

    #[test]
    fn test_mouse_buttons_from_events() {
        let mut input = Input::new();
        input.process_event(&EngineEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert!(input.is_mouse_button_down(MouseButton::Left));
        assert!(input.is_mouse_button_just_pressed(MouseButton::Left));

        input.begin_frame();
        input.process_event(&EngineEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        });
        assert!(!input.is_mouse_button_down(MouseButton::Left));
        assert!(!input.is_mouse_button_just_pressed(MouseButton::Left));
    }

    #[test]
    fn test_resize_is_ignored() {
        let mut input = Input::new();
        input.process_event(&EngineEvent::Resized {
            width: 10,
            height: 10,
        });
        assert!(!input.is_key_down(KeyCode::KeyW));
    }
}
