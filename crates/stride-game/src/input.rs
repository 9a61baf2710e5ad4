//! Input system with action-based mapping
//!
//! Turns raw keyboard and mouse events into per-frame action state. The
//! movement controller only sees press/release edges of Sprint and Crouch
//! and the 2-axis move vector derived from the held movement keys.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move forward (W by default)
    MoveForward,
    /// Move backward (S by default)
    MoveBackward,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Jump (Space by default)
    Jump,
    /// Sprint (Shift by default)
    Sprint,
    /// Crouch, or slide when sprinting fast enough (Left Ctrl / C by default)
    Crouch,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
    /// Look delta accumulated this frame
    pub look_delta: Vec2,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Repeats of a held action are not new presses.
    pub fn press(&mut self, action: InputAction) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Record a release of a held action
    pub fn release(&mut self, action: InputAction) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Move vector from the held movement keys (x = right, y = forward),
    /// at most unit length
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_held(InputAction::MoveForward) {
            axis.y += 1.0;
        }
        if self.is_held(InputAction::MoveBackward) {
            axis.y -= 1.0;
        }
        if self.is_held(InputAction::MoveRight) {
            axis.x += 1.0;
        }
        if self.is_held(InputAction::MoveLeft) {
            axis.x -= 1.0;
        }
        axis.normalize_or_zero()
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.look_delta = Vec2::ZERO;
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.clear_frame();
    }
}

/// Maps keys to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Key to action mappings
    bindings: HashMap<KeyCode, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        // Default WASD bindings
        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);

        // Arrow keys as alternative
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::ShiftLeft, InputAction::Sprint);
        bindings.bind(KeyCode::ShiftRight, InputAction::Sprint);
        bindings.bind(KeyCode::ControlLeft, InputAction::Crouch);
        bindings.bind(KeyCode::KeyC, InputAction::Crouch);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action, replacing any previous binding of that key
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.bindings.insert(key, action);
    }

    /// Unbind a key
    pub fn unbind(&mut self, key: KeyCode) {
        self.bindings.remove(&key);
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings.get(&key).copied()
    }

    /// All keys bound to an action
    pub fn keys_for(&self, action: InputAction) -> Vec<KeyCode> {
        self.bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
            .collect()
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Look sensitivity multiplier
    pub look_sensitivity: f32,
    /// Invert Y axis
    pub invert_y: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            bindings: InputBindings::default(),
            look_sensitivity: 1.0,
            invert_y: false,
        }
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        let PhysicalKey::Code(key_code) = physical_key else {
            return;
        };
        let Some(action) = self.bindings.get_key_action(key_code) else {
            return;
        };
        match element_state {
            ElementState::Pressed => self.state.press(action),
            ElementState::Released => self.state.release(action),
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        let y_mult = if self.invert_y { -1.0 } else { 1.0 };
        self.state.look_delta += Vec2::new(
            delta.0 as f32 * self.look_sensitivity,
            delta.1 as f32 * self.look_sensitivity * y_mult,
        );
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.get_key_action(KeyCode::KeyW),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.get_key_action(KeyCode::ControlLeft),
            Some(InputAction::Crouch)
        );
        let mut sprint_keys = bindings.keys_for(InputAction::Sprint);
        sprint_keys.sort_by_key(|key| format!("{:?}", key));
        assert_eq!(sprint_keys, [KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    }

    #[test]
    fn test_input_state() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::Jump);

        assert!(state.is_held(InputAction::MoveForward));
        assert!(state.is_just_pressed(InputAction::Jump));
        assert!(!state.is_held(InputAction::Sprint));

        state.clear_frame();
        assert!(state.is_held(InputAction::MoveForward));
        assert!(!state.is_just_pressed(InputAction::Jump));

        // holding is not pressing again
        state.press(InputAction::MoveForward);
        assert!(!state.is_just_pressed(InputAction::MoveForward));
    }

    #[test]
    fn test_release_only_counts_held_actions() {
        let mut state = InputState::new();
        state.release(InputAction::Crouch);
        assert!(!state.is_just_released(InputAction::Crouch));

        state.press(InputAction::Crouch);
        state.release(InputAction::Crouch);
        assert!(state.is_just_pressed(InputAction::Crouch));
        assert!(state.is_just_released(InputAction::Crouch));
        assert!(!state.is_held(InputAction::Crouch));
    }

    #[test]
    fn test_move_axis() {
        let mut state = InputState::new();
        assert_eq!(state.move_axis(), Vec2::ZERO);

        state.press(InputAction::MoveForward);
        assert_eq!(state.move_axis(), Vec2::Y);

        state.press(InputAction::MoveRight);
        let axis = state.move_axis();
        assert!((axis.length() - 1.0).abs() < 1e-6);
        assert!(axis.x > 0.0 && axis.y > 0.0);

        state.press(InputAction::MoveBackward);
        assert_eq!(state.move_axis(), Vec2::X);
    }

    #[test]
    fn test_handler_maps_keys() {
        let mut handler = InputHandler::new();
        handler.handle_keyboard(PhysicalKey::Code(KeyCode::ShiftLeft), ElementState::Pressed);
        assert!(handler.state.is_just_pressed(InputAction::Sprint));

        handler.end_frame();
        handler.handle_keyboard(PhysicalKey::Code(KeyCode::ShiftLeft), ElementState::Released);
        assert!(handler.state.is_just_released(InputAction::Sprint));

        // unbound key does nothing
        handler.handle_keyboard(PhysicalKey::Code(KeyCode::KeyZ), ElementState::Pressed);
        assert!(handler.state.held.is_empty());
    }

    #[test]
    fn test_look_delta() {
        let mut handler = InputHandler::new();
        handler.invert_y = true;
        handler.handle_mouse_motion((2.0, 3.0));
        assert_eq!(handler.state.look_delta, Vec2::new(2.0, -3.0));

        handler.end_frame();
        assert_eq!(handler.state.look_delta, Vec2::ZERO);
    }
}
