//! Movement modes

use std::fmt;

use serde::{Deserialize, Serialize};

/// The locomotion profile currently driving the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementState {
    /// Upright at walk speed
    #[default]
    Walking,
    /// Upright at sprint speed
    Running,
    /// Crouched capsule at crouch speed
    Crouching,
    /// Crouched capsule coasting on the entry boost, no steering
    Sliding,
}

impl MovementState {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            MovementState::Walking => "Walking",
            MovementState::Running => "Running",
            MovementState::Crouching => "Crouching",
            MovementState::Sliding => "Sliding",
        }
    }

    /// Whether this mode uses the crouched capsule
    pub fn is_low_profile(&self) -> bool {
        matches!(self, MovementState::Crouching | MovementState::Sliding)
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_walking() {
        assert_eq!(MovementState::default(), MovementState::Walking);
    }

    #[test]
    fn test_low_profile() {
        assert!(!MovementState::Walking.is_low_profile());
        assert!(!MovementState::Running.is_low_profile());
        assert!(MovementState::Crouching.is_low_profile());
        assert!(MovementState::Sliding.is_low_profile());
        assert_eq!(MovementState::Sliding.to_string(), "Sliding");
    }
}
