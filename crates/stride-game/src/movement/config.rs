//! Movement tuning

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Speeds and slide tuning for the movement state machine
///
/// Values are in world units (centimetres) and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Speed cap while walking
    pub walk_speed: f32,
    /// Speed cap while running; also the base of the slide boost
    pub sprint_speed: f32,
    /// Speed cap while crouching; a slide slower than this ends
    pub crouch_speed: f32,
    /// Minimum speed at the crouch press for a slide to start
    pub slide_entry_speed: f32,
    /// Slide entry velocity is `forward * sprint_speed * slide_boost`
    pub slide_boost: f32,
    /// Braking restored when a slide ends
    pub braking_deceleration: f32,
    /// Braking while sliding
    pub slide_braking_deceleration: f32,
    /// Scale of the force pushing a sliding character down slopes
    pub floor_influence_strength: f32,
    /// End slides from the tick once they slow to crouch speed
    pub slide_decay: bool,
    /// Push sliding characters down slopes from the tick
    pub floor_influence: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 600.0,
            sprint_speed: 1000.0,
            crouch_speed: 300.0,
            slide_entry_speed: 750.0,
            slide_boost: 1.5,
            braking_deceleration: 2000.0,
            slide_braking_deceleration: 400.0,
            floor_influence_strength: 7_000_000.0,
            slide_decay: true,
            floor_influence: false,
        }
    }
}

impl MovementConfig {
    /// Parse a config from TOML. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the state machine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("crouch_speed", self.crouch_speed),
            ("braking_deceleration", self.braking_deceleration),
            ("slide_braking_deceleration", self.slide_braking_deceleration),
            ("floor_influence_strength", self.floor_influence_strength),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    requirement: "finite and non-negative",
                    value,
                });
            }
        }

        let positive = [
            ("slide_entry_speed", self.slide_entry_speed),
            ("slide_boost", self.slide_boost),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    requirement: "finite and positive",
                    value,
                });
            }
        }

        Ok(())
    }

    /// Speed a slide starts at
    pub fn slide_speed(&self) -> f32 {
        self.sprint_speed * self.slide_boost
    }
}
