//! Frame clock for the fixed-step simulation loop
//!
//! The movement controller and the character body are stepped at a fixed
//! rate. The clock accumulates variable frame deltas and hands out whole
//! fixed steps.

use serde::{Deserialize, Serialize};

/// Configuration for the frame clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameClockConfig {
    /// Fixed simulation step (in seconds)
    pub fixed_timestep: f32,
    /// Largest frame delta accepted before clamping
    pub max_frame_delta: f32,
}

impl Default for FrameClockConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_frame_delta: 0.25,
        }
    }
}

/// Accumulating fixed-step clock
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Configuration
    pub config: FrameClockConfig,
    /// Simulated time in seconds
    pub elapsed: f64,
    /// Number of fixed steps handed out so far
    pub step_count: u64,
    /// Whether the clock is paused
    pub paused: bool,
    accumulator: f32,
}

impl FrameClock {
    /// Create a new clock with custom config
    pub fn new(config: FrameClockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The fixed step length
    pub fn dt(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Feed a raw frame delta and return how many fixed steps to run
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += raw_delta.clamp(0.0, self.config.max_frame_delta);

        let mut steps = 0;
        while self.accumulator >= self.config.fixed_timestep {
            self.accumulator -= self.config.fixed_timestep;
            self.elapsed += self.config.fixed_timestep as f64;
            self.step_count += 1;
            steps += 1;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.config.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_hands_out_whole_steps() {
        let mut clock = FrameClock::new(FrameClockConfig {
            fixed_timestep: 0.01,
            max_frame_delta: 1.0,
        });
        assert_eq!(clock.advance(0.035), 3);
        assert_eq!(clock.step_count, 3);
        assert!(clock.alpha() > 0.4 && clock.alpha() < 0.6);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut clock = FrameClock::new(FrameClockConfig {
            fixed_timestep: 0.125,
            max_frame_delta: 0.25,
        });
        assert_eq!(clock.advance(10.0), 2);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_paused_clock_does_not_step() {
        let mut clock = FrameClock::default();
        clock.paused = true;
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.elapsed, 0.0);
    }
}
