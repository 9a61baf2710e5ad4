//! Stride Core - Shared types for the movement workspace
//!
//! This crate provides the foundational types used by the other crates:
//! - Mathematical primitives (re-exported from glam)
//! - Transform for actor position and facing
//! - Fixed-step frame clock driving the simulation loop

pub mod time;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use time::{FrameClock, FrameClockConfig};
pub use types::Transform;
