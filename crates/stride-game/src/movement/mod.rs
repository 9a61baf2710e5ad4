//! Movement state machine
//!
//! Decides whether the character walks, runs, crouches or slides, and keeps
//! the body's speed cap, braking and pose in step with that decision.

mod bridge;
mod config;
mod controller;
mod env;
mod error;
mod state;

pub use bridge::WorldProbe;
pub use config::MovementConfig;
pub use controller::{resolve_candidate, MovementInput, MovementStateController};
pub use env::{ActorBody, MovementSink, PoseSink, SpatialQuery};
pub use error::{ConfigError, QueryError};
pub use state::MovementState;
