//! Stride Game - Character movement logic
//!
//! Provides the movement state machine, input handling, and the player
//! controller that ties them to the physics character body.

pub mod input;
pub mod movement;
pub mod player;

pub use input::{InputAction, InputBindings, InputHandler, InputState};
pub use movement::{
    ActorBody, ConfigError, MovementConfig, MovementInput, MovementSink, MovementState,
    MovementStateController, PoseSink, QueryError, SpatialQuery, WorldProbe,
};
pub use player::{movement_events, PlayerController};
