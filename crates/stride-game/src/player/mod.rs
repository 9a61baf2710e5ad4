//! Player controller module
//!
//! Wires input, the movement state machine and the character body into one
//! fixed-step update.

mod controller;

pub use controller::{movement_events, PlayerController};
