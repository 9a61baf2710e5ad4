//! Player controller: input -> movement state -> character body

use glam::Vec3;
use stride_physics::{CharacterBody, CharacterBodyConfig, PhysicsWorld};
use tracing::debug;

use crate::input::{InputAction, InputState};
use crate::movement::{
    MovementConfig, MovementInput, MovementState, MovementStateController, WorldProbe,
};

/// Sprint and crouch edges of this frame in the order the controller sees
/// them: presses before releases, sprint before crouch.
///
/// Pressing crouch in the same frame sprint goes down still counts as a
/// sprinting crouch.
pub fn movement_events(input: &InputState) -> Vec<MovementInput> {
    let mut events = Vec::with_capacity(4);
    if input.is_just_pressed(InputAction::Sprint) {
        events.push(MovementInput::SprintPressed);
    }
    if input.is_just_pressed(InputAction::Crouch) {
        events.push(MovementInput::CrouchPressed);
    }
    if input.is_just_released(InputAction::Sprint) {
        events.push(MovementInput::SprintReleased);
    }
    if input.is_just_released(InputAction::Crouch) {
        events.push(MovementInput::CrouchReleased);
    }
    events
}

/// Player controller handling input, movement state, and physics
pub struct PlayerController {
    /// Walk / run / crouch / slide state machine
    pub movement: MovementStateController,
    /// Physics character body
    pub character: CharacterBody,
}

impl PlayerController {
    /// Create a new player controller
    pub fn new() -> Self {
        Self::with_config(MovementConfig::default(), CharacterBodyConfig::default())
    }

    /// Create a player controller with custom config
    pub fn with_config(movement: MovementConfig, body: CharacterBodyConfig) -> Self {
        let mut character = CharacterBody::with_config(body);
        let movement =
            MovementStateController::new(movement, character.config.standing_half_height);
        movement.apply_profile(&mut character);
        Self {
            movement,
            character,
        }
    }

    /// Spawn the player in the world with its feet at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.character.spawn(physics, position);
        self.character.velocity = Vec3::ZERO;
    }

    /// Current movement state
    pub fn state(&self) -> MovementState {
        self.movement.state()
    }

    /// Get the player's feet position
    pub fn position(&self) -> Vec3 {
        self.character.position()
    }

    pub fn speed(&self) -> f32 {
        self.character.speed()
    }

    /// Check if the player is grounded
    pub fn is_grounded(&self) -> bool {
        self.character.is_grounded()
    }

    /// Jumping is allowed upright and on the ground
    pub fn can_jump(&self) -> bool {
        !self.movement.state().is_low_profile() && self.is_grounded()
    }

    /// Update the player (fixed timestep)
    pub fn fixed_update(
        &mut self,
        physics: &mut PhysicsWorld,
        input: &InputState,
        camera_yaw: f32,
        dt: f32,
    ) {
        for event in movement_events(input) {
            let probe = WorldProbe::new(physics, &self.character);
            self.movement.handle_input(event, &probe, &mut self.character);
        }

        if input.is_just_pressed(InputAction::Jump) && self.can_jump() && self.character.jump() {
            debug!("Jump at {:?}", self.character.position());
        }

        {
            let probe = WorldProbe::new(physics, &self.character);
            self.movement.tick(&probe, &mut self.character);
        }

        let wish = self.movement.movement_input(input.move_axis(), camera_yaw);
        self.character.update(physics, wish, dt);
    }

    /// Teleport the player to a position
    pub fn teleport(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.character.set_position(physics, position);
        self.character.velocity = Vec3::ZERO;
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}
