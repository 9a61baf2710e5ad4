//! Movement state controller
//!
//! Keeps the sprint and crouch key latches, decides which [`MovementState`]
//! applies and pushes the matching locomotion parameters into the body.
//! Every state change goes through [`MovementStateController::set_state`].

use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use super::{ActorBody, MovementConfig, MovementState, QueryError, SpatialQuery};

/// Discrete key events the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementInput {
    SprintPressed,
    SprintReleased,
    CrouchPressed,
    CrouchReleased,
}

/// Pick the state the current flags call for.
///
/// Sprint only wins when standing is possible as well, so a blocked
/// character holding sprint stays crouched.
pub fn resolve_candidate(can_stand: bool, can_sprint: bool) -> MovementState {
    let candidate = if can_stand {
        MovementState::Walking
    } else {
        MovementState::Crouching
    };
    if can_sprint && can_stand {
        MovementState::Running
    } else {
        candidate
    }
}

/// State machine for walk / run / crouch / slide
#[derive(Debug, Clone)]
pub struct MovementStateController {
    config: MovementConfig,
    state: MovementState,
    sprint_key_down: bool,
    crouch_key_down: bool,
    standing_half_height: f32,
}

impl MovementStateController {
    /// Create a controller in the Walking state.
    ///
    /// `standing_half_height` is the capsule half-height of the upright
    /// character and stays fixed for the controller's lifetime.
    pub fn new(config: MovementConfig, standing_half_height: f32) -> Self {
        Self {
            config,
            state: MovementState::Walking,
            sprint_key_down: false,
            crouch_key_down: false,
            standing_half_height,
        }
    }

    /// Tuning fixed at construction
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Current movement state
    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn sprint_key_down(&self) -> bool {
        self.sprint_key_down
    }

    pub fn crouch_key_down(&self) -> bool {
        self.crouch_key_down
    }

    pub fn standing_half_height(&self) -> f32 {
        self.standing_half_height
    }

    /// Speed cap for a state
    pub fn max_speed_for(&self, state: MovementState) -> f32 {
        match state {
            MovementState::Walking => self.config.walk_speed,
            MovementState::Running => self.config.sprint_speed,
            MovementState::Crouching => self.config.crouch_speed,
            MovementState::Sliding => 0.0,
        }
    }

    /// Push the current state's speed cap and baseline braking into a body
    /// without a transition, e.g. right after spawning.
    pub fn apply_profile(&self, body: &mut impl ActorBody) {
        body.set_max_speed(self.max_speed_for(self.state));
        body.set_braking_deceleration(self.config.braking_deceleration);
    }

    /// Dispatch a key event
    pub fn handle_input(
        &mut self,
        input: MovementInput,
        world: &impl SpatialQuery,
        body: &mut impl ActorBody,
    ) {
        match input {
            MovementInput::SprintPressed => self.on_sprint_pressed(world, body),
            MovementInput::SprintReleased => self.on_sprint_released(world, body),
            MovementInput::CrouchPressed => self.on_crouch_pressed(body),
            MovementInput::CrouchReleased => self.on_crouch_released(world, body),
        }
    }

    pub fn on_sprint_pressed(&mut self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        self.sprint_key_down = true;
        if matches!(self.state, MovementState::Walking | MovementState::Crouching) {
            self.resolve(world, body);
        }
    }

    pub fn on_sprint_released(&mut self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        self.sprint_key_down = false;
        if self.state == MovementState::Running {
            self.resolve(world, body);
        }
    }

    /// Crouch press goes straight to Crouching or Sliding without the
    /// resolution policy: a slide depends on the speed at the moment of the
    /// press, which resolution never samples.
    pub fn on_crouch_pressed(&mut self, body: &mut impl ActorBody) {
        self.crouch_key_down = true;
        if !matches!(self.state, MovementState::Walking | MovementState::Running) {
            return;
        }
        if body.is_airborne() {
            return;
        }

        let next = if self.sprint_key_down && body.speed() >= self.config.slide_entry_speed {
            MovementState::Sliding
        } else {
            MovementState::Crouching
        };
        self.set_state(next, body);
    }

    /// A slide keeps going after the key comes up; it ends through slide decay.
    pub fn on_crouch_released(&mut self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        self.crouch_key_down = false;
        if self.state != MovementState::Sliding {
            self.resolve(world, body);
        }
    }

    /// Apply the resolution policy
    pub fn resolve(&mut self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        let can_stand = self.can_stand(world, &*body);
        let can_sprint = can_stand && self.can_sprint(world, &*body);
        self.set_state(resolve_candidate(can_stand, can_sprint), body);
    }

    /// Whether there is room to stand up and the player is not holding crouch.
    ///
    /// A failed probe counts as no room.
    pub fn can_stand(&self, world: &impl SpatialQuery, body: &impl ActorBody) -> bool {
        if self.crouch_key_down {
            return false;
        }

        match self.probe_headroom(world, body) {
            Ok(blocked) => !blocked,
            Err(err) => {
                warn!("Standing probe failed, staying crouched: {}", err);
                false
            }
        }
    }

    /// Whether sprint is held and standing is possible
    pub fn can_sprint(&self, world: &impl SpatialQuery, body: &impl ActorBody) -> bool {
        if !self.sprint_key_down {
            return false;
        }
        self.can_stand(world, body)
    }

    /// Probe from the feet up to the top of a standing capsule
    fn probe_headroom(
        &self,
        world: &impl SpatialQuery,
        body: &impl ActorBody,
    ) -> Result<bool, QueryError> {
        let up = body.up_vector();
        let bottom = body.actor_position() - up * body.capsule_half_height();
        let top = bottom + up * (2.0 * self.standing_half_height);
        world.probe(bottom, top)
    }

    /// Transition to `next`. Setting the current state again does nothing.
    pub fn set_state(&mut self, next: MovementState, body: &mut impl ActorBody) {
        if self.state == next {
            return;
        }

        let prev = self.state;
        self.state = next;
        debug!("Movement state {} -> {}", prev, next);

        self.on_state_change(prev, body);

        match self.state {
            MovementState::Walking | MovementState::Running => body.end_crouch_pose(),
            MovementState::Crouching => body.begin_crouch_pose(),
            MovementState::Sliding => {
                body.begin_crouch_pose();
                body.begin_slide_pose();
            }
        }
    }

    fn on_state_change(&self, prev: MovementState, body: &mut impl ActorBody) {
        body.set_max_speed(self.max_speed_for(self.state));

        if prev == MovementState::Sliding {
            body.set_braking_deceleration(self.config.braking_deceleration);
        }

        // Slide braking is written on entry too, not only restored on exit
        if self.state == MovementState::Sliding {
            body.set_braking_deceleration(self.config.slide_braking_deceleration);
            body.set_velocity(body.forward_vector() * self.config.slide_speed());
        }
    }

    /// Per-frame update.
    ///
    /// A crouched character stands back up as soon as the key is up and
    /// there is room. A sliding character gets the optional slope force and
    /// the slide-decay check.
    pub fn tick(&mut self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        match self.state {
            MovementState::Crouching => {
                if !self.crouch_key_down && self.can_stand(world, &*body) {
                    self.resolve(world, body);
                }
            }
            MovementState::Sliding => {
                if self.config.floor_influence {
                    self.apply_floor_influence(world, body);
                }
                if self.config.slide_decay {
                    self.check_slide_decay(world, body);
                }
            }
            MovementState::Walking | MovementState::Running => {}
        }
    }

    /// End a slide that has slowed to crouch speed. Returns whether it fired.
    pub fn check_slide_decay(
        &mut self,
        world: &impl SpatialQuery,
        body: &mut impl ActorBody,
    ) -> bool {
        if body.speed() > self.config.crouch_speed {
            return false;
        }
        self.resolve(world, body);
        body.end_slide_pose();
        true
    }

    /// Push the character down the slope it stands on. Level floors and
    /// missing floors are left alone.
    pub fn apply_floor_influence(&self, world: &impl SpatialQuery, body: &mut impl ActorBody) {
        let Some(normal) = world.current_floor_normal() else {
            return;
        };
        let up = body.up_vector();
        if normal == up {
            return;
        }

        let downhill = normal.cross(normal.cross(up)).normalize_or_zero();
        if downhill == Vec3::ZERO {
            return;
        }
        body.add_force(downhill * self.config.floor_influence_strength);
    }

    /// World-space wish direction for a 2-axis move input (x = right,
    /// y = forward) relative to the camera yaw. Steering is locked while
    /// sliding.
    pub fn movement_input(&self, axis: Vec2, camera_yaw: f32) -> Vec3 {
        if self.state == MovementState::Sliding {
            return Vec3::ZERO;
        }

        let axis = axis.clamp_length_max(1.0);
        let local = Vec3::new(axis.x, 0.0, -axis.y);
        let (sin_yaw, cos_yaw) = camera_yaw.sin_cos();
        Vec3::new(
            local.x * cos_yaw - local.z * sin_yaw,
            0.0,
            local.x * sin_yaw + local.z * cos_yaw,
        )
    }
}
