//! Kinematic character body using rapier3d's character controller
//!
//! The body is the movement integrator: it owns velocity, speed cap, braking
//! and pending forces, and sweeps a capsule through the world each step.
//! Gameplay code decides *which* parameters apply; the body only applies them.

use glam::Vec3;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use stride_core::Transform;

use crate::PhysicsWorld;

/// Character body configuration (centimetres, seconds, kilograms)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBodyConfig {
    /// Capsule radius
    pub radius: f32,
    /// Capsule half-height while standing, caps included
    pub standing_half_height: f32,
    /// Capsule half-height while crouched
    pub crouched_half_height: f32,
    /// Maximum slope angle in degrees
    pub max_slope_angle: f32,
    /// Step height for climbing stairs
    pub step_height: f32,
    /// Skin width for collision detection
    pub skin_width: f32,
    /// Whether to snap to ground when walking down slopes
    pub snap_to_ground: bool,
    /// Maximum ground snap distance
    pub ground_snap_distance: f32,
    /// How far below the feet the floor probe reaches
    pub floor_probe_distance: f32,
    /// Acceleration toward the wish velocity
    pub max_acceleration: f32,
    /// Initial braking deceleration when there is no input
    pub braking_deceleration: f32,
    /// Body mass, divides applied forces
    pub mass: f32,
    /// Upward velocity given by a jump
    pub jump_velocity: f32,
    /// Turn to face the input direction
    pub orient_to_movement: bool,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            radius: 42.0,
            standing_half_height: 96.0,
            crouched_half_height: 44.0,
            max_slope_angle: 45.0,
            step_height: 45.0,
            skin_width: 2.0,
            snap_to_ground: true,
            ground_snap_distance: 20.0,
            floor_probe_distance: 25.0,
            max_acceleration: 2048.0,
            braking_deceleration: 2000.0,
            mass: 100.0,
            jump_velocity: 700.0,
            orient_to_movement: true,
        }
    }
}

/// Capsule character driven by a kinematic controller
pub struct CharacterBody {
    /// Configuration
    pub config: CharacterBodyConfig,
    /// Feet position and facing
    pub transform: Transform,
    /// Current velocity
    pub velocity: Vec3,
    /// Speed cap for input-driven acceleration
    pub max_speed: f32,
    /// Deceleration applied when there is no input (or no speed cap)
    pub braking_deceleration: f32,
    /// Whether the character is on the ground
    pub grounded: bool,
    /// The collider handle for this character
    pub collider_handle: Option<ColliderHandle>,
    crouched: bool,
    crouch_requested: bool,
    sliding: bool,
    floor_normal: Option<Vec3>,
    pending_force: Vec3,
    controller: KinematicCharacterController,
}

impl CharacterBody {
    /// Create a new character body with default config
    pub fn new() -> Self {
        Self::with_config(CharacterBodyConfig::default())
    }

    /// Create a new character body with custom config
    pub fn with_config(config: CharacterBodyConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: true,
        });
        controller.snap_to_ground = if config.snap_to_ground {
            Some(CharacterLength::Absolute(config.ground_snap_distance))
        } else {
            None
        };
        controller.offset = CharacterLength::Absolute(config.skin_width);

        Self {
            max_speed: 0.0,
            braking_deceleration: config.braking_deceleration,
            config,
            transform: Transform::default(),
            velocity: Vec3::ZERO,
            grounded: false,
            collider_handle: None,
            crouched: false,
            crouch_requested: false,
            sliding: false,
            floor_normal: None,
            pending_force: Vec3::ZERO,
            controller,
        }
    }

    /// Spawn the character in the physics world with its feet at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> ColliderHandle {
        self.transform.position = position;

        let collider = ColliderBuilder::new(self.capsule_shape())
            .translation(Self::to_vector(self.center_position()))
            .friction(0.0)
            .restitution(0.0)
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        handle
    }

    /// Current capsule half-height (standing or crouched)
    pub fn half_height(&self) -> f32 {
        if self.crouched {
            self.config.crouched_half_height
        } else {
            self.config.standing_half_height
        }
    }

    /// Whether the crouched capsule is active
    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    fn capsule_shape(&self) -> SharedShape {
        let half_segment = (self.half_height() - self.config.radius).max(0.01);
        SharedShape::capsule_y(half_segment, self.config.radius)
    }

    fn to_vector(v: Vec3) -> Vector<Real> {
        vector![v.x, v.y, v.z]
    }

    /// Swap between the standing and crouched capsule, keeping the feet in place.
    ///
    /// Standing back up does not check for room overhead; callers do that
    /// before asking.
    pub fn set_crouched(&mut self, physics: &mut PhysicsWorld, crouched: bool) {
        self.crouch_requested = crouched;
        if self.crouched == crouched {
            return;
        }
        self.crouched = crouched;
        self.sync_collider(physics, true);
    }

    /// Ask for the crouched (or standing) capsule from the next update on
    pub fn request_crouch(&mut self, crouched: bool) {
        self.crouch_requested = crouched;
    }

    /// Whether the next update will use the crouched capsule
    pub fn crouch_requested(&self) -> bool {
        self.crouch_requested
    }

    /// Mark the body as sliding. A sliding body keeps its facing.
    pub fn set_sliding(&mut self, sliding: bool) {
        self.sliding = sliding;
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    fn sync_collider(&self, physics: &mut PhysicsWorld, reshape: bool) {
        let Some(handle) = self.collider_handle else {
            return;
        };
        let shape = reshape.then(|| self.capsule_shape());
        if let Some(collider) = physics.collider_set.get_mut(handle) {
            if let Some(shape) = shape {
                collider.set_shape(shape);
            }
            collider.set_translation(Self::to_vector(self.center_position()));
        }
    }

    /// Move the character with collision detection.
    ///
    /// Returns the translation actually applied, or `None` when the body has
    /// no collider to sweep.
    pub fn move_character(
        &mut self,
        physics: &mut PhysicsWorld,
        desired_translation: Vec3,
        dt: f32,
    ) -> Option<Vec3> {
        let collider_handle = self.collider_handle?;
        let collider = physics.collider_set.get(collider_handle)?;

        let shape = collider.shape();
        let center = self.center_position();
        let current_pos = Isometry::translation(center.x, center.y, center.z);

        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            &physics.query_pipeline,
            shape,
            &current_pos,
            Self::to_vector(desired_translation),
            QueryFilter::default().exclude_collider(collider_handle),
            |_| {},
        );

        self.grounded = movement.grounded;

        let effective = movement.translation;
        let effective = Vec3::new(effective.x, effective.y, effective.z);
        self.transform.translate(effective);

        self.sync_collider(physics, false);
        Some(effective)
    }

    /// Drop the part of the velocity the sweep could not carry out, so a
    /// character held against a wall reports the speed it really has.
    fn absorb_blocked_motion(&mut self, desired: Vec3, moved: Vec3, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let intended = Vec3::new(desired.x, 0.0, desired.z);
        let actual = Vec3::new(moved.x, 0.0, moved.z);
        if actual.length_squared() < intended.length_squared() {
            self.velocity.x = actual.x / dt;
            self.velocity.z = actual.z / dt;
        }

        // head hit a ceiling
        if desired.y > 0.0 && moved.y < desired.y {
            self.velocity.y = moved.y.max(0.0) / dt;
        }
    }

    /// Integrate velocity toward `wish_dir * max_speed` and move.
    ///
    /// `wish_dir` is a world-space direction; only its horizontal part is
    /// used and its length is capped at 1.
    pub fn update(&mut self, physics: &mut PhysicsWorld, wish_dir: Vec3, dt: f32) {
        if self.crouch_requested != self.crouched {
            self.set_crouched(physics, self.crouch_requested);
        }

        let wish = Vec3::new(wish_dir.x, 0.0, wish_dir.z).clamp_length_max(1.0);
        let mut horizontal = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let mut vertical = self.velocity.y;

        if wish.length_squared() > 0.0 && self.max_speed > 0.0 {
            horizontal = move_towards(
                horizontal,
                wish * self.max_speed,
                self.config.max_acceleration * dt,
            );
        } else {
            horizontal = move_towards(horizontal, Vec3::ZERO, self.braking_deceleration * dt);
        }

        let force_accel = self.pending_force / self.config.mass.max(f32::EPSILON);
        self.pending_force = Vec3::ZERO;
        horizontal += Vec3::new(force_accel.x, 0.0, force_accel.z) * dt;
        vertical += force_accel.y * dt;

        // Gravity applies on the ground too: the sweep has to press into the
        // floor for the controller to keep reporting contact.
        vertical += physics.config.gravity.y * dt;

        self.velocity = Vec3::new(horizontal.x, vertical, horizontal.z);

        if self.config.orient_to_movement && !self.sliding && wish.length_squared() > 0.0 {
            self.transform.face_direction(wish);
        }

        let desired = self.velocity * dt;
        if let Some(moved) = self.move_character(physics, desired, dt) {
            self.absorb_blocked_motion(desired, moved, dt);
        }
        if self.grounded && self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
        self.refresh_floor(physics);
    }

    /// Re-sample the floor under the capsule
    pub fn refresh_floor(&mut self, physics: &PhysicsWorld) {
        let Some(handle) = self.collider_handle else {
            self.floor_normal = None;
            return;
        };
        if !self.grounded {
            self.floor_normal = None;
            return;
        }
        let filter = QueryFilter::default().exclude_collider(handle);
        self.floor_normal = physics
            .raycast_detailed(
                self.center_position(),
                Vec3::NEG_Y,
                self.half_height() + self.config.floor_probe_distance,
                filter,
            )
            .map(|hit| hit.normal);
    }

    /// Normal of the floor the character stands on, if grounded
    pub fn floor_normal(&self) -> Option<Vec3> {
        self.floor_normal
    }

    /// Jump if standing on something. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = self.config.jump_velocity;
        self.grounded = false;
        true
    }

    /// Set the character's position directly (teleport)
    pub fn set_position(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.transform.position = position;
        self.sync_collider(physics, false);
    }

    /// Feet position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get the center position (middle of capsule)
    pub fn center_position(&self) -> Vec3 {
        self.transform.position + Vec3::Y * self.half_height()
    }

    /// Current speed (length of the full velocity)
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Check if standing on ground
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Queue a force for the next update
    pub fn add_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    /// Force queued for the next update
    pub fn pending_force(&self) -> Vec3 {
        self.pending_force
    }

    /// Set the character's velocity directly
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Move a vector towards a target by a maximum delta
fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let diff = target - current;
    let distance = diff.length();

    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + diff / distance * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_body_config() {
        let config = CharacterBodyConfig::default();
        assert_eq!(config.radius, 42.0);
        assert_eq!(config.standing_half_height, 96.0);
        assert!(config.crouched_half_height < config.standing_half_height);
    }

    #[test]
    fn test_move_towards() {
        let result = move_towards(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 5.0);
        assert!((result.x - 5.0).abs() < 0.001);

        let result = move_towards(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, 5.0);
        assert_eq!(result, Vec3::ZERO);
    }

    #[test]
    fn test_center_follows_crouch() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::ZERO);
        assert_eq!(body.center_position().y, 96.0);

        body.set_crouched(&mut world, true);
        assert!(body.is_crouched());
        assert_eq!(body.center_position().y, 44.0);
        assert_eq!(body.position(), Vec3::ZERO);

        let handle = body.collider_handle.unwrap();
        let collider = world.get_collider(handle).unwrap();
        assert!((collider.translation().y - 44.0).abs() < 1e-4);
    }

    #[test]
    fn test_braking_without_input() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.grounded = true;
        body.max_speed = 600.0;
        body.set_velocity(Vec3::new(500.0, 0.0, 0.0));

        // not spawned: integration runs, the sweep is skipped
        body.update(&mut world, Vec3::ZERO, 0.1);
        assert!((body.velocity.x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_max_speed_ignores_input() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.grounded = true;
        body.max_speed = 0.0;
        body.braking_deceleration = 400.0;
        body.set_velocity(Vec3::new(0.0, 0.0, -1500.0));

        body.update(&mut world, Vec3::X, 0.5);
        assert!((body.velocity.z + 1300.0).abs() < 1e-3);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_force_is_divided_by_mass() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.grounded = true;
        body.braking_deceleration = 0.0;
        body.add_force(Vec3::new(1000.0, 0.0, 0.0));
        assert_eq!(body.pending_force(), Vec3::new(1000.0, 0.0, 0.0));

        body.update(&mut world, Vec3::ZERO, 1.0);
        assert!((body.velocity.x - 10.0).abs() < 1e-4);
        assert_eq!(body.pending_force(), Vec3::ZERO);
    }

    #[test]
    fn test_crouch_request_applies_on_update() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::ZERO);

        body.request_crouch(true);
        assert!(!body.is_crouched());
        assert_eq!(body.half_height(), 96.0);

        body.update(&mut world, Vec3::ZERO, 1.0 / 60.0);
        assert!(body.is_crouched());
        assert_eq!(body.half_height(), 44.0);
    }

    #[test]
    fn test_sliding_body_keeps_facing() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        body.grounded = true;
        body.max_speed = 600.0;
        body.set_sliding(true);

        body.update(&mut world, Vec3::X, 1.0 / 60.0);
        assert!((body.transform.forward() - Vec3::NEG_Z).length() < 1e-6);

        body.set_sliding(false);
        body.update(&mut world, Vec3::X, 1.0 / 60.0);
        assert!((body.transform.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut body = CharacterBody::new();
        assert!(!body.jump());

        body.grounded = true;
        assert!(body.jump());
        assert_eq!(body.velocity.y, 700.0);
        assert!(!body.is_grounded());
    }

    #[test]
    fn test_stays_grounded_every_frame() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.refresh_queries();

        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..10 {
            body.update(&mut world, Vec3::ZERO, 1.0 / 60.0);
        }
        for frame in 0..12 {
            body.update(&mut world, Vec3::ZERO, 1.0 / 60.0);
            assert!(body.is_grounded(), "lost the floor on frame {}", frame);
            assert!(body.floor_normal().is_some());
            assert_eq!(body.velocity.y, 0.0);
        }
    }

    #[test]
    fn test_wall_absorbs_velocity() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.create_static_box(Vec3::new(500.0, 200.0, 10.0), Vec3::new(0.0, 200.0, -150.0));
        world.refresh_queries();

        let mut body = CharacterBody::new();
        body.max_speed = 1000.0;
        body.spawn(&mut world, Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..120 {
            body.update(&mut world, Vec3::NEG_Z, 1.0 / 60.0);
        }

        assert!(body.position().z > -140.0);
        assert!(body.speed() < 100.0);
    }

    #[test]
    fn test_settles_on_ground() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.refresh_queries();

        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::new(0.0, 5.0, 0.0));
        for _ in 0..60 {
            body.update(&mut world, Vec3::ZERO, 1.0 / 60.0);
        }
        assert!(body.is_grounded());
        assert!(body.position().y < 5.0);
        let normal = body.floor_normal().expect("grounded body sees its floor");
        assert!((normal - Vec3::Y).length() < 1e-4);
    }
}
