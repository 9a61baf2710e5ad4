//! Collaborators the movement controller reads from and writes into
//!
//! The controller owns none of these. They are borrowed for the duration of
//! each call so the same controller runs against the rapier world, a test
//! double, or anything else that can answer the questions.

use glam::Vec3;

use super::QueryError;

/// World queries used for stand and slope checks
pub trait SpatialQuery {
    /// Whether anything obstructs the segment `from -> to`
    fn probe(&self, from: Vec3, to: Vec3) -> Result<bool, QueryError>;

    /// Normal of the floor the character currently stands on
    fn current_floor_normal(&self) -> Option<Vec3>;
}

/// The movement integrator the controller pushes locomotion parameters into
pub trait MovementSink {
    fn set_max_speed(&mut self, speed: f32);
    fn set_braking_deceleration(&mut self, deceleration: f32);
    fn set_velocity(&mut self, velocity: Vec3);
    fn velocity(&self) -> Vec3;
    /// Add a force for the next integration step
    fn add_force(&mut self, force: Vec3);
    fn is_airborne(&self) -> bool;
}

/// Pose changes that accompany state transitions
pub trait PoseSink {
    fn begin_crouch_pose(&mut self);
    fn end_crouch_pose(&mut self);
    fn begin_slide_pose(&mut self);
    fn end_slide_pose(&mut self);
}

/// The character as seen by the controller
pub trait ActorBody: MovementSink + PoseSink {
    /// Capsule centre in world space
    fn actor_position(&self) -> Vec3;
    fn forward_vector(&self) -> Vec3;
    fn up_vector(&self) -> Vec3;
    /// Half-height of the capsule as it is right now
    fn capsule_half_height(&self) -> f32;

    fn speed(&self) -> f32 {
        self.velocity().length()
    }
}
