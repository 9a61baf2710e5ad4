//! Rapier-backed collaborators for the movement controller

use glam::Vec3;
use rapier3d::prelude::{ColliderHandle, QueryFilter};
use stride_physics::{CharacterBody, PhysicsWorld};

use super::{ActorBody, MovementSink, PoseSink, QueryError, SpatialQuery};

/// Read-only view of the physics world from one character's point of view.
///
/// Built per frame; it copies what it needs from the body so the body can
/// be borrowed mutably alongside it.
pub struct WorldProbe<'a> {
    physics: &'a PhysicsWorld,
    exclude: Option<ColliderHandle>,
    floor_normal: Option<Vec3>,
    skin: f32,
}

impl<'a> WorldProbe<'a> {
    pub fn new(physics: &'a PhysicsWorld, body: &CharacterBody) -> Self {
        Self {
            physics,
            exclude: body.collider_handle,
            floor_normal: body.floor_normal(),
            skin: body.config.skin_width,
        }
    }
}

impl SpatialQuery for WorldProbe<'_> {
    /// The segment starts one skin width in, so a probe from the feet does
    /// not report the floor the character is standing on.
    fn probe(&self, from: Vec3, to: Vec3) -> Result<bool, QueryError> {
        let Some(handle) = self.exclude else {
            return Err(QueryError::BodyNotSpawned);
        };
        if !from.is_finite() || !to.is_finite() {
            return Err(QueryError::NonFiniteSegment { from, to });
        }

        let delta = to - from;
        let length = delta.length();
        if length <= self.skin {
            return Ok(false);
        }

        let start = from + delta / length * self.skin;
        let filter = QueryFilter::default().exclude_collider(handle);
        Ok(self.physics.segment_blocked(start, to, filter))
    }

    fn current_floor_normal(&self) -> Option<Vec3> {
        self.floor_normal
    }
}

impl MovementSink for CharacterBody {
    fn set_max_speed(&mut self, speed: f32) {
        self.max_speed = speed;
    }

    fn set_braking_deceleration(&mut self, deceleration: f32) {
        self.braking_deceleration = deceleration;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn add_force(&mut self, force: Vec3) {
        CharacterBody::add_force(self, force);
    }

    fn is_airborne(&self) -> bool {
        !self.grounded
    }
}

// Capsule changes land on the next body update, which has the physics world.
impl PoseSink for CharacterBody {
    fn begin_crouch_pose(&mut self) {
        self.request_crouch(true);
    }

    fn end_crouch_pose(&mut self) {
        self.request_crouch(false);
    }

    fn begin_slide_pose(&mut self) {
        self.set_sliding(true);
    }

    fn end_slide_pose(&mut self) {
        self.set_sliding(false);
    }
}

impl ActorBody for CharacterBody {
    fn actor_position(&self) -> Vec3 {
        self.center_position()
    }

    fn forward_vector(&self) -> Vec3 {
        self.transform.forward()
    }

    fn up_vector(&self) -> Vec3 {
        self.transform.up()
    }

    fn capsule_half_height(&self) -> f32 {
        self.half_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{MovementConfig, MovementState, MovementStateController};

    fn level_with_ceiling(ceiling_bottom: f32) -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.create_static_box(
            Vec3::new(200.0, 10.0, 200.0),
            Vec3::new(0.0, ceiling_bottom + 10.0, 0.0),
        );
        world
    }

    fn spawned(world: &mut PhysicsWorld) -> CharacterBody {
        let mut body = CharacterBody::new();
        body.spawn(world, Vec3::ZERO);
        body.grounded = true;
        world.refresh_queries();
        body
    }

    #[test]
    fn test_probe_without_body_fails() {
        let world = PhysicsWorld::new();
        let body = CharacterBody::new();
        let probe = WorldProbe::new(&world, &body);
        assert_eq!(
            probe.probe(Vec3::ZERO, Vec3::Y * 192.0),
            Err(QueryError::BodyNotSpawned)
        );
    }

    #[test]
    fn test_probe_rejects_nan() {
        let mut world = PhysicsWorld::new();
        let body = spawned(&mut world);
        let probe = WorldProbe::new(&world, &body);
        let result = probe.probe(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y);
        assert!(matches!(result, Err(QueryError::NonFiniteSegment { .. })));
    }

    #[test]
    fn test_probe_ignores_floor_and_self() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let body = spawned(&mut world);

        let probe = WorldProbe::new(&world, &body);
        assert_eq!(probe.probe(Vec3::ZERO, Vec3::Y * 192.0), Ok(false));
    }

    #[test]
    fn test_low_ceiling_blocks_standing() {
        let mut world = level_with_ceiling(150.0);
        let body = spawned(&mut world);
        let controller = MovementStateController::new(MovementConfig::default(), 96.0);

        let probe = WorldProbe::new(&world, &body);
        assert!(!controller.can_stand(&probe, &body));
    }

    #[test]
    fn test_high_ceiling_allows_standing() {
        let mut world = level_with_ceiling(250.0);
        let body = spawned(&mut world);
        let controller = MovementStateController::new(MovementConfig::default(), 96.0);

        let probe = WorldProbe::new(&world, &body);
        assert!(controller.can_stand(&probe, &body));
    }

    #[test]
    fn test_crouched_body_probes_full_standing_height() {
        let mut world = level_with_ceiling(150.0);
        let mut body = spawned(&mut world);
        body.set_crouched(&mut world, true);
        world.refresh_queries();

        let controller = MovementStateController::new(MovementConfig::default(), 96.0);
        let probe = WorldProbe::new(&world, &body);
        assert!(!controller.can_stand(&probe, &body));
    }

    #[test]
    fn test_slide_entry_writes_into_body() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let mut body = spawned(&mut world);
        let mut controller = MovementStateController::new(MovementConfig::default(), 96.0);
        controller.apply_profile(&mut body);
        assert_eq!(body.max_speed, 600.0);

        {
            let probe = WorldProbe::new(&world, &body);
            controller.on_sprint_pressed(&probe, &mut body);
        }
        assert_eq!(controller.state(), MovementState::Running);
        assert_eq!(body.max_speed, 1000.0);

        body.velocity = body.transform.forward() * 900.0;
        controller.on_crouch_pressed(&mut body);

        assert_eq!(controller.state(), MovementState::Sliding);
        assert_eq!(body.max_speed, 0.0);
        assert_eq!(body.braking_deceleration, 400.0);
        assert!((body.velocity - Vec3::NEG_Z * 1500.0).length() < 1e-3);
        assert!(body.crouch_requested());
        assert!(body.is_sliding());
    }

    #[test]
    fn test_airborne_body_cannot_slide() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let mut body = spawned(&mut world);
        let mut controller = MovementStateController::new(MovementConfig::default(), 96.0);
        {
            let probe = WorldProbe::new(&world, &body);
            controller.on_sprint_pressed(&probe, &mut body);
        }
        assert_eq!(controller.state(), MovementState::Running);

        body.grounded = false;
        body.velocity = body.transform.forward() * 900.0;
        controller.on_crouch_pressed(&mut body);

        assert_eq!(controller.state(), MovementState::Running);
        assert!(controller.crouch_key_down());
        assert!(!body.is_sliding());
    }
}
