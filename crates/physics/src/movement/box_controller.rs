//! Box character: collision-resolved movement and contact classification.
//!
//! The box character knows nothing about speeds or input. It takes a
//! displacement, moves through the world without ending up inside anything,
//! and reports what it is standing on and whether its head is against
//! something.

use glam::Vec3;

use crate::collision::{trace_box, BoxShape, ColliderHandle, CollisionResolver, LayerMask, PhysicsQuery};

use super::config::ControllerConfig;
use super::state::ContactState;

/// Where a vertical trace says the character would come to rest.
#[derive(Debug, Clone, Copy)]
struct Bound {
    /// Character center height when touching the traced surface.
    block: f32,
    /// Surface normal of the traced surface.
    normal: Vec3,
}

/// An axis-aligned box that moves through a [`PhysicsQuery`] world.
///
/// # Example
///
/// ```ignore
/// let mut character = BoxCharacterController::new(&ControllerConfig::default(), spawn);
///
/// // Each tick:
/// character.step(&world, desired_displacement, delta_time);
/// if character.is_grounded() { ... }
/// ```
#[derive(Debug, Clone)]
pub struct BoxCharacterController {
    shape: BoxShape,
    position: Vec3,
    previous_position: Vec3,

    layer_mask: LayerMask,
    step_length: f32,
    wall_epsilon: f32,
    contact_offset: f32,
    collider_scale: f32,

    resolver: CollisionResolver,
    contact: ContactState,
}

impl BoxCharacterController {
    /// Create a character at `position` with the shape and collision
    /// settings from `config`.
    pub fn new(config: &ControllerConfig, position: Vec3) -> Self {
        Self {
            shape: BoxShape::new(config.half_extents()),
            position,
            previous_position: position,
            layer_mask: config.layer_mask,
            step_length: config.step_length,
            wall_epsilon: config.wall_epsilon,
            contact_offset: config.contact_offset,
            collider_scale: config.collider_scale,
            resolver: CollisionResolver::with_capacity(config.overlap_capacity),
            contact: ContactState::default(),
        }
    }

    /// Mark `collider` as the character's own collider so resolution ignores it.
    pub fn with_self_collider(mut self, collider: ColliderHandle) -> Self {
        self.shape.collider = Some(collider);
        self
    }

    /// Move by `displacement`, then look for ground and ceiling.
    ///
    /// The horizontal part of the move is resolved first, then the vertical
    /// part from where the horizontal part ended. Only the horizontal
    /// resolution's penetration is kept in the contact state.
    pub fn move_by<Q: PhysicsQuery + ?Sized>(&mut self, query: &Q, displacement: Vec3) {
        let velocity = self.contact.velocity;
        self.contact = ContactState {
            velocity,
            ..ContactState::default()
        };

        let horizontal = Vec3::new(displacement.x, 0.0, displacement.z);
        let result = self.resolver.step_resolve(
            query,
            &self.shape,
            self.position,
            horizontal,
            self.layer_mask,
            self.step_length,
        );
        self.contact.penetration = result.penetration;
        self.position = result.position;

        let vertical = Vec3::new(0.0, displacement.y, 0.0);
        let result = self.resolver.step_resolve(
            query,
            &self.shape,
            self.position,
            vertical,
            self.layer_mask,
            self.step_length,
        );
        self.position = result.position;

        let reach = displacement.y.abs() + self.wall_epsilon;

        let ground = self.vertical_bound(query, -reach);
        if (ground.block - self.position.y).abs() < self.wall_epsilon {
            self.contact.ground_normal = ground.normal;
            self.contact.ground_angle = angle_from_up(ground.normal);
            self.contact.grounded = true;
        }

        let ceiling = self.vertical_bound(query, reach);
        if (ceiling.block - self.position.y).abs() < self.wall_epsilon {
            self.contact.touches_ceiling = true;
        }
    }

    /// Update the measured velocity from the position change since the last
    /// measurement. Does nothing for non-positive `delta_time`.
    pub fn measure_velocity(&mut self, delta_time: f32) {
        if delta_time <= 0.0 {
            return;
        }
        self.contact.velocity = (self.position - self.previous_position) / delta_time;
        self.previous_position = self.position;
    }

    /// One tick: [`move_by`](Self::move_by) then [`measure_velocity`](Self::measure_velocity).
    pub fn step<Q: PhysicsQuery + ?Sized>(&mut self, query: &Q, displacement: Vec3, delta_time: f32) {
        self.move_by(query, displacement);
        self.measure_velocity(delta_time);
    }

    /// Teleport without collision. The next velocity measurement starts here.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.previous_position = position;
    }

    /// Sweep the box vertically by `power` (negative = down) and work out
    /// where its center would be when touching whatever it hits.
    fn vertical_bound<Q: PhysicsQuery + ?Sized>(&self, query: &Q, power: f32) -> Bound {
        let half_height = self.shape.half_extents.y;
        let trace = trace_box(
            query,
            self.position,
            self.position + Vec3::new(0.0, power, 0.0),
            self.shape.half_extents,
            self.layer_mask,
            self.contact_offset,
            self.collider_scale,
        );

        // Below a floor the center sits above the hit, under a ceiling below it.
        let side = -power.signum();
        let block = match trace.hit {
            Some(hit) => hit.point.y + side * half_height,
            None => -side * f32::INFINITY,
        };

        Bound {
            block,
            normal: trace.normal_or_up(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current center position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Full size of the box.
    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.shape.size()
    }

    /// Half extents of the box.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.shape.half_extents
    }

    /// The box shape used for resolution.
    #[inline]
    pub fn shape(&self) -> &BoxShape {
        &self.shape
    }

    /// Everything learned during the last move.
    #[inline]
    pub fn contact(&self) -> ContactState {
        self.contact
    }

    /// Angle of the ground below (degrees, 0 when not grounded).
    #[inline]
    pub fn ground_angle(&self) -> f32 {
        self.contact.ground_angle
    }

    /// Normal of the ground below (up when not grounded).
    #[inline]
    pub fn ground_normal(&self) -> Vec3 {
        self.contact.ground_normal
    }

    /// Measured velocity.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.contact.velocity
    }

    /// Check if standing on something.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.contact.grounded
    }

    /// Check if the top of the box is against something.
    #[inline]
    pub fn touches_ceiling(&self) -> bool {
        self.contact.touches_ceiling
    }

    /// Push-out from the horizontal part of the last move.
    #[inline]
    pub fn penetration(&self) -> Vec3 {
        self.contact.penetration
    }

    #[cfg(test)]
    pub(crate) fn contact_mut(&mut self) -> &mut ContactState {
        &mut self.contact
    }
}

/// Angle between `normal` and world up, in degrees.
fn angle_from_up(normal: Vec3) -> f32 {
    if normal.length_squared() < 1e-12 {
        return 0.0;
    }
    normal.angle_between(Vec3::Y).to_degrees()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionWorld;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor with its top at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            LayerMask::WORLD,
        );

        world
    }

    fn character_at(position: Vec3) -> BoxCharacterController {
        BoxCharacterController::new(&ControllerConfig::default(), position)
    }

    #[test]
    fn test_resting_on_floor() {
        let world = floor_world();
        let mut character = character_at(Vec3::new(0.0, 1.0, 0.0));

        character.move_by(&world, Vec3::ZERO);

        assert!(character.is_grounded(), "Should be on ground");
        assert!(!character.touches_ceiling());
        assert!(character.ground_angle().abs() < 0.1);
        assert!(character.ground_normal().dot(Vec3::Y) > 0.999);
        assert_eq!(character.penetration(), Vec3::ZERO);
        assert!((character.position().y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_own_collider_is_ignored() {
        let mut world = floor_world();
        let spawn = Vec3::new(0.0, 1.0, 0.0);
        let body = world.add_box(spawn, Vec3::new(0.5, 1.0, 0.5), LayerMask::CHARACTER);

        let mut character = character_at(spawn).with_self_collider(body);
        character.move_by(&world, Vec3::new(0.3, -0.05, 0.0));

        assert!((character.position() - Vec3::new(0.3, 1.0, 0.0)).length() < 1e-4);
        assert_eq!(character.penetration(), Vec3::ZERO);
        assert!(character.is_grounded());

        // A different character standing in the same spot gets pushed out
        let mut stranger = character_at(spawn);
        stranger.move_by(&world, Vec3::new(0.3, -0.05, 0.0));
        assert_ne!(stranger.penetration(), Vec3::ZERO);
    }

    #[test]
    fn test_free_fall_is_not_grounded() {
        let world = floor_world();
        let mut character = character_at(Vec3::new(0.0, 10.0, 0.0));

        character.move_by(&world, Vec3::new(0.0, -0.2, 0.0));

        assert!(!character.is_grounded());
        assert_eq!(character.ground_normal(), Vec3::Y);
        assert!((character.position().y - 9.8).abs() < 1e-4);
    }

    #[test]
    fn test_landing_resolves_onto_floor() {
        let world = floor_world();
        let mut character = character_at(Vec3::new(0.0, 1.3, 0.0));

        // Would end 0.2 below the floor surface
        character.move_by(&world, Vec3::new(0.0, -0.5, 0.0));

        assert!((character.position().y - 1.0).abs() < 1e-3);
        assert!(character.is_grounded());
        // Vertical push-out is not reported
        assert_eq!(character.penetration(), Vec3::ZERO);
    }

    #[test]
    fn test_walking_into_wall_reports_penetration() {
        let mut world = floor_world();
        // Wall face at x=2
        world.add_box(Vec3::new(2.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 10.0), LayerMask::WORLD);
        let mut character = character_at(Vec3::new(1.45, 1.0, 0.0));

        character.move_by(&world, Vec3::new(0.08, 0.0, 0.0));

        assert!((character.position().x - 1.5).abs() < 1e-3);
        assert!(character.penetration().x < 0.0);
        assert!(character.penetration().y.abs() < 1e-4);
        assert!(character.is_grounded());
    }

    #[test]
    fn test_ceiling_contact() {
        let mut world = floor_world();
        // Ceiling underside at y=2.05, just above the head
        world.add_box(Vec3::new(0.0, 2.55, 0.0), Vec3::new(5.0, 0.5, 5.0), LayerMask::WORLD);
        let mut character = character_at(Vec3::new(0.0, 1.0, 0.0));

        character.move_by(&world, Vec3::ZERO);

        assert!(character.touches_ceiling());
        assert!(character.is_grounded());
    }

    #[test]
    fn test_mask_filters_ground() {
        let world = floor_world();
        let config = ControllerConfig {
            layer_mask: LayerMask::DYNAMIC,
            ..Default::default()
        };
        let mut character = BoxCharacterController::new(&config, Vec3::new(0.0, 1.0, 0.0));

        character.move_by(&world, Vec3::new(0.0, -0.05, 0.0));

        assert!(!character.is_grounded());
        assert!((character.position().y - 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_ground_angle_on_ramp() {
        let mut world = CollisionWorld::new();
        // 30 degree ramp rising along +X
        let rise = 10.0 * 30f32.to_radians().tan();
        world.add_ramp(Vec3::new(0.0, 0.0, -5.0), Vec3::new(10.0, rise, 5.0), LayerMask::WORLD);

        // Uphill bottom edge hovers 0.02 above the surface
        let x = 4.0;
        let surface = (x + 0.5) * 30f32.to_radians().tan();
        let mut character = character_at(Vec3::new(x, surface + 1.02, 0.0));

        character.move_by(&world, Vec3::ZERO);

        assert!(character.is_grounded());
        assert!((character.ground_angle() - 30.0).abs() < 0.5);
    }

    #[test]
    fn test_measure_velocity() {
        let world = floor_world();
        let mut character = character_at(Vec3::new(0.0, 1.0, 0.0));

        character.step(&world, Vec3::new(0.05, 0.0, 0.0), 0.02);
        assert!((character.velocity().x - 2.5).abs() < 1e-3);

        character.measure_velocity(0.0);
        assert!((character.velocity().x - 2.5).abs() < 1e-3);

        character.set_position(Vec3::new(10.0, 1.0, 0.0));
        character.step(&world, Vec3::ZERO, 0.02);
        assert!(character.velocity().length() < 1e-3);
    }

    #[test]
    fn test_scale() {
        let character = character_at(Vec3::ZERO);
        assert_eq!(character.scale(), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(character.half_extents(), Vec3::new(0.5, 1.0, 0.5));
    }
}
