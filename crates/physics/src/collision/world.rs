//! Collision world containing all static and dynamic geometry.
//!
//! The collision world stores every collider a character can touch and
//! answers the [`PhysicsQuery`] questions against it using parry3d.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{cast_shapes, contact, intersection_test, Ray, ShapeCastOptions};
use parry3d::shape::{Cuboid, SharedShape};

use super::layers::LayerMask;
use super::query::{
    ColliderHandle, OverlapBuffer, Penetration, PhysicsQuery, RayHit, SweepHit,
};

/// Overlaps no deeper than this are resting contact, not penetration.
pub const PENETRATION_TOLERANCE: f32 = 1e-4;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct Collider {
    /// Handle returned when the collider was added.
    pub handle: ColliderHandle,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position in world space. Rotation is always identity for boxes.
    pub transform: Isometry<Real>,
    /// Layers this collider belongs to.
    pub layer: LayerMask,
}

/// The collision world containing all geometry.
///
/// Supports:
/// - Axis-aligned boxes (floors, walls, ceilings, crates)
/// - Convex hulls (ramps and other sloped pieces)
///
/// Colliders can be moved between ticks with [`CollisionWorld::set_position`];
/// queries always see the latest positions.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `layer` - Layers the box belongs to
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, layer: LayerMask) -> ColliderHandle {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.insert(shape, to_isometry(center), layer)
    }

    /// Add a convex hull to the world.
    ///
    /// Points are given in world space.
    ///
    /// # Returns
    ///
    /// The collider handle, or `None` if the hull couldn't be computed.
    pub fn add_convex_hull(&mut self, points: &[Vec3], layer: LayerMask) -> Option<ColliderHandle> {
        let parry_points: Vec<Point<Real>> = points.iter().map(|p| to_point(*p)).collect();
        let shape = SharedShape::convex_hull(&parry_points)?;
        Some(self.insert(shape, Isometry::identity(), layer))
    }

    /// Add a wedge-shaped ramp spanning the box `min..max`.
    ///
    /// The ramp surface rises along +X, from `min.y` at `min.x` to `max.y`
    /// at `max.x`. Its slope angle is `atan((max.y - min.y) / (max.x - min.x))`.
    pub fn add_ramp(&mut self, min: Vec3, max: Vec3, layer: LayerMask) -> Option<ColliderHandle> {
        let points = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, max.y, max.z),
        ];
        self.add_convex_hull(&points, layer)
    }

    /// Move a collider to a new center. Returns `false` for unknown handles.
    pub fn set_position(&mut self, handle: ColliderHandle, center: Vec3) -> bool {
        match self.colliders.iter_mut().find(|c| c.handle == handle) {
            Some(collider) => {
                collider.transform = to_isometry(center);
                true
            }
            None => false,
        }
    }

    /// Remove a collider. Returns `false` for unknown handles.
    pub fn remove(&mut self, handle: ColliderHandle) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.handle != handle);
        self.colliders.len() != before
    }

    /// Look up a collider by handle.
    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.handle == handle)
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Get the number of colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    fn insert(&mut self, shape: SharedShape, transform: Isometry<Real>, layer: LayerMask) -> ColliderHandle {
        let handle = ColliderHandle(self.next_id);
        self.next_id += 1;

        self.colliders.push(Collider {
            handle,
            shape,
            transform,
            layer,
        });

        handle
    }
}

impl PhysicsQuery for CollisionWorld {
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, mask: LayerMask, out: &mut OverlapBuffer) {
        out.clear();

        let shape = to_cuboid(half_extents);
        let transform = to_isometry(center);

        for collider in &self.colliders {
            if !mask.intersects(collider.layer) {
                continue;
            }

            match intersection_test(&transform, &shape, &collider.transform, collider.shape.as_ref()) {
                Ok(true) => {
                    out.push(collider.handle);
                }
                Ok(false) => {}
                Err(_) => {
                    log::warn!("overlap test unsupported for collider {:?}", collider.handle);
                }
            }
        }

        if out.dropped() > 0 {
            log::trace!(
                "overlap buffer full: kept {}, dropped {}",
                out.len(),
                out.dropped()
            );
        }
    }

    fn penetration(&self, center: Vec3, half_extents: Vec3, other: ColliderHandle) -> Option<Penetration> {
        let collider = self.get(other)?;

        // Boxes never rotate, so box-box depth is exact on the three axes.
        if let Some(cuboid) = collider.shape.as_cuboid() {
            return box_penetration(
                center,
                half_extents,
                to_vec3(&collider.transform.translation.vector),
                to_vec3(&cuboid.half_extents),
            );
        }

        let shape = to_cuboid(half_extents);
        let transform = to_isometry(center);

        match contact(&transform, &shape, &collider.transform, collider.shape.as_ref(), 0.0) {
            // Negative distance means penetration. normal1 points from the
            // box towards the collider, so the way out is the opposite.
            Ok(Some(result)) if result.dist < -PENETRATION_TOLERANCE => Some(Penetration {
                direction: -to_vec3(&result.normal1),
                distance: -result.dist,
            }),
            Ok(_) => None,
            Err(_) => {
                log::warn!("penetration query unsupported for collider {:?}", other);
                None
            }
        }
    }

    fn sweep_box(
        &self,
        start: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let shape = to_cuboid(half_extents);
        let transform = to_isometry(start);
        let velocity = to_vector(direction);
        let at_rest = Vector::zeros();

        let mut closest: Option<SweepHit> = None;

        for collider in &self.colliders {
            if !mask.intersects(collider.layer) {
                continue;
            }

            // Box casts don't report colliders the box already overlaps.
            if let Ok(true) =
                intersection_test(&transform, &shape, &collider.transform, collider.shape.as_ref())
            {
                continue;
            }

            let options = ShapeCastOptions {
                max_time_of_impact: max_distance,
                target_distance: 0.0,
                stop_at_penetration: true,
                compute_impact_geometry_on_penetration: true,
            };

            let hit = match cast_shapes(
                &transform,
                &velocity,
                &shape,
                &collider.transform,
                &at_rest,
                collider.shape.as_ref(),
                options,
            ) {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(_) => {
                    log::warn!("box sweep unsupported for collider {:?}", collider.handle);
                    continue;
                }
            };

            let distance = hit.time_of_impact;
            if distance > max_distance {
                continue;
            }

            let is_closer = closest.as_ref().map_or(true, |c| distance < c.distance);
            if is_closer {
                // Witness and normal are local to the (static) collider.
                let point = collider.transform * hit.witness2;
                let normal = collider.transform.rotation * hit.normal2.into_inner();

                closest = Some(SweepHit {
                    collider: collider.handle,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: to_vec3(&normal),
                    distance,
                });
            }
        }

        closest
    }

    fn raycast_collider(
        &self,
        collider: ColliderHandle,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RayHit> {
        let collider = self.get(collider)?;
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(to_point(origin), to_vector(direction));
        let hit = collider
            .shape
            .cast_ray_and_get_normal(&collider.transform, &ray, max_distance, true)?;

        let point = ray.point_at(hit.time_of_impact);
        Some(RayHit {
            point: Vec3::new(point.x, point.y, point.z),
            normal: to_vec3(&hit.normal),
            distance: hit.time_of_impact,
        })
    }
}

/// Minimum translation moving box `a` out of box `b`.
///
/// Ties between axes go to the first of X, Y, Z.
fn box_penetration(a_center: Vec3, a_half: Vec3, b_center: Vec3, b_half: Vec3) -> Option<Penetration> {
    let offset = a_center - b_center;
    let overlap = a_half + b_half - offset.abs();

    let (axis, depth) = [(Vec3::X, overlap.x), (Vec3::Y, overlap.y), (Vec3::Z, overlap.z)]
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    if depth.is_nan() || depth <= PENETRATION_TOLERANCE {
        return None;
    }

    let sign = if offset.dot(axis) < 0.0 { -1.0 } else { 1.0 };
    Some(Penetration {
        direction: axis * sign,
        distance: depth,
    })
}

// ============================================================================
// glam <-> parry conversions
// ============================================================================

fn to_isometry(center: Vec3) -> Isometry<Real> {
    Isometry::translation(center.x, center.y, center.z)
}

fn to_cuboid(half_extents: Vec3) -> Cuboid {
    Cuboid::new(to_vector(half_extents))
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec3 = Vec3::new(0.5, 1.0, 0.5);

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor with its top at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            LayerMask::WORLD,
        );

        // Wall whose near face is at x=9.5
        world.add_box(
            Vec3::new(10.0, 2.5, 0.0),
            Vec3::new(0.5, 2.5, 10.0),
            LayerMask::WORLD,
        );

        world
    }

    #[test]
    fn test_overlap_box() {
        let world = create_test_world();
        let mut buffer = OverlapBuffer::default();

        // Sunk 0.2 into the floor
        world.overlap_box(Vec3::new(0.0, 0.8, 0.0), HALF, LayerMask::ALL, &mut buffer);
        assert_eq!(buffer.len(), 1);

        // Well above everything
        world.overlap_box(Vec3::new(0.0, 5.0, 0.0), HALF, LayerMask::ALL, &mut buffer);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overlap_respects_layers() {
        let world = create_test_world();
        let mut buffer = OverlapBuffer::default();

        world.overlap_box(Vec3::new(0.0, 0.8, 0.0), HALF, LayerMask::DYNAMIC, &mut buffer);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_penetration_into_floor() {
        let world = create_test_world();
        let mut buffer = OverlapBuffer::default();
        world.overlap_box(Vec3::new(0.0, 0.8, 0.0), HALF, LayerMask::ALL, &mut buffer);

        let floor = buffer.as_slice()[0];
        let penetration = world
            .penetration(Vec3::new(0.0, 0.8, 0.0), HALF, floor)
            .expect("box is sunk into the floor");

        assert!((penetration.distance - 0.2).abs() < 1e-4);
        assert!(penetration.direction.normalize().dot(Vec3::Y) > 0.999);
    }

    #[test]
    fn test_penetration_at_many_depths() {
        let world = create_test_world();
        let floor = ColliderHandle(0);

        for depth in [0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5] {
            let penetration = world
                .penetration(Vec3::new(0.0, 1.0 - depth, 0.0), HALF, floor)
                .unwrap_or_else(|| panic!("no penetration at depth {depth}"));

            assert!((penetration.distance - depth).abs() < 1e-4, "depth {depth}");
            assert_eq!(penetration.direction, Vec3::Y, "depth {depth}");
        }
    }

    #[test]
    fn test_penetration_into_wall_side() {
        let world = create_test_world();

        // Front face 0.1 past the wall face at x=9.5
        let penetration = world
            .penetration(Vec3::new(9.1, 2.0, 0.0), HALF, ColliderHandle(1))
            .expect("box is inside the wall");

        assert!((penetration.distance - 0.1).abs() < 1e-4);
        assert_eq!(penetration.direction, -Vec3::X);
    }

    #[test]
    fn test_resting_contact_has_no_penetration() {
        let world = create_test_world();
        let floor = ColliderHandle(0);

        // Flush on the floor, and within the tolerance of it
        for x in [0.0, 0.37, -12.5] {
            assert!(world.penetration(Vec3::new(x, 1.0, 0.3), HALF, floor).is_none());
            assert!(world.penetration(Vec3::new(x, 1.0 - 0.5 * PENETRATION_TOLERANCE, 0.3), HALF, floor).is_none());
        }
    }

    #[test]
    fn test_penetration_into_ramp() {
        let mut world = CollisionWorld::new();
        let ramp = world
            .add_ramp(Vec3::new(0.0, 0.0, -5.0), Vec3::new(4.0, 4.0, 5.0), LayerMask::WORLD)
            .expect("valid hull");

        // Bottom corner at (2.5, 1.5) is 0.707 under the 45 degree face
        let penetration = world
            .penetration(Vec3::new(2.0, 2.5, 0.0), HALF, ramp)
            .expect("box corner is inside the ramp");

        assert!((penetration.distance - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-2);
        assert!(penetration.direction.normalize().dot(Vec3::new(-1.0, 1.0, 0.0).normalize()) > 0.99);
    }

    #[test]
    fn test_penetration_ignores_touching() {
        let world = create_test_world();
        let floor = ColliderHandle(0);

        // Resting exactly on the floor
        assert!(world.penetration(Vec3::new(0.0, 1.0, 0.0), HALF, floor).is_none());
        // Unknown collider
        assert!(world.penetration(Vec3::new(0.0, 0.8, 0.0), HALF, ColliderHandle(99)).is_none());
    }

    #[test]
    fn test_sweep_hits_wall() {
        let world = create_test_world();

        let hit = world
            .sweep_box(Vec3::new(0.0, 2.0, 0.0), HALF, Vec3::X, 20.0, LayerMask::ALL)
            .expect("wall is in the way");

        // Box front face starts at x=0.5, wall face at x=9.5
        assert!((hit.distance - 9.0).abs() < 1e-3);
        assert!((hit.point.x - 9.5).abs() < 1e-3);
        assert!(hit.normal.dot(-Vec3::X) > 0.99);
    }

    #[test]
    fn test_sweep_miss() {
        let world = create_test_world();

        let hit = world.sweep_box(Vec3::new(0.0, 2.0, 0.0), HALF, -Vec3::X, 20.0, LayerMask::ALL);
        assert!(hit.is_none());
    }

    #[test]
    fn test_sweep_ignores_initial_overlap() {
        let world = create_test_world();

        // Sunk into the floor and sweeping sideways: the floor is skipped
        let hit = world.sweep_box(Vec3::new(0.0, 0.8, 0.0), HALF, -Vec3::X, 5.0, LayerMask::ALL);
        assert!(hit.is_none());
    }

    #[test]
    fn test_raycast_collider() {
        let world = create_test_world();

        let hit = world
            .raycast_collider(ColliderHandle(0), Vec3::new(1.0, 0.001, 1.0), -Vec3::Y, 0.002)
            .expect("ray starts just above the floor");

        assert!(hit.point.y.abs() < 1e-4);
        assert!(hit.normal.dot(Vec3::Y) > 0.999);

        // The wall is not the floor
        assert!(world
            .raycast_collider(ColliderHandle(1), Vec3::new(1.0, 0.001, 1.0), -Vec3::Y, 0.002)
            .is_none());
    }

    #[test]
    fn test_dynamic_collider() {
        let mut world = create_test_world();
        let crate_box = world.add_box(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(0.5), LayerMask::DYNAMIC);
        let mut buffer = OverlapBuffer::default();

        world.overlap_box(Vec3::new(3.0, 2.0, 0.0), HALF, LayerMask::DYNAMIC, &mut buffer);
        assert!(buffer.is_empty());

        assert!(world.set_position(crate_box, Vec3::new(3.0, 2.0, 0.0)));
        world.overlap_box(Vec3::new(3.0, 2.0, 0.0), HALF, LayerMask::DYNAMIC, &mut buffer);
        assert_eq!(buffer.as_slice(), &[crate_box]);

        assert!(world.remove(crate_box));
        assert!(!world.remove(crate_box));
        assert_eq!(world.collider_count(), 2);
    }

    #[test]
    fn test_ramp_surface_normal() {
        let mut world = CollisionWorld::new();
        let ramp = world
            .add_ramp(Vec3::new(0.0, 0.0, -5.0), Vec3::new(4.0, 4.0, 5.0), LayerMask::WORLD)
            .expect("valid hull");

        // Straight down onto the 45 degree face at x=2
        let hit = world
            .raycast_collider(ramp, Vec3::new(2.0, 3.0, 0.0), -Vec3::Y, 5.0)
            .expect("ray hits the ramp");

        assert!((hit.point.y - 2.0).abs() < 1e-3);
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!(hit.normal.dot(expected) > 0.999);
    }
}
