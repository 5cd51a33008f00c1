//! Depenetration of a box against the world.
//!
//! [`CollisionResolver::resolve`] pushes a box out of everything it overlaps
//! at one position. [`CollisionResolver::step_resolve`] walks a displacement
//! in short steps and resolves at each one, so fast movement cannot skip
//! over thin geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::layers::LayerMask;
use super::query::{ColliderHandle, OverlapBuffer, PhysicsQuery, DEFAULT_OVERLAP_CAPACITY};

/// Default length of one resolution step.
pub const DEFAULT_STEP_LENGTH: f32 = 0.1;

/// An axis-aligned box: fixed half extents, no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    /// Half-size in each axis.
    pub half_extents: Vec3,
    /// The box's own collider in the world, skipped by resolution.
    pub collider: Option<ColliderHandle>,
}

impl BoxShape {
    /// A box that is not itself registered in the world.
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            collider: None,
        }
    }

    /// A box that also exists as `collider` in the world.
    pub fn with_collider(half_extents: Vec3, collider: ColliderHandle) -> Self {
        Self {
            half_extents,
            collider: Some(collider),
        }
    }

    /// Full size of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolveResult {
    /// Where the box ended up.
    pub position: Vec3,
    /// Push-out applied by the resolution.
    ///
    /// For [`CollisionResolver::resolve`] this is the push from the last
    /// overlap processed, not a sum over all of them. For
    /// [`CollisionResolver::step_resolve`] it is the sum of each step's value.
    pub penetration: Vec3,
}

/// Box depenetration against a [`PhysicsQuery`].
///
/// Owns the overlap scratch buffer, so a resolver handles one resolution at
/// a time. Give each character its own resolver.
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    overlaps: OverlapBuffer,
}

impl CollisionResolver {
    /// Create a resolver that considers at most `capacity` overlaps per pass.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            overlaps: OverlapBuffer::with_capacity(capacity),
        }
    }

    /// Create a resolver with the default overlap capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OVERLAP_CAPACITY)
    }

    /// Maximum overlaps considered per pass.
    pub fn capacity(&self) -> usize {
        self.overlaps.capacity()
    }

    /// Push `shape` placed at `origin` out of every collider it overlaps.
    ///
    /// Overlaps are processed in the order the query reports them. Each push
    /// moves the working position before the next penetration is measured,
    /// and replaces the reported penetration vector.
    pub fn resolve<Q: PhysicsQuery + ?Sized>(
        &mut self,
        query: &Q,
        shape: &BoxShape,
        origin: Vec3,
        mask: LayerMask,
    ) -> ResolveResult {
        let mut position = origin;
        let mut penetration = Vec3::ZERO;

        query.overlap_box(origin, shape.half_extents, mask, &mut self.overlaps);

        for &other in self.overlaps.as_slice() {
            if shape.collider == Some(other) {
                continue;
            }

            if let Some(contact) = query.penetration(position, shape.half_extents, other) {
                let push = contact.direction.normalize_or_zero() * contact.distance;
                position += push;
                penetration = push;

                log::trace!("depenetrated from {:?} by {:?}", other, push);
            }
        }

        ResolveResult {
            position,
            penetration,
        }
    }

    /// Move `shape` from `origin` by `delta`, resolving along the way.
    ///
    /// Displacements no longer than `step_length` are resolved once at the
    /// destination. Longer ones are split into `floor(|delta| / step_length)`
    /// equal steps, each resolved in turn, with the resolved position carried
    /// into the next step and the step penetrations summed.
    ///
    /// A non-finite `delta` is dropped: the box is resolved where it stands.
    pub fn step_resolve<Q: PhysicsQuery + ?Sized>(
        &mut self,
        query: &Q,
        shape: &BoxShape,
        origin: Vec3,
        delta: Vec3,
        mask: LayerMask,
        step_length: f32,
    ) -> ResolveResult {
        if !delta.is_finite() {
            log::warn!("ignoring non-finite displacement {:?}", delta);
            return self.resolve(query, shape, origin, mask);
        }

        let distance = delta.length();

        if distance <= step_length {
            return self.resolve(query, shape, origin + delta, mask);
        }

        // distance > step_length, so there is at least one step.
        let steps = (distance / step_length) as u32;
        let step_delta = delta * (1.0 / steps as f32);

        let mut position = origin;
        let mut penetration = Vec3::ZERO;

        for _ in 0..steps {
            let step = self.resolve(query, shape, position + step_delta, mask);
            position = step.position;
            penetration += step.penetration;
        }

        ResolveResult {
            position,
            penetration,
        }
    }
}
