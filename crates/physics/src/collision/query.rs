//! The physics-query capability consumed by the character controller.
//!
//! The controller never talks to a concrete physics backend. Anything that
//! can answer these four questions can host a character:
//!
//! - which colliders overlap a box,
//! - how far a box penetrates one of them,
//! - what a box hits when swept along a line,
//! - what a ray hits on one specific collider.
//!
//! [`CollisionWorld`](super::CollisionWorld) is the parry3d implementation
//! shipped with this crate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::layers::LayerMask;

/// Default number of overlaps a single [`OverlapBuffer`] can hold.
pub const DEFAULT_OVERLAP_CAPACITY: usize = 128;

/// Opaque handle to a collider owned by a physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderHandle(pub u32);

/// Minimum translation separating a box from a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penetration {
    /// Direction to move the box in. Not guaranteed to be unit length.
    pub direction: Vec3,
    /// Distance to move along `direction` (> 0).
    pub distance: f32,
}

/// First blocking contact of a swept box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepHit {
    /// Collider that was hit.
    pub collider: ColliderHandle,
    /// World-space contact point on the hit collider.
    pub point: Vec3,
    /// Outward surface normal of the hit collider.
    pub normal: Vec3,
    /// Distance travelled along the sweep direction before contact.
    pub distance: f32,
}

/// Ray hit against a single collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
    /// Distance along the ray.
    pub distance: f32,
}

/// Fixed-capacity scratch list for overlap results.
///
/// The backing storage is allocated once and reused by every query, so the
/// hot path never allocates. Pushes past capacity are dropped silently: a
/// box touching more colliders than the buffer holds only resolves against
/// the first `capacity` of them.
///
/// A buffer is exclusively borrowed for the duration of a query. Callers that
/// resolve in parallel need one buffer each.
#[derive(Debug, Clone)]
pub struct OverlapBuffer {
    handles: Vec<ColliderHandle>,
    capacity: usize,
    dropped: usize,
}

impl OverlapBuffer {
    /// Create an empty buffer holding at most `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Forget the previous query's results.
    #[inline]
    pub fn clear(&mut self) {
        self.handles.clear();
        self.dropped = 0;
    }

    /// Record an overlapping collider.
    ///
    /// Returns `false` (and records nothing) once the buffer is full.
    #[inline]
    pub fn push(&mut self, handle: ColliderHandle) -> bool {
        if self.is_full() {
            self.dropped += 1;
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Whether no more handles can be recorded.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.handles.len() >= self.capacity
    }

    /// Maximum number of handles this buffer records.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of overlaps that were dropped because the buffer was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of recorded handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// The recorded handles, in the order the backend reported them.
    #[inline]
    pub fn as_slice(&self) -> &[ColliderHandle] {
        &self.handles
    }
}

impl Default for OverlapBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OVERLAP_CAPACITY)
    }
}

/// Geometry queries over a layer-filtered set of colliders.
///
/// All boxes are axis-aligned and described by their center and half extents.
pub trait PhysicsQuery {
    /// Collect every collider on `mask` overlapping the box into `out`.
    ///
    /// Implementations must clear `out` first and must stop recording once it
    /// is full.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, mask: LayerMask, out: &mut OverlapBuffer);

    /// Penetration of the box into `other`, or `None` if they are separated,
    /// only touching, or `other` no longer exists.
    fn penetration(&self, center: Vec3, half_extents: Vec3, other: ColliderHandle) -> Option<Penetration>;

    /// Sweep the box from `start` along the unit vector `direction` for at
    /// most `max_distance`, returning the closest blocking hit on `mask`.
    fn sweep_box(
        &self,
        start: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit>;

    /// Cast a ray against a single collider.
    fn raycast_collider(
        &self,
        collider: ColliderHandle,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RayHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_buffer_truncates() {
        let mut buffer = OverlapBuffer::with_capacity(2);

        assert!(buffer.push(ColliderHandle(0)));
        assert!(buffer.push(ColliderHandle(1)));
        assert!(buffer.is_full());
        assert!(!buffer.push(ColliderHandle(2)));

        assert_eq!(buffer.as_slice(), &[ColliderHandle(0), ColliderHandle(1)]);
        assert_eq!(buffer.dropped(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.dropped(), 0);
        assert_eq!(buffer.capacity(), 2);
    }
}
