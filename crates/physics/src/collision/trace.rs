//! Swept box traces with contact-offset padding and normal refinement.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::layers::LayerMask;
use super::query::{ColliderHandle, PhysicsQuery};

/// Default fraction the traced box is shrunk by.
pub const DEFAULT_CONTACT_OFFSET: f32 = 0.01;

/// How far behind the hit point the refinement ray starts.
const NORMAL_RAY_BACKOFF: f32 = 0.001;

/// Length of the refinement ray.
const NORMAL_RAY_LENGTH: f32 = 0.002;

/// Largest fraction a hit can report, keeping `1.0` reserved for "no hit".
const MAX_HIT_FRACTION: f32 = 1.0 - f32::EPSILON;

/// What a trace ran into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceHit {
    /// Collider that blocked the trace.
    pub collider: ColliderHandle,
    /// World-space contact point on the collider.
    pub point: Vec3,
    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
    /// Distance travelled before contact.
    pub distance: f32,
}

/// Result of sweeping a box from a start position towards a destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Where the sweep began.
    pub start: Vec3,

    /// Where the sweep was headed.
    pub end: Vec3,

    /// How far along the padded sweep the hit happened.
    ///
    /// - `1.0` = nothing in the way
    /// - `0.0` = blocked immediately
    pub fraction: f32,

    /// Contact details. `None` exactly when `fraction == 1.0`.
    pub hit: Option<TraceHit>,
}

impl Trace {
    /// A trace that reached its destination.
    pub fn no_hit(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            fraction: 1.0,
            hit: None,
        }
    }

    /// Check if this trace hit something.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Hit normal, defaulting to up when nothing was hit.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.hit.map_or(Vec3::Y, |hit| hit.normal)
    }
}

/// Sweep a box from `start` towards `destination`.
///
/// The box is shrunk by `contact_offset` (a fraction of its size) so that
/// surfaces it is resting against do not register as hits, and the sweep is
/// lengthened by `sqrt(2) * contact_offset` so the destination is still
/// reachable despite the shrink. `collider_scale` scales the shrunk extents.
///
/// Box-cast normals are unreliable near edges and corners, so after a hit a
/// short ray is cast against the same collider along the sweep direction,
/// starting just behind the contact point. If it hits, its normal replaces
/// the sweep's.
pub fn trace_box<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    start: Vec3,
    destination: Vec3,
    half_extents: Vec3,
    mask: LayerMask,
    contact_offset: f32,
    collider_scale: f32,
) -> Trace {
    let padding = (contact_offset * contact_offset * 2.0).sqrt();
    let direction = (destination - start).normalize_or_zero();
    let max_distance = start.distance(destination) + padding;
    let extents = half_extents * (1.0 - contact_offset) * collider_scale;

    let Some(sweep) = query.sweep_box(start, extents, direction, max_distance, mask) else {
        return Trace::no_hit(start, destination);
    };

    let mut normal = sweep.normal;
    if let Some(refined) = query.raycast_collider(
        sweep.collider,
        sweep.point - direction * NORMAL_RAY_BACKOFF,
        direction,
        NORMAL_RAY_LENGTH,
    ) {
        normal = refined.normal;
    }

    Trace {
        start,
        end: destination,
        fraction: (sweep.distance / max_distance).min(MAX_HIT_FRACTION),
        hit: Some(TraceHit {
            collider: sweep.collider,
            point: sweep.point,
            normal,
            distance: sweep.distance,
        }),
    }
}
