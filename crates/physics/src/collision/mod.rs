//! Collision queries and depenetration for axis-aligned boxes.
//!
//! # Key Types
//!
//! - [`PhysicsQuery`]: The geometry questions the controller asks a backend
//! - [`CollisionWorld`]: parry3d-backed world implementing [`PhysicsQuery`]
//! - [`Trace`]: Output from a swept box trace
//! - [`CollisionResolver`]: Pushes boxes out of geometry, optionally in steps
//!
//! # Resolution Algorithm
//!
//! A move is resolved by placing the box at its destination and pushing it
//! out of everything it overlaps. Long moves are split into short steps so
//! that thin geometry is never stepped over.

mod layers;
mod query;
mod resolver;
mod trace;
mod world;

pub use layers::LayerMask;
pub use query::{
    ColliderHandle, OverlapBuffer, Penetration, PhysicsQuery, RayHit, SweepHit,
    DEFAULT_OVERLAP_CAPACITY,
};
pub use resolver::{BoxShape, CollisionResolver, ResolveResult, DEFAULT_STEP_LENGTH};
pub use trace::{trace_box, Trace, TraceHit, DEFAULT_CONTACT_OFFSET};
pub use world::{Collider, CollisionWorld, PENETRATION_TOLERANCE};
