//! Boxstep Physics
//!
//! An axis-aligned box character controller for real-time 3D movement.
//! It resolves a desired displacement against arbitrary geometry, works out
//! whether the character stands on ground or touches a ceiling, and runs a
//! walk/slope/air state machine that turns input, gravity and wall contact
//! into a velocity.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: Box traces and depenetration over any [`PhysicsQuery`]
//! - **Movement**: Uses collision results to implement character movement
//!
//! # Design Principles
//!
//! 1. **Explicit time**: Every update takes `dt`; nothing reads a global clock
//! 2. **No hidden state**: Scratch buffers are owned by the character using them
//! 3. **Backend agnostic**: Movement code only sees the [`PhysicsQuery`] trait

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    BoxShape, ColliderHandle, CollisionResolver, CollisionWorld, LayerMask, PhysicsQuery,
    ResolveResult, Trace,
};
pub use movement::{
    BoxCharacterController, ConfigError, ContactState, ControllerConfig, MoveState,
    PhysicsCharacterController,
};
