//! Character movement.
//!
//! This module implements a velocity-driven box character with:
//!
//! - Walking on ground up to a slope limit
//! - Sliding down steeper slopes
//! - Air control, gravity and ceiling bumps
//! - Gated jumping
//!
//! # Design
//!
//! Movement is split in two layers. The [`BoxCharacterController`] turns a
//! displacement into a collision-free position and a [`ContactState`]. The
//! [`PhysicsCharacterController`] owns the velocity, feeds it to the box each
//! tick, and steers it according to the resulting [`MoveState`].
//!
//! Every step function takes the tick duration explicitly, so fixed-dt runs
//! are reproducible.

mod box_controller;
mod config;
mod controller;
mod jump;
mod state;

pub use box_controller::BoxCharacterController;
pub use config::{ConfigError, ControllerConfig, DEFAULT_WALL_EPSILON, MAX_GROUND_ANGLE};
pub use controller::PhysicsCharacterController;
pub use jump::JumpGate;
pub use state::{ContactState, MoveState};
