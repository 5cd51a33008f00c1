//! Physics character controller.
//!
//! This is the main entry point for character movement. It owns a velocity,
//! feeds `velocity * dt` to a [`BoxCharacterController`] every tick, and then
//! steers the velocity according to the movement state the box ended up in.

use glam::Vec3;

use crate::collision::PhysicsQuery;

use super::box_controller::BoxCharacterController;
use super::config::{ConfigError, ControllerConfig};
use super::jump::JumpGate;
use super::state::MoveState;

/// Share of the mid-air acceleration used while sliding.
const SLOPE_ACCELERATION_FACTOR: f32 = 0.5;

/// How much of the upward speed survives hitting a ceiling, reversed.
const CEILING_BOUNCE: f32 = 0.25;

/// Velocity-driven character with walk, slope and air movement.
///
/// # Example
///
/// ```ignore
/// let mut controller = PhysicsCharacterController::new(ControllerConfig::default(), spawn);
///
/// // Each tick:
/// controller.walk(camera_relative_direction);
/// if jump_pressed {
///     controller.jump();
/// }
/// controller.update(&world, delta_time);
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsCharacterController {
    /// Movement configuration.
    config: ControllerConfig,

    /// The box being moved.
    character: BoxCharacterController,

    /// Velocity applied on the next tick.
    velocity: Vec3,

    /// Desired horizontal direction from input.
    walk_direction: Vec3,

    /// Ground-tangent direction computed by the last walking tick.
    ground_walk_direction: Vec3,

    state: MoveState,
    jump: JumpGate,
}

impl PhysicsCharacterController {
    /// Create a controller at `position`. Starts airborne and at rest.
    pub fn new(config: ControllerConfig, position: Vec3) -> Self {
        let character = BoxCharacterController::new(&config, position);
        Self::with_character(config, character)
    }

    /// Like [`new`](Self::new), but rejects invalid configuration.
    pub fn try_new(config: ControllerConfig, position: Vec3) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, position))
    }

    /// Drive an existing box character.
    pub fn with_character(config: ControllerConfig, character: BoxCharacterController) -> Self {
        Self {
            config,
            character,
            velocity: Vec3::ZERO,
            walk_direction: Vec3::ZERO,
            ground_walk_direction: Vec3::ZERO,
            state: MoveState::Air,
            jump: JumpGate::new(),
        }
    }

    /// Set the desired horizontal direction (camera-relative, any length).
    pub fn walk(&mut self, direction: Vec3) {
        self.walk_direction = direction;
    }

    /// Jump if standing on walkable ground and the jump gate is open.
    ///
    /// Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.character.is_grounded() || self.character.ground_angle() >= self.config.slope_limit {
            return false;
        }

        if !self.jump.try_pass(self.config.jump_cooldown) {
            return false;
        }

        self.velocity.y = self.config.jump_speed();
        log::debug!("jump: vertical speed={}", self.velocity.y);
        true
    }

    /// Add a velocity change directly, e.g. from an explosion or a jump pad.
    pub fn add_force(&mut self, velocity: Vec3) {
        self.velocity += velocity;
    }

    /// Advance one tick.
    ///
    /// Moves by the current velocity, picks the movement state from the
    /// resulting contact, then updates the velocity for that state.
    pub fn update<Q: PhysicsQuery + ?Sized>(&mut self, query: &Q, delta_time: f32) {
        self.character.step(query, self.velocity * delta_time, delta_time);

        self.update_movement_state();

        match self.state {
            MoveState::Walk => self.walk_move(delta_time),
            MoveState::Slope => self.slope_move(delta_time),
            MoveState::Air => self.air_move(delta_time),
        }

        self.jump.advance(delta_time);
    }

    // ========================================================================
    // State
    // ========================================================================

    fn update_movement_state(&mut self) {
        let contact = self.character.contact();
        let state = MoveState::classify(&contact, self.config.slope_limit);

        if state == self.state {
            return;
        }

        log::debug!(
            "movement state {:?} -> {:?} (angle={:.1}, grounded={})",
            self.state,
            state,
            contact.ground_angle,
            contact.grounded
        );

        self.state = state;

        // Keep the current motion when starting to slide.
        if state == MoveState::Slope {
            self.velocity = contact.velocity;
        }
    }

    // ========================================================================
    // Walk
    // ========================================================================

    fn walk_move(&mut self, delta_time: f32) {
        self.jump.unlock();

        let normal = self.character.ground_normal();
        let measured = self.character.velocity();
        let input = self.walk_direction.normalize_or_zero();

        let desired_direction = along_surface(input, normal);
        self.ground_walk_direction = desired_direction;

        let velocity_to_add = desired_direction * self.config.walk_speed - self.velocity;

        let acceleration = self.config.grounded_acceleration
            + turn_factor(measured, input) * self.config.mid_air_acceleration;

        self.velocity += velocity_to_add * delta_time * acceleration;

        self.dampen_penetration();
    }

    // ========================================================================
    // Air
    // ========================================================================

    fn air_move(&mut self, delta_time: f32) {
        let input = self.walk_direction.normalize_or_zero();
        let current_speed = self.velocity.dot(input);

        let mut measured = self.character.velocity();
        measured.y = 0.0;

        let acceleration = self.config.mid_air_acceleration
            + turn_factor(measured, input) * self.config.mid_air_acceleration;

        let speed_to_add = (self.config.mid_air_speed - current_speed)
            .min(acceleration * delta_time)
            .max(0.0);

        self.velocity += input * speed_to_add;
        self.velocity += self.config.scaled_gravity() * delta_time;

        self.dampen_penetration();

        if self.character.touches_ceiling() && self.velocity.y > 0.0 {
            self.velocity.y = (-self.velocity.y * CEILING_BOUNCE).min(0.0);
        }
    }

    // ========================================================================
    // Slope
    // ========================================================================

    fn slope_move(&mut self, delta_time: f32) {
        let normal = self.character.ground_normal();
        let input = self.walk_direction.normalize_or_zero();

        let mut desired_velocity = along_surface(input, normal) * self.config.walk_speed;
        // Steep slopes can be walked down and across, never up.
        if desired_velocity.y > 0.0 {
            desired_velocity.y = 0.0;
        }
        desired_velocity += along_surface(Vec3::NEG_Y, normal) * self.config.scaled_gravity().length();

        let velocity_to_add = desired_velocity - self.velocity;
        let acceleration = self.config.mid_air_acceleration * SLOPE_ACCELERATION_FACTOR;

        self.velocity += velocity_to_add * delta_time * acceleration;

        self.dampen_penetration();
    }

    /// Remove part of the velocity that keeps pushing into the wall the last
    /// move was pushed out of.
    fn dampen_penetration(&mut self) {
        let mut penetration = self.character.penetration().normalize_or_zero();
        penetration.y = 0.0;

        self.velocity -= self.velocity.dot(penetration) * penetration * self.config.slow_down_penetration_power;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current movement state.
    #[inline]
    pub fn state(&self) -> MoveState {
        self.state
    }

    /// Velocity that will be applied on the next tick.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current center position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.character.position()
    }

    /// The box being moved.
    #[inline]
    pub fn character(&self) -> &BoxCharacterController {
        &self.character
    }

    /// Movement configuration.
    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Gravity after applying the gravity scale.
    #[inline]
    pub fn scaled_gravity(&self) -> Vec3 {
        self.config.scaled_gravity()
    }

    /// Ground-tangent direction from the last walking tick.
    #[inline]
    pub fn ground_walk_direction(&self) -> Vec3 {
        self.ground_walk_direction
    }

    /// Jump cooldown and lock.
    #[inline]
    pub fn jump_gate(&self) -> &JumpGate {
        &self.jump
    }
}

/// Project `direction` onto the plane with normal `normal`.
///
/// The result is not renormalised: it shrinks as `direction` tilts towards
/// the normal.
fn along_surface(direction: Vec3, normal: Vec3) -> Vec3 {
    normal.cross(direction.cross(normal))
}

/// Acceleration boost for turning: 0 when input follows the current motion,
/// 1 when perpendicular (or standing still), 2 when reversing.
fn turn_factor(velocity: Vec3, input: Vec3) -> f32 {
    2.0 - (velocity.normalize_or_zero().dot(input) + 1.0)
}

// ============================================================================
// Tests
// ============================================================================
