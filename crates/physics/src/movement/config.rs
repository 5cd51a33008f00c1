//! Character controller configuration.
//!
//! All tunables are grouped here for easy tuning. Values use metric units
//! (meters, seconds) and degrees for angles.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::{LayerMask, DEFAULT_CONTACT_OFFSET, DEFAULT_OVERLAP_CAPACITY, DEFAULT_STEP_LENGTH};

/// Slopes steeper than this are walls, whatever the slope limit says.
pub const MAX_GROUND_ANGLE: f32 = 89.0;

/// Default distance within which a ground or ceiling hit counts as touching.
pub const DEFAULT_WALL_EPSILON: f32 = 0.1;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("collider size must be positive on every axis, got {0}")]
    ColliderSize(Vec3),

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("slope limit must be within 0..=90 degrees, got {0}")]
    SlopeLimit(f32),

    #[error("contact offset must be within 0..1, got {0}")]
    ContactOffset(f32),

    #[error("gravity must point down (negative y), got {0}")]
    Gravity(Vec3),

    #[error("overlap capacity must be at least 1")]
    OverlapCapacity,
}

/// Configuration for a box character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // ========================================================================
    // Shape
    // ========================================================================
    /// Full size of the character's box collider (meters).
    pub collider_size: Vec3,

    /// Extra scale applied to the box when tracing.
    pub collider_scale: f32,

    /// Layers the character collides with.
    pub layer_mask: LayerMask,

    // ========================================================================
    // Movement
    // ========================================================================
    /// Steepest ground angle that still counts as walkable (degrees).
    pub slope_limit: f32,

    /// Target ground speed (meters/second).
    pub walk_speed: f32,

    /// Ground acceleration factor (1/second).
    pub grounded_acceleration: f32,

    /// Target air speed along the input direction (meters/second).
    pub mid_air_speed: f32,

    /// Air acceleration (meters/second²). Also boosts sharp turns on the ground.
    pub mid_air_acceleration: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// World gravity (meters/second²).
    pub gravity: Vec3,

    /// Multiplier on `gravity` for this character.
    pub gravity_scale: f32,

    /// Jump height factor. Jump speed is `sqrt(gravity_scale * |gravity.y| * jump_height)`.
    pub jump_height: f32,

    /// Minimum time between jumps (seconds).
    pub jump_cooldown: f32,

    /// How much of the velocity pushing into a wall is removed each tick (0..1).
    pub slow_down_penetration_power: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Longest displacement resolved in one go (meters).
    pub step_length: f32,

    /// Distance within which ground and ceiling hits count as touching (meters).
    pub wall_epsilon: f32,

    /// Fraction the box is shrunk by when tracing.
    pub contact_offset: f32,

    /// Maximum overlaps considered per resolution pass.
    pub overlap_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collider_size: Vec3::new(1.0, 2.0, 1.0),
            collider_scale: 1.0,
            layer_mask: LayerMask::ALL,

            slope_limit: 45.0,
            walk_speed: 6.0,
            grounded_acceleration: 8.0,
            mid_air_speed: 6.0,
            mid_air_acceleration: 2.0,

            gravity: Vec3::new(0.0, -9.81, 0.0),
            gravity_scale: 2.8,
            jump_height: 3.0,
            jump_cooldown: 0.2,
            slow_down_penetration_power: 0.5,

            step_length: DEFAULT_STEP_LENGTH,
            wall_epsilon: DEFAULT_WALL_EPSILON,
            contact_offset: DEFAULT_CONTACT_OFFSET,
            overlap_capacity: DEFAULT_OVERLAP_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Half extents of the character's box.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.collider_size * 0.5
    }

    /// Gravity after applying `gravity_scale`.
    #[inline]
    pub fn scaled_gravity(&self) -> Vec3 {
        self.gravity * self.gravity_scale
    }

    /// Vertical speed a jump starts with. Zero unless gravity points down.
    #[inline]
    pub fn jump_speed(&self) -> f32 {
        (self.gravity_scale * -self.gravity.y * self.jump_height).max(0.0).sqrt()
    }

    /// Check every value for sanity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.collider_size;
        if !(size.x > 0.0 && size.y > 0.0 && size.z > 0.0) {
            return Err(ConfigError::ColliderSize(size));
        }

        positive("collider_scale", self.collider_scale)?;
        positive("step_length", self.step_length)?;
        positive("wall_epsilon", self.wall_epsilon)?;
        positive("gravity_scale", self.gravity_scale)?;

        non_negative("walk_speed", self.walk_speed)?;
        non_negative("grounded_acceleration", self.grounded_acceleration)?;
        non_negative("mid_air_speed", self.mid_air_speed)?;
        non_negative("mid_air_acceleration", self.mid_air_acceleration)?;
        non_negative("jump_height", self.jump_height)?;
        non_negative("jump_cooldown", self.jump_cooldown)?;
        non_negative("slow_down_penetration_power", self.slow_down_penetration_power)?;

        if !(self.gravity.is_finite() && self.gravity.y < 0.0) {
            return Err(ConfigError::Gravity(self.gravity));
        }

        if !(0.0..=90.0).contains(&self.slope_limit) {
            return Err(ConfigError::SlopeLimit(self.slope_limit));
        }

        if !(0.0..1.0).contains(&self.contact_offset) {
            return Err(ConfigError::ContactOffset(self.contact_offset));
        }

        if self.overlap_capacity == 0 {
            return Err(ConfigError::OverlapCapacity);
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.half_extents(), Vec3::new(0.5, 1.0, 0.5));
        assert!((config.scaled_gravity().y + 9.81 * 2.8).abs() < 1e-5);
    }

    #[test]
    fn test_jump_speed() {
        let config = ControllerConfig::default();
        let expected = (2.8_f32 * 9.81 * 3.0).sqrt();
        assert!((config.jump_speed() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ControllerConfig {
            collider_size: Vec3::new(1.0, 0.0, 1.0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ColliderSize(_))));

        let config = ControllerConfig {
            step_length: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive { name: "step_length", value: 0.0 })
        );

        let config = ControllerConfig {
            slope_limit: 120.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SlopeLimit(120.0)));

        let config = ControllerConfig {
            contact_offset: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ContactOffset(1.0)));

        let config = ControllerConfig {
            overlap_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::OverlapCapacity));
    }

    #[test]
    fn test_upward_gravity() {
        let config = ControllerConfig {
            gravity: Vec3::new(0.0, 9.81, 0.0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Gravity(config.gravity)));
        assert_eq!(config.jump_speed(), 0.0);

        let config = ControllerConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Gravity(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{ "walk_speed": 9.0, "slope_limit": 30.0 }"#).unwrap();

        assert_eq!(config.walk_speed, 9.0);
        assert_eq!(config.slope_limit, 30.0);
        assert_eq!(config.step_length, DEFAULT_STEP_LENGTH);
        assert!(config.validate().is_ok());
    }
}
