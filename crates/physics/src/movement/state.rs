//! Movement states and the contact state they are derived from.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::MAX_GROUND_ANGLE;

/// What the character learned about its surroundings during the last move.
///
/// Recomputed from scratch by every move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactState {
    /// Normal of the ground below (up when there is none).
    pub ground_normal: Vec3,

    /// Angle between `ground_normal` and world up (degrees).
    pub ground_angle: f32,

    /// Whether the downward trace found a surface within reach.
    pub grounded: bool,

    /// Whether the upward trace found a surface within reach.
    pub touches_ceiling: bool,

    /// Push-out applied while resolving the horizontal part of the move.
    pub penetration: Vec3,

    /// Measured velocity: position change over the last tick divided by its duration.
    pub velocity: Vec3,
}

impl Default for ContactState {
    fn default() -> Self {
        Self {
            ground_normal: Vec3::Y,
            ground_angle: 0.0,
            grounded: false,
            touches_ceiling: false,
            penetration: Vec3::ZERO,
            velocity: Vec3::ZERO,
        }
    }
}

/// The three movement modes of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveState {
    /// Standing or walking on walkable ground.
    Walk,
    /// Sliding down ground steeper than the slope limit.
    Slope,
    /// Everything else, including leaning against near-vertical surfaces.
    #[default]
    Air,
}

impl MoveState {
    /// Pick the movement state for the given contact.
    ///
    /// - grounded, angle <= `slope_limit`: [`MoveState::Walk`]
    /// - grounded, `slope_limit` < angle <= 89, not rising: [`MoveState::Slope`]
    /// - otherwise [`MoveState::Air`]
    pub fn classify(contact: &ContactState, slope_limit: f32) -> Self {
        if !contact.grounded || contact.ground_angle > MAX_GROUND_ANGLE {
            return Self::Air;
        }

        if contact.ground_angle <= slope_limit {
            Self::Walk
        } else if contact.velocity.y <= 0.0 {
            Self::Slope
        } else {
            Self::Air
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(grounded: bool, angle: f32, vertical_velocity: f32) -> ContactState {
        ContactState {
            grounded,
            ground_angle: angle,
            velocity: Vec3::new(0.0, vertical_velocity, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_walkable_ground_is_walk() {
        assert_eq!(MoveState::classify(&contact(true, 30.0, 0.0), 45.0), MoveState::Walk);
        assert_eq!(MoveState::classify(&contact(true, 45.0, 3.0), 45.0), MoveState::Walk);
    }

    #[test]
    fn test_steep_ground_is_slope() {
        assert_eq!(MoveState::classify(&contact(true, 60.0, -1.0), 45.0), MoveState::Slope);
        assert_eq!(MoveState::classify(&contact(true, 60.0, 0.0), 45.0), MoveState::Slope);
        assert_eq!(MoveState::classify(&contact(true, 89.0, 0.0), 45.0), MoveState::Slope);
    }

    #[test]
    fn test_rising_on_steep_ground_is_air() {
        assert_eq!(MoveState::classify(&contact(true, 60.0, 0.5), 45.0), MoveState::Air);
    }

    #[test]
    fn test_near_vertical_is_air() {
        assert_eq!(MoveState::classify(&contact(true, 95.0, 0.0), 45.0), MoveState::Air);
        assert_eq!(MoveState::classify(&contact(true, 89.5, -1.0), 45.0), MoveState::Air);
    }

    #[test]
    fn test_not_grounded_is_air() {
        assert_eq!(MoveState::classify(&contact(false, 0.0, 0.0), 45.0), MoveState::Air);
    }
}
