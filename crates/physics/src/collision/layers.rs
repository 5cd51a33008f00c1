//! Layer masks for collision filtering.
//!
//! Every collider in the world belongs to one or more layers, and every query
//! carries a mask of the layers it wants to see. A collider is visible to a
//! query when the two sets intersect.

use serde::{Deserialize, Serialize};

/// A set of up to 32 collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// No layers. Queries with this mask never hit anything.
    pub const NONE: Self = Self(0);

    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Static level geometry - floors, walls, ramps.
    pub const WORLD: Self = Self(1 << 0);

    /// Moving geometry - platforms, doors, pushed crates.
    pub const DYNAMIC: Self = Self(1 << 1);

    /// Other characters.
    pub const CHARACTER: Self = Self(1 << 2);

    /// Check if every layer of `other` is in this set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any layer is shared with `other`.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_operations() {
        let mask = LayerMask::WORLD | LayerMask::DYNAMIC;

        assert!(mask.contains(LayerMask::WORLD));
        assert!(mask.intersects(LayerMask::DYNAMIC));
        assert!(!mask.intersects(LayerMask::CHARACTER));
        assert!(!mask.contains(LayerMask::ALL));
        assert_eq!(mask & LayerMask::DYNAMIC, LayerMask::DYNAMIC);
    }

    #[test]
    fn test_empty_and_full_masks() {
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
        assert!(LayerMask::ALL.contains(LayerMask::CHARACTER));
        assert_eq!(LayerMask::default(), LayerMask::ALL);
    }
}
