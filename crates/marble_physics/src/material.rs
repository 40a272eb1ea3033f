//! Physical material properties for collision response

/// Physical material properties for collision response
///
/// Materials define how objects interact during collisions, including
/// friction (how much objects resist sliding) and restitution (bounciness).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = frictionless, 1.0 = grippy)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    /// The player's marble: full grip so it rolls instead of sliding
    pub const MARBLE: Self = Self {
        friction: 1.0,
        restitution: 0.0,
    };

    /// Moving obstacles and side walls: slippery with a slight bounce
    pub const OBSTACLE: Self = Self {
        friction: 0.0,
        restitution: 0.2,
    };

    /// Track surface
    pub const FLOOR: Self = Self {
        friction: 1.0,
        restitution: 0.2,
    };

    /// Create a new physics material with custom friction and restitution
    ///
    /// Values are clamped to the range [0.0, 1.0].
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Combine two materials for collision response
    ///
    /// Uses geometric mean for friction and maximum for restitution
    /// (most bouncy surface wins).
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_values() {
        let material = PhysicsMaterial::new(1.5, -0.5);
        assert_eq!(material.friction, 1.0);
        assert_eq!(material.restitution, 0.0);
    }

    #[test]
    fn test_marble_on_floor_keeps_grip() {
        let combined = PhysicsMaterial::MARBLE.combine(&PhysicsMaterial::FLOOR);
        assert_eq!(combined.friction, 1.0);
        assert_eq!(combined.restitution, 0.2);
    }

    #[test]
    fn test_obstacles_are_frictionless() {
        let combined = PhysicsMaterial::MARBLE.combine(&PhysicsMaterial::OBSTACLE);
        assert_eq!(combined.friction, 0.0);
    }

    #[test]
    fn test_combine_is_commutative() {
        let a = PhysicsMaterial::new(0.3, 0.5);
        let b = PhysicsMaterial::new(0.7, 0.2);

        let ab = a.combine(&b);
        let ba = b.combine(&a);

        assert!((ab.friction - ba.friction).abs() < 0.0001);
        assert_eq!(ab.restitution, ba.restitution);
    }
}
