//! Collision shapes
//!
//! Shapes are stored in body-local space. The owning body supplies the
//! position and rotation when a world-space query is made.

use marble_math::Vec3;

/// A box described by its half extents along the local axes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub half_extents: Vec3,
}

impl Cuboid {
    /// Create a cuboid from half extents
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Create a cuboid from its full size (width, height, depth)
    pub fn from_size(size: Vec3) -> Self {
        Self::new(size * 0.5)
    }

    /// Check if a local-space point is inside or on the box
    pub fn contains(&self, local: Vec3) -> bool {
        let a = local.abs();
        a.x <= self.half_extents.x && a.y <= self.half_extents.y && a.z <= self.half_extents.z
    }

    /// Get the closest local-space point inside or on the box
    pub fn closest_point(&self, local: Vec3) -> Vec3 {
        local.clamp_components(-self.half_extents, self.half_extents)
    }
}

/// A ring lying in the local XY plane, with its hole facing local Z
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Torus {
    /// Distance from the center to the middle of the tube
    pub major_radius: f32,
    /// Radius of the tube
    pub minor_radius: f32,
}

impl Torus {
    pub fn new(major_radius: f32, minor_radius: f32) -> Self {
        Self {
            major_radius,
            minor_radius,
        }
    }

    /// Closest point on the tube's center circle to a local-space point
    pub fn closest_on_ring(&self, local: Vec3) -> Vec3 {
        let planar = Vec3::new(local.x, local.y, 0.0);
        let dir = if planar.length_squared() > 1e-12 {
            planar.normalized()
        } else {
            // Any point on the ring is equally close from the axis
            Vec3::X
        };
        dir * self.major_radius
    }

    /// Signed distance from a local-space point to the torus surface
    pub fn signed_distance(&self, local: Vec3) -> f32 {
        (local - self.closest_on_ring(local)).length() - self.minor_radius
    }
}

/// Collider enum for storing different collision shape types
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    Ball { radius: f32 },
    Cuboid(Cuboid),
    /// Exact ring shape (no bounding box approximation)
    Torus(Torus),
}

impl Collider {
    /// Ball collider
    pub fn ball(radius: f32) -> Self {
        Collider::Ball { radius }
    }

    /// Cuboid collider from half extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Collider::Cuboid(Cuboid::new(Vec3::new(hx, hy, hz)))
    }

    /// Torus collider
    pub fn torus(major_radius: f32, minor_radius: f32) -> Self {
        Collider::Torus(Torus::new(major_radius, minor_radius))
    }

    /// Volume of the shape
    pub fn volume(&self) -> f32 {
        use std::f32::consts::PI;
        match self {
            Collider::Ball { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            Collider::Cuboid(c) => {
                let h = c.half_extents;
                8.0 * h.x * h.y * h.z
            }
            Collider::Torus(t) => 2.0 * PI * PI * t.major_radius * t.minor_radius.powi(2),
        }
    }

    /// Mass and scalar moment of inertia for a uniform density
    ///
    /// Cuboid and torus use the mean of their principal moments.
    pub fn mass_properties(&self, density: f32) -> (f32, f32) {
        let mass = self.volume() * density;
        let inertia = match self {
            Collider::Ball { radius } => 0.4 * mass * radius * radius,
            Collider::Cuboid(c) => {
                let s = c.half_extents * 2.0;
                let (x2, y2, z2) = (s.x * s.x, s.y * s.y, s.z * s.z);
                mass / 12.0 * ((y2 + z2) + (x2 + z2) + (x2 + y2)) / 3.0
            }
            Collider::Torus(t) => {
                let (r2, a2) = (t.major_radius.powi(2), t.minor_radius.powi(2));
                let axial = mass * (r2 + 0.75 * a2);
                let diametral = mass * (0.5 * r2 + 0.625 * a2);
                (axial + 2.0 * diametral) / 3.0
            }
        };
        (mass, inertia)
    }

    /// Radius of a sphere centered on the body that contains the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Collider::Ball { radius } => *radius,
            Collider::Cuboid(c) => c.half_extents.length(),
            Collider::Torus(t) => t.major_radius + t.minor_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_from_size() {
        let c = Cuboid::from_size(Vec3::new(4.0, 0.2, 4.0));
        assert_eq!(c.half_extents, Vec3::new(2.0, 0.1, 2.0));
    }

    #[test]
    fn test_cuboid_contains_and_closest_point() {
        let c = Cuboid::new(Vec3::splat(1.0));
        assert!(c.contains(Vec3::new(0.5, -0.5, 1.0)));
        assert!(!c.contains(Vec3::new(1.1, 0.0, 0.0)));
        assert_eq!(c.closest_point(Vec3::new(3.0, 0.5, -2.0)), Vec3::new(1.0, 0.5, -1.0));
    }

    #[test]
    fn test_torus_signed_distance() {
        let t = Torus::new(1.0, 0.3);
        // Center of the tube
        assert!((t.signed_distance(Vec3::new(1.0, 0.0, 0.0)) + 0.3).abs() < 0.0001);
        // Middle of the hole is major - minor away from the surface
        assert!((t.signed_distance(Vec3::ZERO) - 0.7).abs() < 0.0001);
        // In front of the hole along the axis
        let d = t.signed_distance(Vec3::new(0.0, 0.0, 1.0));
        assert!((d - (2.0f32.sqrt() - 0.3)).abs() < 0.0001);
    }

    #[test]
    fn test_ball_mass_uses_density() {
        let (mass, inertia) = Collider::ball(0.3).mass_properties(1.0);
        let expected = 4.0 / 3.0 * std::f32::consts::PI * 0.027;
        assert!((mass - expected).abs() < 0.0001);
        assert!((inertia - 0.4 * expected * 0.09).abs() < 0.0001);
    }

    #[test]
    fn test_bounding_radius() {
        assert_eq!(Collider::ball(0.5).bounding_radius(), 0.5);
        assert!((Collider::torus(1.0, 0.3).bounding_radius() - 1.3).abs() < 0.0001);
    }
}
