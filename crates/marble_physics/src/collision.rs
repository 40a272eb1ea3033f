//! Collision detection for the marble against track geometry
//!
//! Every narrow-phase test here takes a sphere (the only dynamic shape in a
//! race) against another shape placed at a world pose. Also provides collision
//! filtering via layer masks.

use bitflags::bitflags;

use crate::body::RigidBody;
use crate::shapes::{Collider, Cuboid, Torus};
use marble_math::{Quat, Vec3};

bitflags! {
    /// Collision layers for filtering which objects can collide
    ///
    /// Each layer is a bit in a 32-bit mask. Objects can belong to multiple layers
    /// and can define which layers they collide with via a collision mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// The player's marble
        const PLAYER = 1 << 1;
        /// Moving obstacles
        const OBSTACLE = 1 << 2;
        /// Track segments and the bounds floor
        const FLOOR = 1 << 3;
        /// Side and end walls
        const WALL = 1 << 4;
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if:
/// - (A.layer & B.mask) != 0, AND
/// - (B.layer & A.mask) != 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// The marble collides with everything except other marbles
    pub fn player() -> Self {
        Self {
            layer: CollisionLayer::PLAYER,
            mask: CollisionLayer::ALL & !CollisionLayer::PLAYER,
        }
    }

    pub fn obstacle() -> Self {
        Self {
            layer: CollisionLayer::OBSTACLE,
            mask: CollisionLayer::ALL,
        }
    }

    pub fn floor() -> Self {
        Self {
            layer: CollisionLayer::FLOOR,
            mask: CollisionLayer::ALL,
        }
    }

    pub fn wall() -> Self {
        Self {
            layer: CollisionLayer::WALL,
            mask: CollisionLayer::ALL,
        }
    }

    /// Generic static geometry
    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Contact point on the surface of the second shape (world space)
    pub point: Vec3,
    /// Normal pointing from the second shape toward the sphere
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }
}

/// Test sphere vs ball
pub fn sphere_vs_ball(center: Vec3, radius: f32, other: Vec3, other_radius: f32) -> Option<Contact> {
    let delta = center - other;
    let dist = delta.length();
    let penetration = radius + other_radius - dist;
    if penetration <= 0.0 {
        return None;
    }
    let normal = if dist > 0.0001 { delta / dist } else { Vec3::Y };
    Some(Contact::new(other + normal * other_radius, normal, penetration))
}

/// Test sphere vs an oriented box
///
/// The sphere is moved into the box's local frame, tested against the
/// axis-aligned box there, and the contact is rotated back out.
pub fn sphere_vs_cuboid(
    center: Vec3,
    radius: f32,
    cuboid: &Cuboid,
    position: Vec3,
    rotation: Quat,
) -> Option<Contact> {
    let local = rotation.conjugate().rotate(center - position);
    let closest = cuboid.closest_point(local);
    let delta = local - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= radius * radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    let (normal, penetration) = if dist > 0.0001 {
        (delta / dist, radius - dist)
    } else {
        // Center is inside the box - leave along the shortest escape axis
        let h = cuboid.half_extents;
        let candidates = [
            (h.x - local.x, Vec3::X),
            (local.x + h.x, -Vec3::X),
            (h.y - local.y, Vec3::Y),
            (local.y + h.y, -Vec3::Y),
            (h.z - local.z, Vec3::Z),
            (local.z + h.z, -Vec3::Z),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        (best.1, radius + best.0)
    };

    let point = rotation.rotate(closest) + position;
    Some(Contact::new(point, rotation.rotate(normal), penetration))
}

/// Test sphere vs torus
///
/// The closest point on the tube's center circle turns the torus into a ball
/// of the tube radius for this query.
pub fn sphere_vs_torus(
    center: Vec3,
    radius: f32,
    torus: &Torus,
    position: Vec3,
    rotation: Quat,
) -> Option<Contact> {
    let local = rotation.conjugate().rotate(center - position);
    let ring = torus.closest_on_ring(local);
    let ring_world = rotation.rotate(ring) + position;
    sphere_vs_ball(center, radius, ring_world, torus.minor_radius)
}

/// Test a sphere against any body's collider
pub fn sphere_vs_body(center: Vec3, radius: f32, body: &RigidBody) -> Option<Contact> {
    let position = body.translation();
    match &body.collider {
        Collider::Ball { radius: other } => sphere_vs_ball(center, radius, position, *other),
        Collider::Cuboid(cuboid) => {
            sphere_vs_cuboid(center, radius, cuboid, position, body.rotation())
        }
        Collider::Torus(torus) => sphere_vs_torus(center, radius, torus, position, body.rotation()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_filter_player_ignores_players() {
        let a = CollisionFilter::player();
        let b = CollisionFilter::player();
        assert!(!a.collides_with(&b));
        assert!(a.collides_with(&CollisionFilter::floor()));
        assert!(a.collides_with(&CollisionFilter::obstacle()));
    }

    #[test]
    fn test_sphere_resting_on_floor_slab() {
        let floor = Cuboid::from_size(Vec3::new(4.0, 0.2, 4.0));
        // Floor top at y = 0, sphere center slightly sunk in
        let contact = sphere_vs_cuboid(
            Vec3::new(0.5, 0.25, 0.0),
            0.3,
            &floor,
            Vec3::new(0.0, -0.1, 0.0),
            Quat::IDENTITY,
        )
        .unwrap();
        assert!((contact.normal - Vec3::Y).length() < EPSILON);
        assert!((contact.penetration - 0.05).abs() < EPSILON);
        assert!((contact.point.y).abs() < EPSILON);
    }

    #[test]
    fn test_sphere_misses_cuboid() {
        let c = Cuboid::new(Vec3::splat(0.5));
        assert!(sphere_vs_cuboid(Vec3::new(0.0, 2.0, 0.0), 0.3, &c, Vec3::ZERO, Quat::IDENTITY)
            .is_none());
    }

    #[test]
    fn test_rotated_bar_hits_along_its_length() {
        // A long bar along X rotated a quarter turn about Y now runs along Z
        let bar = Cuboid::from_size(Vec3::new(3.5, 0.3, 0.3));
        let rotation = Quat::from_rotation_y(FRAC_PI_2);
        let contact = sphere_vs_cuboid(Vec3::new(0.3, 0.0, 1.5), 0.3, &bar, Vec3::ZERO, rotation)
            .unwrap();
        assert!((contact.normal - Vec3::X).length() < EPSILON);
        assert!((contact.penetration - 0.15).abs() < EPSILON);
    }

    #[test]
    fn test_center_inside_cuboid_uses_shortest_escape() {
        let c = Cuboid::new(Vec3::new(2.0, 0.1, 2.0));
        let contact =
            sphere_vs_cuboid(Vec3::new(0.0, 0.05, 0.0), 0.3, &c, Vec3::ZERO, Quat::IDENTITY)
                .unwrap();
        assert_eq!(contact.normal, Vec3::Y);
        assert!((contact.penetration - 0.35).abs() < EPSILON);
    }

    #[test]
    fn test_sphere_vs_torus_tube() {
        let torus = Torus::new(1.0, 0.3);
        // Touching the top of the ring from above
        let contact = sphere_vs_torus(
            Vec3::new(0.0, 1.5, 0.0),
            0.3,
            &torus,
            Vec3::ZERO,
            Quat::IDENTITY,
        )
        .unwrap();
        assert!((contact.normal - Vec3::Y).length() < EPSILON);
        assert!((contact.penetration - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_sphere_passes_through_torus_hole() {
        let torus = Torus::new(1.0, 0.3);
        assert!(
            sphere_vs_torus(Vec3::ZERO, 0.3, &torus, Vec3::ZERO, Quat::IDENTITY).is_none()
        );
    }

    #[test]
    fn test_sphere_vs_ball() {
        let contact = sphere_vs_ball(Vec3::new(0.5, 0.0, 0.0), 0.3, Vec3::ZERO, 0.3).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.1).abs() < EPSILON);
        assert!(sphere_vs_ball(Vec3::new(1.0, 0.0, 0.0), 0.3, Vec3::ZERO, 0.3).is_none());
    }
}
