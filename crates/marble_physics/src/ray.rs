//! Ray casting against body colliders

use crate::body::{BodyKey, RigidBody};
use crate::collision::CollisionLayer;
use crate::shapes::{Collider, Cuboid, Torus};
use marble_math::Vec3;

/// Sphere tracing gives up after this many marches
const MAX_MARCH_STEPS: usize = 64;
/// Distance at which a march counts as a hit
const MARCH_EPSILON: f32 = 1e-4;

/// A half-line from `origin` along `dir`
///
/// `dir` is normalized on construction so the time of impact is a distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalized(),
        }
    }

    /// Point reached after travelling `toi` along the ray
    pub fn point_at(&self, toi: f32) -> Vec3 {
        self.origin + self.dir * toi
    }
}

/// First body hit by a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub body: BodyKey,
    /// Distance from the ray origin to the hit
    pub toi: f32,
}

/// Which bodies a ray query may hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryFilter {
    /// Only bodies on one of these layers are considered
    pub mask: CollisionLayer,
    /// Body to skip (usually the one casting)
    pub exclude: Option<BodyKey>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            mask: CollisionLayer::ALL,
            exclude: None,
        }
    }
}

impl QueryFilter {
    pub fn exclude_body(mut self, key: BodyKey) -> Self {
        self.exclude = Some(key);
        self
    }

    pub fn with_mask(mut self, mask: CollisionLayer) -> Self {
        self.mask = mask;
        self
    }

    pub fn accepts(&self, key: BodyKey, body: &RigidBody) -> bool {
        self.exclude != Some(key) && body.filter.layer.intersects(self.mask)
    }
}

/// Ray vs a ball centered at the origin of `local` space
///
/// With `solid`, a ray starting inside reports a hit at 0.
pub fn ray_vs_ball(origin: Vec3, dir: Vec3, radius: f32, max_toi: f32, solid: bool) -> Option<f32> {
    let c = origin.length_squared() - radius * radius;
    if c <= 0.0 && solid {
        return Some(0.0);
    }
    let b = origin.dot(dir);
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    let toi = if near >= 0.0 { near } else { -b + sqrt_disc };
    (toi >= 0.0 && toi <= max_toi).then_some(toi)
}

/// Ray vs an axis-aligned box in local space (slab test)
pub fn ray_vs_cuboid(
    origin: Vec3,
    dir: Vec3,
    cuboid: &Cuboid,
    max_toi: f32,
    solid: bool,
) -> Option<f32> {
    if solid && cuboid.contains(origin) {
        return Some(0.0);
    }

    let h = cuboid.half_extents.to_array();
    let o = origin.to_array();
    let d = dir.to_array();
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        if d[axis].abs() < 1e-8 {
            if o[axis] < -h[axis] || o[axis] > h[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t0 = (-h[axis] - o[axis]) * inv;
        let mut t1 = (h[axis] - o[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    let toi = if t_min >= 0.0 { t_min } else { t_max };
    (toi >= 0.0 && toi <= max_toi).then_some(toi)
}

/// Ray vs torus by sphere tracing its signed distance field
pub fn ray_vs_torus(origin: Vec3, dir: Vec3, torus: &Torus, max_toi: f32, solid: bool) -> Option<f32> {
    let start = torus.signed_distance(origin);
    if start <= 0.0 {
        if solid {
            return Some(0.0);
        }
        // Walk out of the tube first, then report the exit
        let mut toi = 0.0;
        for _ in 0..MAX_MARCH_STEPS {
            let d = torus.signed_distance(origin + dir * toi);
            if d >= -MARCH_EPSILON {
                return (toi <= max_toi).then_some(toi);
            }
            toi += (-d).max(MARCH_EPSILON);
        }
        return None;
    }

    let mut toi = 0.0;
    for _ in 0..MAX_MARCH_STEPS {
        let d = torus.signed_distance(origin + dir * toi);
        if d < MARCH_EPSILON {
            return Some(toi);
        }
        toi += d;
        if toi > max_toi {
            return None;
        }
    }
    None
}

/// Cast a ray against one body, returning the time of impact
pub fn ray_vs_body(ray: &Ray, body: &RigidBody, max_toi: f32, solid: bool) -> Option<f32> {
    // Quick reject with the bounding sphere
    let to_center = body.translation() - ray.origin;
    let along = to_center.dot(ray.dir).clamp(0.0, max_toi);
    let bound = body.collider.bounding_radius();
    if (ray.point_at(along) - body.translation()).length_squared() > bound * bound {
        return None;
    }

    let origin = body.to_local(ray.origin);
    let dir = body.rotation().conjugate().rotate(ray.dir);
    match &body.collider {
        Collider::Ball { radius } => ray_vs_ball(origin, dir, *radius, max_toi, solid),
        Collider::Cuboid(cuboid) => ray_vs_cuboid(origin, dir, cuboid, max_toi, solid),
        Collider::Torus(torus) => ray_vs_torus(origin, dir, torus, max_toi, solid),
    }
}
