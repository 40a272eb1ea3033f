//! Physics world and simulation

use crate::body::{BodyKey, RigidBody};
use crate::collision::{sphere_vs_body, Contact};
use crate::material::PhysicsMaterial;
use crate::ray::{ray_vs_body, QueryFilter, Ray, RayHit};
use crate::shapes::Collider;
use marble_math::Vec3;
use slotmap::SlotMap;

/// Approach speed below which contacts don't bounce
///
/// Without it a resting marble jitters on any surface with restitution.
const RESTITUTION_THRESHOLD: f32 = 0.5;

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration (applied to Y-axis, negative = down)
    pub gravity: f32,
    /// Contact passes per step
    pub solver_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            solver_iterations: 4,
        }
    }
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            config,
        }
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        let removed = self.bodies.remove(key);
        if removed.is_none() {
            log::debug!("remove_body: stale key {:?}", key);
        }
        removed
    }

    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Find the closest body hit by a ray within `max_toi`
    ///
    /// With `solid`, a ray starting inside a shape hits it at distance 0.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        max_toi: f32,
        solid: bool,
        filter: QueryFilter,
    ) -> Option<RayHit> {
        self.bodies
            .iter()
            .filter(|(key, body)| filter.accepts(*key, body))
            .filter_map(|(key, body)| {
                ray_vs_body(ray, body, max_toi, solid).map(|toi| RayHit { body: key, toi })
            })
            .min_by(|a, b| a.toi.total_cmp(&b.toi))
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Kinematic bodies move onto their pose targets
    /// 2. Gravity, damping and integration for dynamic bodies
    /// 3. Contact resolution against fixed and kinematic bodies
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        // Phase 1: Kinematic targets
        for (_key, body) in &mut self.bodies {
            if body.is_kinematic() {
                body.advance_kinematic(dt);
            }
        }

        // Phase 2: Integrate dynamic bodies
        let gravity = Vec3::new(0.0, self.config.gravity, 0.0);
        for (_key, body) in &mut self.bodies {
            if body.is_dynamic() {
                body.integrate(gravity, dt);
            }
        }

        // Phase 3: Contacts
        let dynamic: Vec<BodyKey> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(key, _)| key)
            .collect();
        let solid: Vec<BodyKey> = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_dynamic())
            .map(|(key, _)| key)
            .collect();

        for _ in 0..self.config.solver_iterations.max(1) {
            for &key in &dynamic {
                for &other in &solid {
                    self.resolve_against_solid(key, other);
                }
            }
        }
    }

    /// Resolve one dynamic ball against a body that contacts can't move
    fn resolve_against_solid(&mut self, key: BodyKey, other_key: BodyKey) {
        let (center, radius, filter) = match self.bodies.get(key) {
            Some(body) => match body.collider {
                Collider::Ball { radius } => (body.translation(), radius, body.filter),
                // Only balls are simulated dynamically
                _ => return,
            },
            None => return,
        };

        let Some(other) = self.bodies.get(other_key) else {
            return;
        };
        if !filter.collides_with(&other.filter) {
            return;
        }
        let Some(contact) = sphere_vs_body(center, radius, other) else {
            return;
        };
        let surface_velocity = other.velocity_at_point(contact.point);
        let material = other.material;

        if let Some(body) = self.bodies.get_mut(key) {
            Self::resolve_contact(body, radius, &contact, surface_velocity, material);
        }
    }

    /// Push a ball out of a surface and apply normal and friction impulses
    ///
    /// Friction acts on the slip velocity of the contact point, so a spinning
    /// ball on a grippy surface is driven forward (rolling).
    fn resolve_contact(
        body: &mut RigidBody,
        radius: f32,
        contact: &Contact,
        surface_velocity: Vec3,
        surface_material: PhysicsMaterial,
    ) {
        let n = contact.normal;
        body.set_translation(body.translation() + n * contact.penetration);

        let combined = body.material.combine(&surface_material);
        let mass = body.mass();
        let inertia = body.inertia();
        let r = -n * radius;
        let point = body.translation() + r;

        let relative = body.velocity_at_point(point) - surface_velocity;
        let vn = relative.dot(n);
        if vn >= 0.0 {
            return;
        }

        let restitution = if -vn > RESTITUTION_THRESHOLD {
            combined.restitution
        } else {
            0.0
        };
        let jn = -(1.0 + restitution) * vn * mass;
        body.apply_impulse(n * jn);

        // Coulomb friction on the tangential slip
        let relative = body.velocity_at_point(point) - surface_velocity;
        let slip = relative - n * relative.dot(n);
        let slip_speed = slip.length();
        if slip_speed < 0.0001 || combined.friction <= 0.0 {
            return;
        }
        let t = slip / slip_speed;
        let r_cross_t = r.cross(t);
        let effective_mass = 1.0 / (1.0 / mass + r_cross_t.length_squared() / inertia);
        let jt = (slip_speed * effective_mass).min(combined.friction * jn);
        body.apply_impulse_at_point(-t * jt, point);
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionFilter, CollisionLayer};
    use marble_math::Quat;

    const DT: f32 = 1.0 / 60.0;

    /// Helper to create a world with a 4x4 floor whose top is at y = 0
    fn world_with_floor() -> (PhysicsWorld, BodyKey) {
        let mut world = PhysicsWorld::new();
        let floor = world.add_body(
            RigidBody::fixed(Vec3::new(0.0, -0.1, 0.0), Collider::cuboid(2.0, 0.1, 2.0))
                .with_material(PhysicsMaterial::FLOOR)
                .with_filter(CollisionFilter::floor()),
        );
        (world, floor)
    }

    fn marble(position: Vec3) -> RigidBody {
        RigidBody::dynamic(position, Collider::ball(0.3))
            .with_material(PhysicsMaterial::MARBLE)
            .with_damping(0.5, 0.5)
            .with_filter(CollisionFilter::player())
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, -9.81);
        assert!(config.solver_iterations > 0);
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(marble(Vec3::Y));
        assert!(world.remove_body(key).is_some());
        assert!(world.get_body(key).is_none());

        let new_key = world.add_body(marble(Vec3::Y));
        assert!(world.get_body(key).is_none());
        assert!(world.get_body(new_key).is_some());
    }

    #[test]
    fn test_gravity_application() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::dynamic(Vec3::new(0.0, 5.0, 0.0), Collider::ball(0.3)));
        world.step(0.1);
        let body = world.get_body(key).unwrap();
        assert!((body.linvel().y + 0.981).abs() < 0.001);
        assert!(body.translation().y < 5.0);
    }

    #[test]
    fn test_fixed_body_does_not_move() {
        let (mut world, floor) = world_with_floor();
        for _ in 0..10 {
            world.step(DT);
        }
        assert_eq!(world.get_body(floor).unwrap().translation(), Vec3::new(0.0, -0.1, 0.0));
    }

    #[test]
    fn test_marble_settles_on_floor() {
        let (mut world, _) = world_with_floor();
        let key = world.add_body(marble(Vec3::new(0.0, 1.0, 0.0)));
        for _ in 0..180 {
            world.step(DT);
        }
        let body = world.get_body(key).unwrap();
        assert!((body.translation().y - 0.3).abs() < 0.02, "y = {}", body.translation().y);
        assert!(body.linvel().y.abs() < 0.2);
    }

    #[test]
    fn test_spin_rolls_marble_forward() {
        let (mut world, _) = world_with_floor();
        let key = world.add_body(marble(Vec3::new(0.0, 0.3, 0.0)));
        world.step(DT);

        // Backspin about -X drives the contact point toward +Z, so friction pushes -Z
        world.get_body_mut(key).unwrap().apply_torque_impulse(Vec3::new(-0.01, 0.0, 0.0));
        for _ in 0..10 {
            world.step(DT);
        }
        let body = world.get_body(key).unwrap();
        assert!(body.translation().z < 0.0);
        assert!(body.linvel().z < 0.0);
    }

    #[test]
    fn test_kinematic_follows_target() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::kinematic(Vec3::ZERO, Collider::cuboid(0.75, 0.75, 0.15)));
        world
            .get_body_mut(key)
            .unwrap()
            .set_next_kinematic_translation(Vec3::new(0.5, 0.0, 0.0));
        world.step(0.5);

        let body = world.get_body(key).unwrap();
        assert_eq!(body.translation(), Vec3::new(0.5, 0.0, 0.0));
        assert!((body.linvel().x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_kinematic_rotation_sets_angular_velocity() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::kinematic(Vec3::ZERO, Collider::cuboid(1.75, 0.15, 0.15)));
        world
            .get_body_mut(key)
            .unwrap()
            .set_next_kinematic_rotation(Quat::from_rotation_y(0.1));
        world.step(0.1);
        let body = world.get_body(key).unwrap();
        assert!((body.angvel().y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_moving_bar_pushes_marble() {
        let (mut world, _) = world_with_floor();
        let marble = world.add_body(marble(Vec3::new(0.0, 0.3, 0.0)));
        let bar = world.add_body(
            RigidBody::kinematic(Vec3::new(-0.5, 0.3, 0.0), Collider::cuboid(0.15, 0.15, 1.0))
                .with_material(PhysicsMaterial::OBSTACLE),
        );

        for i in 1..=30 {
            let x = -0.5 + i as f32 * 0.02;
            world
                .get_body_mut(bar)
                .unwrap()
                .set_next_kinematic_translation(Vec3::new(x, 0.3, 0.0));
            world.step(DT);
        }

        assert!(world.get_body(marble).unwrap().translation().x > 0.2);
    }

    #[test]
    fn test_cast_ray_excludes_caster() {
        let (mut world, floor) = world_with_floor();
        let key = world.add_body(marble(Vec3::new(0.0, 0.3, 0.0)));
        let ray = Ray::new(Vec3::new(0.0, -0.01, 0.0), -Vec3::Y);

        // The ray starts just below the marble surface and inside nothing else
        let hit = world
            .cast_ray(&Ray::new(Vec3::new(0.0, 0.3, 0.0), -Vec3::Y), 10.0, true, QueryFilter::default())
            .unwrap();
        assert_eq!(hit.body, key);

        let hit = world
            .cast_ray(&ray, 10.0, true, QueryFilter::default().exclude_body(key))
            .unwrap();
        assert_eq!(hit.body, floor);
        assert_eq!(hit.toi, 0.0);
    }

    #[test]
    fn test_cast_ray_mask() {
        let (world, _) = world_with_floor();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let filter = QueryFilter::default().with_mask(CollisionLayer::WALL);
        assert!(world.cast_ray(&ray, 10.0, true, filter).is_none());
    }
}
