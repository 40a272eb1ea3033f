//! Rigid body types

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;
use crate::shapes::Collider;
use marble_math::{Quat, Vec3};
use slotmap::new_key_type;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing: once a body is removed, old keys return
    /// None instead of pointing at whatever reuses the slot. Levels are torn
    /// down and rebuilt on every restart, so this matters.
    pub struct BodyKey;
}

/// How a body participates in the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    /// Moved by gravity, impulses and contacts
    Dynamic,
    /// Never moves
    Fixed,
    /// Moved only by explicit next-step pose targets
    KinematicPosition,
}

/// Default density used to derive mass from collider volume
pub const DEFAULT_DENSITY: f32 = 1.0;

/// A rigid body with pose, velocities and a collision shape
#[derive(Clone, Debug)]
pub struct RigidBody {
    body_type: BodyType,
    position: Vec3,
    rotation: Quat,
    linvel: Vec3,
    angvel: Vec3,
    mass: f32,
    inertia: f32,
    /// Linear damping coefficient (per second)
    pub linear_damping: f32,
    /// Angular damping coefficient (per second)
    pub angular_damping: f32,
    /// The collision shape in body-local space
    pub collider: Collider,
    /// Friction and restitution
    pub material: PhysicsMaterial,
    /// Collision layer membership and mask
    pub filter: CollisionFilter,
    next_translation: Option<Vec3>,
    next_rotation: Option<Quat>,
}

impl RigidBody {
    fn new(body_type: BodyType, position: Vec3, collider: Collider) -> Self {
        let (mass, inertia) = collider.mass_properties(DEFAULT_DENSITY);
        Self {
            body_type,
            position,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            mass,
            inertia,
            linear_damping: 0.0,
            angular_damping: 0.0,
            collider,
            material: PhysicsMaterial::default(),
            filter: CollisionFilter::default(),
            next_translation: None,
            next_rotation: None,
        }
    }

    /// Create a dynamic body
    pub fn dynamic(position: Vec3, collider: Collider) -> Self {
        Self::new(BodyType::Dynamic, position, collider)
    }

    /// Create a fixed (static) body
    pub fn fixed(position: Vec3, collider: Collider) -> Self {
        Self::new(BodyType::Fixed, position, collider).with_filter(CollisionFilter::static_world())
    }

    /// Create a kinematic body driven by pose targets
    pub fn kinematic(position: Vec3, collider: Collider) -> Self {
        Self::new(BodyType::KinematicPosition, position, collider)
            .with_filter(CollisionFilter::obstacle())
    }

    /// Set the material of this body
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
        self
    }

    /// Set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the initial rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::KinematicPosition
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// World-space position of the body origin
    pub fn translation(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn linvel(&self) -> Vec3 {
        self.linvel
    }

    pub fn angvel(&self) -> Vec3 {
        self.angvel
    }

    /// Velocity of a world-space point rigidly attached to this body
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.linvel + self.angvel.cross(point - self.position)
    }

    /// Convert a world-space point into body-local space
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(point - self.position)
    }

    /// Convert a body-local point into world space
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.rotation.rotate(local) + self.position
    }

    /// Apply an instantaneous change of linear momentum
    ///
    /// Ignored for non-dynamic bodies.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.is_dynamic() {
            self.linvel += impulse / self.mass;
        }
    }

    /// Apply an instantaneous change of angular momentum
    ///
    /// Ignored for non-dynamic bodies.
    pub fn apply_torque_impulse(&mut self, torque: Vec3) {
        if self.is_dynamic() {
            self.angvel += torque / self.inertia;
        }
    }

    /// Apply an impulse at a world-space point (affects both velocities)
    pub fn apply_impulse_at_point(&mut self, impulse: Vec3, point: Vec3) {
        if self.is_dynamic() {
            self.linvel += impulse / self.mass;
            self.angvel += (point - self.position).cross(impulse) / self.inertia;
        }
    }

    /// Teleport the body
    pub fn set_translation(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_linvel(&mut self, linvel: Vec3) {
        self.linvel = linvel;
    }

    pub fn set_angvel(&mut self, angvel: Vec3) {
        self.angvel = angvel;
    }

    /// Position the kinematic body should reach at the end of the next step
    ///
    /// Ignored for non-kinematic bodies.
    pub fn set_next_kinematic_translation(&mut self, target: Vec3) {
        if self.is_kinematic() {
            self.next_translation = Some(target);
        }
    }

    /// Rotation the kinematic body should reach at the end of the next step
    ///
    /// Ignored for non-kinematic bodies.
    pub fn set_next_kinematic_rotation(&mut self, target: Quat) {
        if self.is_kinematic() {
            self.next_rotation = Some(target);
        }
    }

    /// Pending kinematic translation target, if any
    pub fn next_kinematic_translation(&self) -> Option<Vec3> {
        self.next_translation
    }

    /// Pending kinematic rotation target, if any
    pub fn next_kinematic_rotation(&self) -> Option<Quat> {
        self.next_rotation
    }

    /// Move a kinematic body onto its targets, deriving the velocities
    /// contacts will see during this step
    pub(crate) fn advance_kinematic(&mut self, dt: f32) {
        match self.next_translation.take() {
            Some(target) if dt > 0.0 => {
                self.linvel = (target - self.position) / dt;
                self.position = target;
            }
            Some(target) => self.position = target,
            None => self.linvel = Vec3::ZERO,
        }
        match self.next_rotation.take() {
            Some(target) => {
                self.angvel = self.rotation.angular_velocity_to(target, dt);
                self.rotation = target;
            }
            None => self.angvel = Vec3::ZERO,
        }
    }

    /// Apply gravity and damping, then integrate the pose
    pub(crate) fn integrate(&mut self, gravity: Vec3, dt: f32) {
        self.linvel += gravity * dt;
        self.linvel *= 1.0 / (1.0 + dt * self.linear_damping);
        self.angvel *= 1.0 / (1.0 + dt * self.angular_damping);

        self.position += self.linvel * dt;
        self.rotation = (Quat::from_scaled_axis(self.angvel, dt) * self.rotation).normalized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_dynamic_ball_mass() {
        let body = RigidBody::dynamic(Vec3::ZERO, Collider::ball(0.3));
        assert!(body.is_dynamic());
        assert!((body.mass() - 0.113_097).abs() < 0.001);
    }

    #[test]
    fn test_impulse_changes_velocity_by_mass() {
        let mut body = RigidBody::dynamic(Vec3::ZERO, Collider::ball(0.3));
        let mass = body.mass();
        body.apply_impulse(Vec3::new(0.0, 0.0, -0.6));
        assert!((body.linvel().z + 0.6 / mass).abs() < EPSILON);
    }

    #[test]
    fn test_torque_impulse_changes_spin() {
        let mut body = RigidBody::dynamic(Vec3::ZERO, Collider::ball(0.3));
        let inertia = body.inertia();
        body.apply_torque_impulse(Vec3::new(-0.2, 0.0, 0.0));
        assert!((body.angvel().x + 0.2 / inertia).abs() < EPSILON);
    }

    #[test]
    fn test_fixed_body_ignores_impulses() {
        let mut body = RigidBody::fixed(Vec3::ZERO, Collider::cuboid(1.0, 1.0, 1.0));
        body.apply_impulse(Vec3::Y);
        body.apply_torque_impulse(Vec3::Y);
        assert_eq!(body.linvel(), Vec3::ZERO);
        assert_eq!(body.angvel(), Vec3::ZERO);
    }

    #[test]
    fn test_kinematic_targets_only_on_kinematic_bodies() {
        let mut dynamic = RigidBody::dynamic(Vec3::ZERO, Collider::ball(0.3));
        dynamic.set_next_kinematic_translation(Vec3::Y);
        assert!(dynamic.next_kinematic_translation().is_none());

        let mut kinematic = RigidBody::kinematic(Vec3::ZERO, Collider::cuboid(1.0, 0.1, 0.1));
        kinematic.set_next_kinematic_translation(Vec3::Y);
        assert_eq!(kinematic.next_kinematic_translation(), Some(Vec3::Y));
    }

    #[test]
    fn test_advance_kinematic_derives_velocity() {
        let mut body = RigidBody::kinematic(Vec3::ZERO, Collider::cuboid(1.0, 0.1, 0.1));
        body.set_next_kinematic_translation(Vec3::new(0.0, 0.5, 0.0));
        body.advance_kinematic(0.5);

        assert_eq!(body.translation(), Vec3::new(0.0, 0.5, 0.0));
        assert!((body.linvel().y - 1.0).abs() < EPSILON);
        assert!(body.next_kinematic_translation().is_none());

        // No target next step: the body holds still
        body.advance_kinematic(0.5);
        assert_eq!(body.linvel(), Vec3::ZERO);
    }

    #[test]
    fn test_integrate_applies_damping() {
        let mut body = RigidBody::dynamic(Vec3::ZERO, Collider::ball(0.3)).with_damping(0.5, 0.5);
        body.set_linvel(Vec3::new(1.0, 0.0, 0.0));
        body.integrate(Vec3::ZERO, 1.0);
        // v / (1 + dt * damping)
        assert!((body.linvel().x - 1.0 / 1.5).abs() < EPSILON);
    }

    #[test]
    fn test_local_world_round_trip() {
        let body = RigidBody::kinematic(Vec3::new(0.0, 1.0, -4.0), Collider::ball(1.0))
            .with_rotation(Quat::from_rotation_y(0.8));
        let p = Vec3::new(0.3, 2.0, -3.5);
        let back = body.to_world(body.to_local(p));
        assert!((back - p).length() < EPSILON);
    }
}
