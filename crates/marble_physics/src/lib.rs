//! Rigid body physics for Marble Race
//!
//! This crate provides just enough simulation for a marble course:
//! - Collision shapes (balls, oriented cuboids, tori)
//! - Dynamic, fixed and kinematic-position rigid bodies
//! - Impulse-based contact resolution with rolling friction
//! - Ray casts for ground probes

pub mod body;
pub mod collision;
pub mod material;
pub mod ray;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, BodyType, RigidBody};
pub use collision::{sphere_vs_body, CollisionFilter, CollisionLayer, Contact};
pub use material::PhysicsMaterial;
pub use ray::{QueryFilter, Ray, RayHit};
pub use shapes::{Collider, Cuboid, Torus};
pub use world::{PhysicsConfig, PhysicsWorld};
