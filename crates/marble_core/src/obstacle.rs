//! Obstacle kinds, motion profiles and runtime instances
//!
//! Each kind maps to a motion profile: the per-instance parameter it needs
//! and the pure function turning elapsed time into a kinematic target.

use std::f32::consts::TAU;
use std::fmt;

use marble_math::{Quat, Vec3};
use marble_physics::{
    BodyKey, Collider, CollisionFilter, PhysicsMaterial, PhysicsWorld, RigidBody,
};
use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Obstacle tags a level can be drawn from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Bar spinning about the vertical axis
    Spinner,
    /// Bar bobbing up and down
    Limbo,
    /// Block swinging side to side
    Axe,
    /// Ring tumbling about the pitch axis
    Donut,
}

/// Kinds used when no palette is configured
pub const DEFAULT_PALETTE: [ObstacleKind; 3] =
    [ObstacleKind::Spinner, ObstacleKind::Limbo, ObstacleKind::Axe];

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObstacleKind::Spinner => "spinner",
            ObstacleKind::Limbo => "limbo",
            ObstacleKind::Axe => "axe",
            ObstacleKind::Donut => "donut",
        };
        f.write_str(name)
    }
}

/// Per-instance parameter, drawn once at creation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionParams {
    /// Rotation direction, -1 or +1
    Speed(f32),
    /// Phase offset in `[0, 2*pi)`
    TimeOffset(f32),
}

impl MotionParams {
    fn speed(self) -> f32 {
        match self {
            MotionParams::Speed(s) => s,
            MotionParams::TimeOffset(_) => 1.0,
        }
    }

    fn time_offset(self) -> f32 {
        match self {
            MotionParams::TimeOffset(o) => o,
            MotionParams::Speed(_) => 0.0,
        }
    }
}

/// Pose handed to the physics kinematic-target API
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KinematicTarget {
    Rotation(Quat),
    Translation(Vec3),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParamShape {
    Speed,
    TimeOffset,
}

type MotionFn = fn(f32, MotionParams, Vec3) -> KinematicTarget;

struct MotionProfile {
    params: ParamShape,
    motion: MotionFn,
    collider: Collider,
    /// Body position relative to the segment origin
    body_offset: Vec3,
}

impl ObstacleKind {
    fn profile(self) -> MotionProfile {
        match self {
            ObstacleKind::Spinner => MotionProfile {
                params: ParamShape::Speed,
                motion: |t, p, _| KinematicTarget::Rotation(spinner_rotation(t, p.speed())),
                collider: Collider::cuboid(1.75, 0.15, 0.15),
                body_offset: Vec3::new(0.0, 0.3, 0.0),
            },
            ObstacleKind::Limbo => MotionProfile {
                params: ParamShape::TimeOffset,
                motion: |t, p, origin| {
                    KinematicTarget::Translation(limbo_translation(t, p.time_offset(), origin))
                },
                collider: Collider::cuboid(1.75, 0.15, 0.15),
                body_offset: Vec3::new(0.0, 0.3, 0.0),
            },
            ObstacleKind::Axe => MotionProfile {
                params: ParamShape::TimeOffset,
                motion: |t, p, origin| {
                    KinematicTarget::Translation(axe_translation(t, p.time_offset(), origin))
                },
                collider: Collider::cuboid(0.75, 0.75, 0.15),
                body_offset: Vec3::new(0.0, 0.3, 0.0),
            },
            ObstacleKind::Donut => MotionProfile {
                params: ParamShape::Speed,
                motion: |t, p, _| KinematicTarget::Rotation(donut_rotation(t, p.speed())),
                collider: Collider::torus(1.0, 0.3),
                body_offset: Vec3::new(0.0, 1.4, 0.0),
            },
        }
    }

    /// Draw the parameter this kind's motion needs
    pub fn draw_params(self, random: &mut dyn RandomSource) -> MotionParams {
        match self.profile().params {
            ParamShape::Speed => MotionParams::Speed(draw_speed(random)),
            ParamShape::TimeOffset => MotionParams::TimeOffset(draw_time_offset(random)),
        }
    }

    /// Target pose at `elapsed` seconds for an obstacle in a segment at `origin`
    pub fn target(self, elapsed: f32, params: MotionParams, origin: Vec3) -> KinematicTarget {
        (self.profile().motion)(elapsed, params, origin)
    }
}

/// Rotation direction; -1 when `(r1 + 0.2) * r2 < 0.5`
pub fn draw_speed(random: &mut dyn RandomSource) -> f32 {
    let r1 = random.next_f32();
    let r2 = random.next_f32();
    if (r1 + 0.2) * r2 < 0.5 {
        -1.0
    } else {
        1.0
    }
}

pub fn draw_time_offset(random: &mut dyn RandomSource) -> f32 {
    random.next_f32() * TAU
}

pub fn spinner_rotation(elapsed: f32, speed: f32) -> Quat {
    Quat::from_euler_xyz(0.0, elapsed * speed, 0.0)
}

pub fn donut_rotation(elapsed: f32, speed: f32) -> Quat {
    Quat::from_euler_xyz(elapsed * speed, 0.0, 0.0)
}

/// Bar height: `1.2 - sin(t + offset)`, always within `[0.2, 2.2]`
pub fn limbo_translation(elapsed: f32, time_offset: f32, origin: Vec3) -> Vec3 {
    Vec3::new(origin.x, 1.2 - (elapsed + time_offset).sin(), origin.z)
}

/// Sideways swing: `x = sin(t + offset)` at a fixed height of 0.8
pub fn axe_translation(elapsed: f32, time_offset: f32, origin: Vec3) -> Vec3 {
    Vec3::new(origin.x + (elapsed + time_offset).sin(), 0.8, origin.z)
}

/// Floor under an obstacle segment, 4 x 0.2 x 4 with its top at the origin
pub(crate) fn segment_floor(origin: Vec3) -> RigidBody {
    RigidBody::fixed(origin + Vec3::new(0.0, -0.1, 0.0), Collider::cuboid(2.0, 0.1, 2.0))
        .with_material(PhysicsMaterial::FLOOR)
        .with_filter(CollisionFilter::floor())
}

/// One moving obstacle and its floor
#[derive(Clone, Debug)]
pub struct ObstacleInstance {
    pub kind: ObstacleKind,
    pub params: MotionParams,
    /// Segment origin in world space
    pub origin: Vec3,
    floor: BodyKey,
    body: BodyKey,
}

impl ObstacleInstance {
    /// Create the floor and kinematic body, drawing the motion parameter
    pub fn spawn(
        kind: ObstacleKind,
        origin: Vec3,
        physics: &mut PhysicsWorld,
        random: &mut dyn RandomSource,
    ) -> Self {
        let profile = kind.profile();
        let params = kind.draw_params(random);
        let floor = physics.add_body(segment_floor(origin));
        let body = physics.add_body(
            RigidBody::kinematic(origin + profile.body_offset, profile.collider)
                .with_material(PhysicsMaterial::OBSTACLE),
        );
        Self {
            kind,
            params,
            origin,
            floor,
            body,
        }
    }

    pub fn body(&self) -> BodyKey {
        self.body
    }

    pub fn floor(&self) -> BodyKey {
        self.floor
    }

    pub fn target(&self, elapsed: f32) -> KinematicTarget {
        self.kind.target(elapsed, self.params, self.origin)
    }

    /// Hand this tick's target to the physics world
    ///
    /// Returns false if the body is gone.
    pub fn advance(&self, elapsed: f32, physics: &mut PhysicsWorld) -> bool {
        let Some(body) = physics.get_body_mut(self.body) else {
            return false;
        };
        match self.target(elapsed) {
            KinematicTarget::Rotation(rotation) => body.set_next_kinematic_rotation(rotation),
            KinematicTarget::Translation(translation) => {
                body.set_next_kinematic_translation(translation)
            }
        }
        true
    }

    pub fn despawn(&self, physics: &mut PhysicsWorld) {
        physics.remove_body(self.body);
        physics.remove_body(self.floor);
    }
}
