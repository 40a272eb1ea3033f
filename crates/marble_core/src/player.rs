//! Player controller
//!
//! Owns the marble's rigid body and the chase camera. The per-tick work is
//! split into pure steps ([`compute_impulse`], [`CameraState::follow`],
//! [`check_phase_transition`]) that [`PlayerController`] composes against the
//! physics world and the game store.

use marble_input::{Control, ControlEvent, ControlsState};
use marble_math::Vec3;
use marble_physics::{
    BodyKey, Collider, CollisionFilter, PhysicsMaterial, PhysicsWorld, QueryFilter, Ray, RigidBody,
};
use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::level::finish_line_z;
use crate::phase::{GamePhase, GameStore, Subscription};

/// Height below which the marble counts as fallen off the track
pub const FALL_LIMIT: f32 = -4.0;

/// Marble body and locomotion constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Position the marble resets to on every Ready
    pub spawn: Vec3,
    pub radius: f32,
    /// Directional impulse per second of held input
    pub impulse_strength: f32,
    /// Rolling torque impulse per second of held input
    pub torque_strength: f32,
    /// Upward impulse applied by a grounded jump
    pub jump_impulse: f32,
    /// How far below the center the ground probe starts
    pub ray_offset: f32,
    pub ray_length: f32,
    /// Probe hits closer than this count as grounded
    pub grounded_toi: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(0.0, 1.0, 0.0),
            radius: 0.3,
            impulse_strength: 0.6,
            torque_strength: 0.2,
            jump_impulse: 0.5,
            ray_offset: 0.31,
            ray_length: 10.0,
            grounded_toi: 0.15,
            linear_damping: 0.5,
            angular_damping: 0.5,
        }
    }
}

/// Chase camera constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Camera position relative to the marble
    pub offset: Vec3,
    /// Look-at point relative to the marble
    pub target_offset: Vec3,
    /// Exponential smoothing rate (per second)
    pub smoothing: f32,
    pub initial_position: Vec3,
    pub initial_target: Vec3,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 0.65, 2.25),
            target_offset: Vec3::new(0.0, 0.25, 0.0),
            smoothing: 5.0,
            initial_position: Vec3::new(10.0, 10.0, 10.0),
            initial_target: Vec3::ZERO,
        }
    }
}

/// Linear and angular impulse for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Impulse {
    pub linear: Vec3,
    pub torque: Vec3,
}

/// Impulse for the held directional control
///
/// At most one direction applies per tick, picked in the order forward,
/// backward, left, right.
pub fn compute_impulse(controls: &ControlsState, dt: f32, tuning: &PlayerTuning) -> Impulse {
    let push = tuning.impulse_strength * dt;
    let roll = tuning.torque_strength * dt;

    let (linear, torque) = if controls.forward {
        (Vec3::new(0.0, 0.0, -push), Vec3::new(-roll, 0.0, 0.0))
    } else if controls.backward {
        (Vec3::new(0.0, 0.0, push), Vec3::new(roll, 0.0, 0.0))
    } else if controls.left {
        (Vec3::new(-push, 0.0, 0.0), Vec3::new(0.0, 0.0, roll))
    } else if controls.right {
        (Vec3::new(push, 0.0, 0.0), Vec3::new(0.0, 0.0, -roll))
    } else {
        (Vec3::ZERO, Vec3::ZERO)
    };

    Impulse { linear, torque }
}

/// Phase change requested by the marble's position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseCommand {
    /// Crossed the finish line
    End,
    /// Fell off the track
    Restart,
    /// Past the finish line and below the fall limit in the same tick
    EndThenRestart,
}

/// Decide whether the marble's position ends or restarts the race
pub fn check_phase_transition(position: Vec3, blocks_count: u32) -> Option<PhaseCommand> {
    let finished = position.z < finish_line_z(blocks_count);
    let fell = position.y < FALL_LIMIT;
    match (finished, fell) {
        (true, true) => Some(PhaseCommand::EndThenRestart),
        (true, false) => Some(PhaseCommand::End),
        (false, true) => Some(PhaseCommand::Restart),
        (false, false) => None,
    }
}

/// Smoothed camera pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraState {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Move toward the pose derived from `body_position`
    ///
    /// The blend factor is `rate * dt`, clamped to 1 so long frames land on
    /// the goal instead of overshooting it.
    pub fn follow(&self, body_position: Vec3, dt: f32, tuning: &CameraTuning) -> Self {
        let t = (tuning.smoothing * dt).clamp(0.0, 1.0);
        Self {
            position: self.position.lerp(body_position + tuning.offset, t),
            target: self.target.lerp(body_position + tuning.target_offset, t),
        }
    }
}

/// The racer's marble
pub struct PlayerController {
    body: BodyKey,
    camera: CameraState,
    tuning: PlayerTuning,
    camera_tuning: CameraTuning,
    resets: Subscription<(GamePhase, u64)>,
}

impl PlayerController {
    /// Add the marble to the world and subscribe to Ready entries
    pub fn spawn(
        physics: &mut PhysicsWorld,
        store: &mut GameStore,
        tuning: PlayerTuning,
        camera_tuning: CameraTuning,
    ) -> Self {
        let body = physics.add_body(
            RigidBody::dynamic(tuning.spawn, Collider::ball(tuning.radius))
                .with_material(PhysicsMaterial::MARBLE)
                .with_damping(tuning.linear_damping, tuning.angular_damping)
                .with_filter(CollisionFilter::player()),
        );
        // Seed is part of the selection so a restart while already Ready still resets
        let resets = store.subscribe(|s| (s.phase, s.blocks_seed));
        let camera = CameraState::new(camera_tuning.initial_position, camera_tuning.initial_target);

        Self {
            body,
            camera,
            tuning,
            camera_tuning,
            resets,
        }
    }

    pub fn body(&self) -> BodyKey {
        self.body
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    fn body_mut<'a>(&self, physics: &'a mut PhysicsWorld) -> Result<&'a mut RigidBody, RaceError> {
        physics
            .get_body_mut(self.body)
            .ok_or(RaceError::MissingBody(self.body))
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Result<Vec3, RaceError> {
        physics
            .get_body(self.body)
            .map(|b| b.translation())
            .ok_or(RaceError::MissingBody(self.body))
    }

    /// React to a control edge
    ///
    /// Any edge while Ready starts the clock; a jump press tries to jump.
    pub fn handle_event(
        &mut self,
        event: ControlEvent,
        store: &mut GameStore,
        physics: &mut PhysicsWorld,
    ) -> Result<(), RaceError> {
        if store.phase() == GamePhase::Ready {
            store.start();
        }
        if event.control == Control::Jump && event.pressed {
            self.jump(physics)?;
        }
        Ok(())
    }

    /// Jump if the ground probe finds a surface right below the marble
    ///
    /// Returns whether the impulse was applied.
    pub fn jump(&self, physics: &mut PhysicsWorld) -> Result<bool, RaceError> {
        let origin = self.position(physics)? - Vec3::new(0.0, self.tuning.ray_offset, 0.0);
        let ray = Ray::new(origin, -Vec3::Y);
        let filter = QueryFilter::default().exclude_body(self.body);
        let hit = physics.cast_ray(&ray, self.tuning.ray_length, true, filter);

        let grounded = matches!(hit, Some(h) if h.toi < self.tuning.grounded_toi);
        log::debug!("Jump probe: {:?}, grounded = {}", hit.map(|h| h.toi), grounded);

        if grounded {
            self.body_mut(physics)?
                .apply_impulse(Vec3::new(0.0, self.tuning.jump_impulse, 0.0));
        }
        Ok(grounded)
    }

    /// Apply pending phase notifications; resets the marble on entering Ready
    ///
    /// Returns whether a reset happened.
    pub fn sync_phase(&mut self, physics: &mut PhysicsWorld) -> Result<bool, RaceError> {
        let entered_ready = self
            .resets
            .drain()
            .iter()
            .any(|(phase, _)| *phase == GamePhase::Ready);
        if entered_ready {
            self.reset(physics)?;
        }
        Ok(entered_ready)
    }

    /// Put the marble back on the start pad, motionless
    pub fn reset(&self, physics: &mut PhysicsWorld) -> Result<(), RaceError> {
        let body = self.body_mut(physics)?;
        body.set_translation(self.tuning.spawn);
        body.set_linvel(Vec3::ZERO);
        body.set_angvel(Vec3::ZERO);
        log::debug!("Marble reset to {:?}", self.tuning.spawn);
        Ok(())
    }

    /// Push the marble according to the held controls
    pub fn apply_controls(
        &self,
        controls: &ControlsState,
        dt: f32,
        physics: &mut PhysicsWorld,
    ) -> Result<(), RaceError> {
        let impulse = compute_impulse(controls, dt, &self.tuning);
        let body = self.body_mut(physics)?;
        body.apply_impulse(impulse.linear);
        body.apply_torque_impulse(impulse.torque);
        Ok(())
    }

    /// Camera follow and phase checks, run after the physics step
    pub fn after_step(
        &mut self,
        dt: f32,
        physics: &PhysicsWorld,
        store: &mut GameStore,
    ) -> Result<(), RaceError> {
        let position = self.position(physics)?;
        self.camera = self.camera.follow(position, dt, &self.camera_tuning);

        match check_phase_transition(position, store.state().blocks_count) {
            Some(PhaseCommand::End) => {
                store.end();
            }
            Some(PhaseCommand::Restart) => store.restart(),
            Some(PhaseCommand::EndThenRestart) => {
                store.end();
                store.restart();
            }
            None => {}
        }
        Ok(())
    }
}
