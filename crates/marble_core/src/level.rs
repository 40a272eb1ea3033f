//! Level generation
//!
//! A level is a straight track of 4-unit segments along -Z: a start pad, one
//! segment per drawn obstacle, and an end pad, all enclosed by side walls, a
//! back wall and a continuous floor.

use marble_math::Vec3;
use marble_physics::{BodyKey, Collider, CollisionFilter, PhysicsMaterial, PhysicsWorld, RigidBody};

use crate::error::RaceError;
use crate::obstacle::{ObstacleInstance, ObstacleKind, DEFAULT_PALETTE};
use crate::random::{AmbientRandom, RandomSource, SeededRandom};

/// Depth of one segment along Z
pub const SEGMENT_DEPTH: f32 = 4.0;

/// Z coordinate past which the marble has finished a level of `count` obstacles
pub fn finish_line_z(count: u32) -> f32 {
    -(count as f32 * SEGMENT_DEPTH + 2.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Start,
    Obstacle(ObstacleKind),
    End,
}

/// One slice of the track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Z position of the segment center
    pub offset_z: f32,
}

impl Segment {
    pub fn origin(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.offset_z)
    }
}

/// The drawn segment sequence for one `(count, seed)`
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSpec {
    pub count: u32,
    pub seed: u64,
    pub segments: Vec<Segment>,
}

impl LevelSpec {
    /// Draw `count` obstacle kinds uniformly from `palette`
    ///
    /// An empty palette falls back to the default one.
    pub fn generate(
        count: u32,
        seed: u64,
        palette: &[ObstacleKind],
        random: &mut dyn RandomSource,
    ) -> Self {
        let palette = if palette.is_empty() {
            &DEFAULT_PALETTE[..]
        } else {
            palette
        };

        let mut segments = Vec::with_capacity(count as usize + 2);
        segments.push(Segment {
            kind: SegmentKind::Start,
            offset_z: 0.0,
        });
        for i in 0..count {
            let kind = palette[random.index(palette.len())];
            segments.push(Segment {
                kind: SegmentKind::Obstacle(kind),
                offset_z: -((i + 1) as f32) * SEGMENT_DEPTH,
            });
        }
        segments.push(Segment {
            kind: SegmentKind::End,
            offset_z: -((count + 1) as f32) * SEGMENT_DEPTH,
        });

        Self {
            count,
            seed,
            segments,
        }
    }

    /// Total number of segments including start and end
    pub fn length(&self) -> u32 {
        self.count + 2
    }

    /// The drawn obstacle kinds in track order
    pub fn obstacle_kinds(&self) -> Vec<ObstacleKind> {
        self.segments
            .iter()
            .filter_map(|s| match s.kind {
                SegmentKind::Obstacle(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }
}

/// Walls and the continuous floor around a track of `length` segments
fn bounds_bodies(length: u32) -> Vec<RigidBody> {
    let length = length as f32;
    let center_z = -(length * 2.0) + 2.0;
    let wall = |position: Vec3, collider: Collider| {
        RigidBody::fixed(position, collider)
            .with_material(PhysicsMaterial::OBSTACLE)
            .with_filter(CollisionFilter::wall())
    };

    vec![
        wall(
            Vec3::new(2.15, 0.75, center_z),
            Collider::cuboid(0.15, 0.75, 2.0 * length),
        ),
        wall(
            Vec3::new(-2.15, 0.75, center_z),
            Collider::cuboid(0.15, 0.75, 2.0 * length),
        ),
        wall(
            Vec3::new(0.0, 0.75, -(length * 4.0) + 2.0),
            Collider::cuboid(2.0, 0.75, 0.15),
        ),
        RigidBody::fixed(
            Vec3::new(0.0, -0.1, center_z),
            Collider::cuboid(2.0, 0.1, 2.0 * length),
        )
        .with_material(PhysicsMaterial::FLOOR)
        .with_filter(CollisionFilter::floor()),
    ]
}

/// A level's bodies, live in a physics world
pub struct Level {
    spec: LevelSpec,
    obstacles: Vec<ObstacleInstance>,
    bounds: Vec<BodyKey>,
}

impl Level {
    /// Create every obstacle and boundary body for `spec`
    pub fn build(spec: LevelSpec, physics: &mut PhysicsWorld, random: &mut dyn RandomSource) -> Self {
        let obstacles = spec
            .segments
            .iter()
            .filter_map(|segment| match segment.kind {
                SegmentKind::Obstacle(kind) => Some((kind, segment.origin())),
                _ => None,
            })
            .map(|(kind, origin)| ObstacleInstance::spawn(kind, origin, physics, random))
            .collect();
        let bounds = bounds_bodies(spec.length())
            .into_iter()
            .map(|body| physics.add_body(body))
            .collect();

        Self {
            spec,
            obstacles,
            bounds,
        }
    }

    pub fn spec(&self) -> &LevelSpec {
        &self.spec
    }

    pub fn obstacles(&self) -> &[ObstacleInstance] {
        &self.obstacles
    }

    pub fn bounds(&self) -> &[BodyKey] {
        &self.bounds
    }

    /// Set every obstacle's kinematic target for `elapsed` seconds
    pub fn advance(&self, elapsed: f32, physics: &mut PhysicsWorld) -> Result<(), RaceError> {
        for obstacle in &self.obstacles {
            if !obstacle.advance(elapsed, physics) {
                return Err(RaceError::MissingBody(obstacle.body()));
            }
        }
        Ok(())
    }

    /// Remove all of this level's bodies
    pub fn despawn(self, physics: &mut PhysicsWorld) {
        for obstacle in &self.obstacles {
            obstacle.despawn(physics);
        }
        for key in self.bounds {
            physics.remove_body(key);
        }
    }
}

/// Keeps the built level in step with `(blocks_count, blocks_seed)`
pub struct LevelGenerator {
    palette: Vec<ObstacleKind>,
    seeded: bool,
    random: Box<dyn RandomSource>,
    level: Option<Level>,
    built_for: Option<(u32, u64)>,
}

impl LevelGenerator {
    /// Create a generator
    ///
    /// With `seeded`, draws are keyed off the level seed and reproducible;
    /// otherwise every regeneration draws fresh kinds.
    pub fn new(palette: Vec<ObstacleKind>, seeded: bool) -> Self {
        Self::with_random(palette, seeded, Box::new(AmbientRandom::new()))
    }

    /// Create a generator drawing from a specific source (unless `seeded`)
    pub fn with_random(
        palette: Vec<ObstacleKind>,
        seeded: bool,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let palette = if palette.is_empty() {
            log::warn!("Empty obstacle palette, using the default one");
            DEFAULT_PALETTE.to_vec()
        } else {
            palette
        };
        Self {
            palette,
            seeded,
            random,
            level: None,
            built_for: None,
        }
    }

    pub fn palette(&self) -> &[ObstacleKind] {
        &self.palette
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// Rebuild the level if `count` or `seed` changed since the last build
    ///
    /// Returns true when a new level was built.
    pub fn sync(&mut self, count: u32, seed: u64, physics: &mut PhysicsWorld) -> bool {
        if self.built_for == Some((count, seed)) {
            return false;
        }

        if let Some(old) = self.level.take() {
            old.despawn(physics);
        }

        let mut keyed;
        let random: &mut dyn RandomSource = if self.seeded {
            keyed = SeededRandom::new(seed);
            &mut keyed
        } else {
            self.random.as_mut()
        };

        let spec = LevelSpec::generate(count, seed, &self.palette, random);
        log::info!(
            "Generated level: {} blocks, seed {}, kinds {:?}",
            count,
            seed,
            spec.obstacle_kinds()
        );
        self.level = Some(Level::build(spec, physics, random));
        self.built_for = Some((count, seed));
        true
    }

    /// Advance the current level's obstacles
    pub fn advance(&self, elapsed: f32, physics: &mut PhysicsWorld) -> Result<(), RaceError> {
        match &self.level {
            Some(level) => level.advance(elapsed, physics),
            None => Ok(()),
        }
    }
}
