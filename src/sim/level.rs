//! Course assembly
//!
//! A course is a start block, `count` hazard blocks and an end block laid
//! out along -Z, fenced by side walls and a back wall over one shared floor
//! collider. There is no wall behind the start block, so backing off it
//! drops the marble.

use std::fmt;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacle::{HazardKind, HazardSpec, ObstacleController};
use crate::block_position;
use crate::consts::*;
use crate::physics::{BodyDesc, BodyHandle, ColliderDesc, RigidBodyWorld};
use crate::vec3;

/// Errors that can occur when building a level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// No archetypes to pick hazards from
    NoHazardTypes,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NoHazardTypes => write!(f, "hazard type list is empty"),
        }
    }
}

impl std::error::Error for LevelError {}

/// What sits on a course block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    Start,
    Hazard(HazardSpec),
    End,
}

/// One block of the course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockPlacement {
    /// 0 = start, count + 1 = end
    pub index: u32,
    pub kind: BlockKind,
    /// Center of the block's top surface
    pub position: Vec3,
}

/// An axis-aligned box collider in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlacement {
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Walls and floor fencing the course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Course length in blocks (start + hazards + end)
    pub length: u32,
    pub right_wall: BoxPlacement,
    pub left_wall: BoxPlacement,
    pub back_wall: BoxPlacement,
    pub floor: BoxPlacement,
}

impl Bounds {
    pub fn new(length: u32) -> Self {
        let length_f = length as f32;
        // Blocks run from z = +2 (front edge of the start block) to
        // z = 2 - length * 4 (back edge of the end block).
        let center_z = -(length_f * BLOCK_LENGTH / 2.0) + BLOCK_LENGTH / 2.0;
        let half_length = length_f * BLOCK_LENGTH / 2.0;
        let wall_y = WALL_HEIGHT / 2.0;
        let side = Vec3::new(WALL_THICKNESS / 2.0, WALL_HEIGHT / 2.0, half_length);

        Self {
            length,
            right_wall: BoxPlacement {
                center: Vec3::new(WALL_OFFSET_X, wall_y, center_z),
                half_extents: side,
            },
            left_wall: BoxPlacement {
                center: Vec3::new(-WALL_OFFSET_X, wall_y, center_z),
                half_extents: side,
            },
            back_wall: BoxPlacement {
                center: Vec3::new(0.0, wall_y, -(length_f * BLOCK_LENGTH) + BLOCK_LENGTH / 2.0),
                half_extents: Vec3::new(BLOCK_HALF_WIDTH, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0),
            },
            floor: BoxPlacement {
                center: Vec3::new(0.0, -FLOOR_THICKNESS / 2.0, center_z),
                half_extents: Vec3::new(BLOCK_HALF_WIDTH, FLOOR_THICKNESS / 2.0, half_length),
            },
        }
    }

    /// Single fixed body carrying every wall and the floor
    pub fn body_desc(&self) -> BodyDesc {
        let wall = |b: &BoxPlacement| {
            ColliderDesc::cuboid(b.half_extents)
                .with_offset(b.center)
                .with_material(SURFACE_RESTITUTION, HAZARD_FRICTION)
        };
        BodyDesc::fixed(Vec3::ZERO)
            .with_collider(wall(&self.right_wall))
            .with_collider(wall(&self.left_wall))
            .with_collider(wall(&self.back_wall))
            .with_collider(
                ColliderDesc::cuboid(self.floor.half_extents)
                    .with_offset(self.floor.center)
                    .with_material(SURFACE_RESTITUTION, FLOOR_FRICTION),
            )
    }
}

/// Complete placement of one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub seed: u64,
    /// Start, hazards in course order, end
    pub blocks: Vec<BlockPlacement>,
    pub bounds: Bounds,
}

impl LevelLayout {
    pub fn start(&self) -> &BlockPlacement {
        &self.blocks[0]
    }

    pub fn end(&self) -> &BlockPlacement {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn hazard_count(&self) -> usize {
        self.hazards().count()
    }

    /// Hazard blocks in course order
    pub fn hazards(&self) -> impl Iterator<Item = (&BlockPlacement, HazardSpec)> {
        self.blocks.iter().filter_map(|b| match b.kind {
            BlockKind::Hazard(spec) => Some((b, spec)),
            _ => None,
        })
    }

    pub fn hazard_kinds(&self) -> Vec<HazardKind> {
        self.hazards().map(|(_, spec)| spec.kind()).collect()
    }
}

/// Build a course of `count` hazard blocks.
///
/// Archetype and parameter are drawn per slot, in slot order, from a
/// generator seeded with `seed`, so equal inputs give equal courses.
pub fn build(count: u32, hazard_types: &[HazardKind], seed: u64) -> Result<LevelLayout, LevelError> {
    if hazard_types.is_empty() {
        return Err(LevelError::NoHazardTypes);
    }

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut blocks = Vec::with_capacity(count as usize + 2);

    blocks.push(BlockPlacement {
        index: 0,
        kind: BlockKind::Start,
        position: block_position(0),
    });

    for index in 1..=count {
        let kind = hazard_types[rng.random_range(0..hazard_types.len())];
        let spec = HazardSpec::sample(kind, &mut rng);
        blocks.push(BlockPlacement {
            index,
            kind: BlockKind::Hazard(spec),
            position: block_position(index),
        });
    }

    blocks.push(BlockPlacement {
        index: count + 1,
        kind: BlockKind::End,
        position: block_position(count + 1),
    });

    let layout = LevelLayout {
        seed,
        blocks,
        bounds: Bounds::new(count + 2),
    };
    log::debug!(
        "Built course seed={} hazards={:?}",
        seed,
        layout.hazard_kinds()
    );
    Ok(layout)
}

/// Bodies a layout put into the world
#[derive(Debug, Default)]
pub struct SpawnedLevel {
    pub bounds: Option<BodyHandle>,
    pub trophy: Option<BodyHandle>,
    pub obstacles: Vec<ObstacleController>,
}

impl SpawnedLevel {
    pub fn spawn(layout: &LevelLayout, world: &mut dyn RigidBodyWorld) -> Self {
        let bounds = world.create_body(&layout.bounds.body_desc());

        let trophy = world.create_body(
            &BodyDesc::fixed(layout.end().position + Vec3::Y * TROPHY_HEIGHT).with_collider(
                ColliderDesc::cuboid(vec3(TROPHY_HALF_EXTENTS)).with_material(SURFACE_RESTITUTION, HAZARD_FRICTION),
            ),
        );

        let obstacles = layout
            .hazards()
            .map(|(block, spec)| {
                let mut obstacle = ObstacleController::new(spec, block.position);
                obstacle.spawn(world);
                obstacle
            })
            .collect();

        Self {
            bounds: Some(bounds),
            trophy: Some(trophy),
            obstacles,
        }
    }

    /// Remove every body this level created
    pub fn despawn(&mut self, world: &mut dyn RigidBodyWorld) {
        for obstacle in &mut self.obstacles {
            if let Some(body) = obstacle.detach() {
                world.remove_body(body);
            }
        }
        self.obstacles.clear();
        for body in [self.bounds.take(), self.trophy.take()].into_iter().flatten() {
            world.remove_body(body);
        }
    }

    /// Push every hazard's pose for time `t`
    pub fn tick(&self, world: &mut dyn RigidBodyWorld, t: f32) {
        for obstacle in &self.obstacles {
            obstacle.tick(world, t);
        }
    }
}

/// Course cache: rebuilds only when count, hazard types or seed change
pub struct Level {
    hazard_types: Vec<HazardKind>,
    layout: Option<LevelLayout>,
    spawned: SpawnedLevel,
    builds: u32,
}

impl Level {
    pub fn new(hazard_types: Vec<HazardKind>) -> Result<Self, LevelError> {
        if hazard_types.is_empty() {
            return Err(LevelError::NoHazardTypes);
        }
        Ok(Self {
            hazard_types,
            layout: None,
            spawned: SpawnedLevel::default(),
            builds: 0,
        })
    }

    pub fn layout(&self) -> Option<&LevelLayout> {
        self.layout.as_ref()
    }

    pub fn spawned(&self) -> &SpawnedLevel {
        &self.spawned
    }

    /// How many times the course was actually rebuilt
    pub fn builds(&self) -> u32 {
        self.builds
    }

    pub fn set_hazard_types(&mut self, hazard_types: Vec<HazardKind>) -> Result<(), LevelError> {
        if hazard_types.is_empty() {
            return Err(LevelError::NoHazardTypes);
        }
        if hazard_types != self.hazard_types {
            self.hazard_types = hazard_types;
            // Force the next ensure() to rebuild
            self.layout = None;
        }
        Ok(())
    }

    /// Make sure the world holds the course for (`count`, `seed`).
    /// Returns true when it had to rebuild.
    pub fn ensure(
        &mut self,
        count: u32,
        seed: u64,
        world: &mut dyn RigidBodyWorld,
    ) -> Result<bool, LevelError> {
        let current = self
            .layout
            .as_ref()
            .is_some_and(|l| l.seed == seed && l.hazard_count() == count as usize);
        if current {
            return Ok(false);
        }

        let layout = build(count, &self.hazard_types, seed)?;
        self.spawned.despawn(world);
        self.spawned = SpawnedLevel::spawn(&layout, world);
        self.builds += 1;
        log::info!(
            "Course ready: {} hazard blocks, seed {}, finish at z={}",
            count,
            seed,
            crate::finish_line_z(count)
        );
        self.layout = Some(layout);
        Ok(true)
    }

    pub fn tick(&self, world: &mut dyn RigidBodyWorld, t: f32) {
        self.spawned.tick(world, t);
    }
}
