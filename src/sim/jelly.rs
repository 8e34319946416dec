//! Jellyfish: a trapezoid head trailing stinging tentacles
//!
//! Tentacles reuse the chain segment builder with a looser joint, and each
//! hangs from its own point along the head. Heads drift by taking an
//! occasional small kick along their facing direction.

use glam::Vec2;
use rand::Rng;

use super::chain::{ChainSpec, build_segment_run};
use super::world::{Attachment, BodyDesc, BodyHandle, BodyTag, ConstraintDesc, PhysicsWorld};
use crate::consts::JELLY_WIDTH;
use crate::error::SimError;
use crate::rotate;

const HEAD_HEIGHT: f32 = 10.0;
/// Half of a π/6 slope: each side of the top edge is inset by this fraction of the width
const HEAD_SLOPE: f32 = std::f32::consts::PI / 6.0 / 2.0;
const TENTACLES: usize = 3;
const TENTACLE_SEGMENTS: usize = 8;
const SEGMENT_LENGTH: f32 = 5.0;
const SEGMENT_THICKNESS: f32 = 2.0;
const SEGMENT_STIFFNESS: f32 = 0.8;
const SEGMENT_REST_LENGTH: f32 = 2.0;
const ROOT_STIFFNESS: f32 = 0.5;

/// One jellyfish in the world
#[derive(Debug, Clone)]
pub struct Jelly {
    pub head: BodyHandle,
    pub tentacles: Vec<Vec<BodyHandle>>,
}

impl Jelly {
    /// Build a jellyfish with its head centred at `position`
    pub fn spawn<W: PhysicsWorld + ?Sized>(world: &mut W, position: Vec2) -> Result<Self, SimError> {
        let head = world.add_body(BodyDesc::trapezoid(
            position,
            JELLY_WIDTH,
            HEAD_HEIGHT,
            HEAD_SLOPE,
            BodyTag::JellyHead,
        ));

        let spec = ChainSpec {
            link_count: TENTACLE_SEGMENTS,
            link_length: SEGMENT_LENGTH,
            link_thickness: SEGMENT_THICKNESS,
            link_stiffness: SEGMENT_STIFFNESS,
            link_rest_length: SEGMENT_REST_LENGTH,
            attach_stiffness: ROOT_STIFFNESS,
            direction: Vec2::Y,
        };

        let mut tentacles = Vec::with_capacity(TENTACLES);
        for i in 0..TENTACLES {
            let p = i as f32 / (TENTACLES - 1) as f32;
            let join = Vec2::new((p - 0.5) * JELLY_WIDTH * 0.5, 0.0);
            let group = world.next_group(false);
            let run = build_segment_run(world, position + join, &spec, BodyTag::TentacleSegment, group)?;
            world.add_constraint(ConstraintDesc::new(
                Attachment::body(head, join),
                Attachment::body(run.bodies[0], Vec2::ZERO),
                ROOT_STIFFNESS,
            ));
            tentacles.push(run.bodies);
        }

        Ok(Self { head, tentacles })
    }

    /// Maybe give the head a push along its facing direction
    pub fn wander<W: PhysicsWorld + ?Sized, R: Rng + ?Sized>(
        &self,
        world: &mut W,
        rng: &mut R,
        chance: f64,
        force: f32,
    ) -> bool {
        if !rng.random_bool(chance) {
            return false;
        }
        let Some((position, angle)) = world.body(self.head).map(|b| (b.position, b.angle)) else {
            return false;
        };
        world.apply_force(self.head, position, rotate(Vec2::new(0.0, -force), angle));
        true
    }

    /// Every tentacle segment handle
    pub fn segments(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.tentacles.iter().flatten().copied()
    }
}

/// Scatter `count` jellyfish uniformly over a `width` x `height` area
pub fn spawn_swarm<W: PhysicsWorld + ?Sized, R: Rng + ?Sized>(
    world: &mut W,
    rng: &mut R,
    count: usize,
    width: f32,
    height: f32,
) -> Result<Vec<Jelly>, SimError> {
    let swarm = (0..count)
        .map(|_| {
            let pos = Vec2::new(rng.random_range(0.0..=width), rng.random_range(0.0..=height));
            Jelly::spawn(world, pos)
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Spawned {} jellyfish", swarm.len());
    Ok(swarm)
}
