//! Chain tether between the diver and the anchor rock
//!
//! Links are laid out end to end along a straight line from the attachment
//! point. Neighbouring links are pinned end-to-end with rigid zero-length
//! constraints; the first link hangs from the diver and the last link holds
//! the rock through softer constraints, which gives the chain its sway.
//!
//! After construction the physics world owns the motion. The tether only
//! remembers handles so the session can read positions and push the rock.

use glam::Vec2;

use super::world::{
    Attachment, BodyDesc, BodyHandle, BodyTag, CollisionGroup, ConstraintDesc, ConstraintHandle,
    PhysicsWorld,
};
use crate::error::SimError;
use crate::tuning::Tuning;

/// Shape and stiffness of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSpec {
    pub link_count: usize,
    pub link_length: f32,
    pub link_thickness: f32,
    /// Stiffness between neighbouring links
    pub link_stiffness: f32,
    /// Rest length between neighbouring link ends
    pub link_rest_length: f32,
    /// Stiffness of the diver and rock attachments
    pub attach_stiffness: f32,
    /// Direction the chain is laid out in
    pub direction: Vec2,
}

impl ChainSpec {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            link_count: tuning.chain_links,
            link_length: tuning.chain_link_length,
            link_thickness: tuning.chain_link_thickness,
            link_stiffness: tuning.chain_link_stiffness,
            link_rest_length: 0.0,
            attach_stiffness: tuning.chain_attach_stiffness,
            direction: Vec2::Y,
        }
    }

    /// Total unstretched length of the links
    pub fn span(&self) -> f32 {
        self.link_count as f32 * self.link_length
    }

    fn validate(&self) -> Result<Vec2, SimError> {
        if self.link_count == 0 {
            return Err(SimError::invalid("link_count", 0.0, "at least 1"));
        }
        if self.link_length <= 0.0 {
            return Err(SimError::invalid("link_length", self.link_length, "greater than 0"));
        }
        if self.link_thickness <= 0.0 {
            return Err(SimError::invalid(
                "link_thickness",
                self.link_thickness,
                "greater than 0",
            ));
        }
        let dir = self.direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            return Err(SimError::invalid("direction", 0.0, "a non-zero vector"));
        }
        Ok(dir)
    }
}

/// Bodies and constraints of a straight run of linked segments
#[derive(Debug, Clone)]
pub struct SegmentRun {
    pub bodies: Vec<BodyHandle>,
    pub constraints: Vec<ConstraintHandle>,
}

/// Lay `spec.link_count` segments end to end from `start` and chain them
///
/// Each segment's local x axis points along the run, so its leading end is
/// at `(-length/2, 0)` and its trailing end at `(length/2, 0)`.
pub fn build_segment_run<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    start: Vec2,
    spec: &ChainSpec,
    tag: BodyTag,
    group: CollisionGroup,
) -> Result<SegmentRun, SimError> {
    let dir = spec.validate()?;
    let angle = dir.y.atan2(dir.x);
    let half = spec.link_length / 2.0;

    let bodies: Vec<BodyHandle> = (0..spec.link_count)
        .map(|i| {
            let center = start + dir * (spec.link_length * (i as f32 + 0.5));
            world.add_body(
                BodyDesc::rectangle(center, spec.link_length, spec.link_thickness, tag)
                    .with_angle(angle)
                    .with_group(group),
            )
        })
        .collect();

    let constraints = bodies
        .windows(2)
        .map(|pair| {
            world.add_constraint(
                ConstraintDesc::new(
                    Attachment::body(pair[0], Vec2::new(half, 0.0)),
                    Attachment::body(pair[1], Vec2::new(-half, 0.0)),
                    spec.link_stiffness,
                )
                .with_length(spec.link_rest_length),
            )
        })
        .collect();

    Ok(SegmentRun {
        bodies,
        constraints,
    })
}

/// Chain linking the diver to the anchor rock
#[derive(Debug, Clone)]
pub struct Tether {
    pub diver: BodyHandle,
    pub anchor: BodyHandle,
    pub links: Vec<BodyHandle>,
    pub group: CollisionGroup,
    pub link_constraints: Vec<ConstraintHandle>,
    pub diver_attachment: ConstraintHandle,
    pub anchor_attachment: ConstraintHandle,
}

impl Tether {
    /// Build a chain hanging from `attach_offset` on an existing diver body
    ///
    /// Links join `group`, which should be a non-colliding group, so adjacent
    /// segments never push each other apart.
    pub fn build<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        diver: BodyHandle,
        attach_offset: Vec2,
        anchor_radius: f32,
        group: CollisionGroup,
        spec: &ChainSpec,
    ) -> Result<Self, SimError> {
        let dir = spec.validate()?;
        if anchor_radius <= 0.0 {
            return Err(SimError::invalid("anchor_radius", anchor_radius, "greater than 0"));
        }
        let attach_point = world
            .body(diver)
            .ok_or(SimError::UnknownBody { handle: diver.0 })?
            .world_point(attach_offset);

        let run = build_segment_run(world, attach_point, spec, BodyTag::ChainLink, group)?;
        let first = run.bodies[0];
        let last = run.bodies[run.bodies.len() - 1];

        // Hang the first link by its centre; rest length is the current gap
        let diver_attachment = world.add_constraint(ConstraintDesc::new(
            Attachment::body(diver, attach_offset),
            Attachment::body(first, Vec2::ZERO),
            spec.attach_stiffness,
        ));

        let chain_end = attach_point + dir * spec.span();
        // Contacts are bounding circles; the rock's would overlap the last link
        // it is pinned to, so it shares the links' group
        let anchor = world.add_body(
            BodyDesc::circle(chain_end + dir * anchor_radius, anchor_radius, BodyTag::AnchorWeight)
                .with_group(group),
        );
        let anchor_attachment = world.add_constraint(ConstraintDesc::new(
            Attachment::body(last, Vec2::new(spec.link_length / 2.0, 0.0)),
            Attachment::body(anchor, -dir * anchor_radius),
            spec.attach_stiffness,
        ));

        log::debug!(
            "Built tether: {} links, {} constraints",
            run.bodies.len(),
            run.constraints.len() + 2
        );

        Ok(Self {
            diver,
            anchor,
            links: run.bodies,
            group,
            link_constraints: run.constraints,
            diver_attachment,
            anchor_attachment,
        })
    }

    /// Spawn the diver body and its chain and rock
    ///
    /// The diver starts with locked rotation; [`Tether::release_rotation`]
    /// gives it finite inertia later.
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        position: Vec2,
        tuning: &Tuning,
    ) -> Result<Self, SimError> {
        if tuning.diver_width <= 0.0 || tuning.diver_height <= 0.0 {
            return Err(SimError::invalid(
                "diver_size",
                tuning.diver_width.min(tuning.diver_height),
                "greater than 0",
            ));
        }
        log::info!("Spawning diver at ({:.0}, {:.0})", position.x, position.y);
        // Diver joins the chain's group: its bounding circle covers the feet
        // where the first link hangs
        let group = world.next_group(true);
        let diver = world.add_body(
            BodyDesc::rectangle(position, tuning.diver_width, tuning.diver_height, BodyTag::Diver)
                .with_air_friction(tuning.diver_air_friction)
                .with_group(group)
                .with_fixed_rotation(),
        );
        let feet = Vec2::new(0.0, tuning.diver_height / 2.0);
        Self::build(
            world,
            diver,
            feet,
            tuning.anchor_radius,
            group,
            &ChainSpec::from_tuning(tuning),
        )
    }

    /// Every constraint belonging to the tether
    pub fn constraints(&self) -> Vec<ConstraintHandle> {
        let mut all = Vec::with_capacity(self.link_constraints.len() + 2);
        all.push(self.diver_attachment);
        all.extend(self.link_constraints.iter().copied());
        all.push(self.anchor_attachment);
        all
    }

    /// Give the diver finite rotational inertia
    pub fn release_rotation<W: PhysicsWorld + ?Sized>(&self, world: &mut W, inertia: f32) {
        if inertia > 0.0 {
            world.set_inverse_inertia(self.diver, 1.0 / inertia);
            log::info!("Diver rotation released (inertia {})", inertia);
        }
    }

    /// Push the rock upward by `force`
    pub fn apply_anchor_buoyancy<W: PhysicsWorld + ?Sized>(&self, world: &mut W, force: f32) {
        if force == 0.0 {
            return;
        }
        if let Some(position) = world.body(self.anchor).map(|b| b.position) {
            world.apply_force(self.anchor, position, Vec2::new(0.0, -force));
        }
    }

    /// World positions of the link centres, diver end first
    pub fn link_positions<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec<Vec2> {
        self.links
            .iter()
            .filter_map(|h| world.body(*h).map(|b| b.position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::SimpleWorld;
    use crate::sim::testing::FakeWorld;
    use proptest::prelude::*;

    fn spec(link_count: usize) -> ChainSpec {
        ChainSpec {
            link_count,
            ..ChainSpec::from_tuning(&Tuning::default())
        }
    }

    fn diver(world: &mut FakeWorld) -> BodyHandle {
        world.add_body(
            BodyDesc::rectangle(Vec2::ZERO, 24.0, 36.0, BodyTag::Diver).with_fixed_rotation(),
        )
    }

    #[test]
    fn test_single_link_chain() {
        let mut world = FakeWorld::new();
        let diver = diver(&mut world);
        let group = world.next_group(true);
        let tether =
            Tether::build(&mut world, diver, Vec2::new(0.0, 18.0), 15.0, group, &spec(1)).unwrap();
        assert_eq!(tether.links.len(), 1);
        assert!(tether.link_constraints.is_empty());
        assert_eq!(tether.constraints().len(), 2);
        assert_eq!(world.tagged(BodyTag::AnchorWeight), vec![tether.anchor]);
    }

    #[test]
    fn test_links_laid_downward_and_grouped() {
        let mut world = FakeWorld::new();
        let diver = diver(&mut world);
        let group = world.next_group(true);
        let tether =
            Tether::build(&mut world, diver, Vec2::new(0.0, 18.0), 15.0, group, &spec(8)).unwrap();
        let positions = tether.link_positions(&world);
        assert_eq!(positions[0], Vec2::new(0.0, 23.0));
        assert!(positions.windows(2).all(|w| w[1].y > w[0].y && w[1].x == 0.0));
        for link in &tether.links {
            assert_eq!(world.body(*link).unwrap().group, group);
        }
        assert_eq!(world.body(tether.anchor).unwrap().group, group);
        assert!(!group.can_collide(group));
    }

    #[test]
    fn test_stiffness_layout() {
        let mut world = FakeWorld::new();
        let diver = diver(&mut world);
        let group = world.next_group(true);
        let tether =
            Tether::build(&mut world, diver, Vec2::new(0.0, 18.0), 15.0, group, &spec(4)).unwrap();
        for handle in &tether.link_constraints {
            let c = world.constraint(*handle).unwrap();
            assert_eq!(c.stiffness, 1.0);
            assert_eq!(c.length, 0.0);
        }
        let top = world.constraint(tether.diver_attachment).unwrap();
        assert_eq!(top.stiffness, 0.5);
        assert_eq!(top.a.body, Some(diver));
        let bottom = world.constraint(tether.anchor_attachment).unwrap();
        assert_eq!(bottom.b.body, Some(tether.anchor));
        assert!(bottom.length.abs() < 1e-4);
    }

    #[test]
    fn test_zero_links_rejected() {
        let mut world = FakeWorld::new();
        let diver = diver(&mut world);
        let group = world.next_group(true);
        let result = Tether::build(&mut world, diver, Vec2::ZERO, 15.0, group, &spec(0));
        assert!(matches!(result, Err(SimError::InvalidParameter { .. })));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_negative_anchor_radius_rejected() {
        let mut world = FakeWorld::new();
        let diver = diver(&mut world);
        let result = Tether::build(&mut world, diver, Vec2::ZERO, -1.0, CollisionGroup(-1), &spec(3));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_diver_rejected() {
        let mut world = FakeWorld::new();
        let result = Tether::build(&mut world, BodyHandle(9), Vec2::ZERO, 5.0, CollisionGroup(-1), &spec(3));
        assert!(matches!(result, Err(SimError::UnknownBody { handle: 9 })));
    }

    #[test]
    fn test_spawn_locks_rotation_until_released() {
        let mut world = FakeWorld::new();
        let tether = Tether::spawn(&mut world, Vec2::new(100.0, 100.0), &Tuning::default()).unwrap();
        assert_eq!(world.body(tether.diver).unwrap().inverse_inertia, 0.0);
        assert_eq!(world.body(tether.diver).unwrap().group, tether.group);
        tether.release_rotation(&mut world, 200.0);
        assert_eq!(world.body(tether.diver).unwrap().inverse_inertia, 1.0 / 200.0);
    }

    #[test]
    fn test_locked_diver_still_drags_chain() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let tether = Tether::spawn(&mut world, Vec2::ZERO, &Tuning::default()).unwrap();
        let rock_before = world.body(tether.anchor).unwrap().position;
        for _ in 0..60 {
            let pos = world.body(tether.diver).unwrap().position;
            world.apply_force(tether.diver, pos, Vec2::new(0.0, -0.002));
            world.step(16.0, &mut |_| {});
        }
        let rock_after = world.body(tether.anchor).unwrap().position;
        assert_eq!(world.body(tether.diver).unwrap().angle, 0.0);
        assert!(rock_after.y < rock_before.y, "rock did not follow: {:?}", rock_after);
    }

    #[test]
    fn test_buoyancy_pushes_rock_up() {
        let mut world = FakeWorld::new();
        let tether = Tether::spawn(&mut world, Vec2::ZERO, &Tuning::default()).unwrap();
        tether.apply_anchor_buoyancy(&mut world, 0.01);
        assert_eq!(world.forces_on(tether.anchor), vec![Vec2::new(0.0, -0.01)]);
    }

    proptest! {
        #[test]
        fn prop_link_and_constraint_counts(n in 1usize..40) {
            let mut world = FakeWorld::new();
            let tether = Tether::spawn(&mut world, Vec2::ZERO, &Tuning {
                chain_links: n,
                ..Default::default()
            }).unwrap();
            prop_assert_eq!(tether.links.len(), n);
            prop_assert_eq!(world.tagged(BodyTag::ChainLink).len(), n);
            prop_assert_eq!(tether.link_constraints.len(), n - 1);
            prop_assert_eq!(tether.constraints().len(), n + 1);
            prop_assert_eq!(world.constraints.len(), n + 1);
        }
    }
}
