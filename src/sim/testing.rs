//! Test double for [`PhysicsWorld`]
//!
//! Records every applied force and step, never moves anything on its own,
//! and delivers collision pairs queued by the test on the next step.

use glam::Vec2;

use super::world::{
    Body, BodyDesc, BodyHandle, BodyTag, CollisionGroup, CollisionPair, Constraint,
    ConstraintDesc, ConstraintHandle, PhysicsWorld,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    pub body: BodyHandle,
    pub point: Vec2,
    pub force: Vec2,
}

#[derive(Debug, Default)]
pub struct FakeWorld {
    pub bodies: Vec<Body>,
    pub constraints: Vec<Constraint>,
    pub forces: Vec<AppliedForce>,
    pub steps: Vec<f32>,
    pub gravity: Vec2,
    pub pending: Vec<CollisionPair>,
    groups: i32,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a body directly
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        self.bodies[handle.0 as usize].position = position;
    }

    /// Queue a collision-begin pair for the next step
    pub fn queue_collision(&mut self, a: BodyHandle, b: BodyHandle) {
        let pair = CollisionPair {
            a,
            a_tag: self.bodies[a.0 as usize].tag,
            b,
            b_tag: self.bodies[b.0 as usize].tag,
        };
        self.pending.push(pair);
    }

    /// Handles of every body with `tag`
    pub fn tagged(&self, tag: BodyTag) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .filter(|b| b.tag == tag)
            .map(|b| b.handle)
            .collect()
    }

    /// Forces applied to one body
    pub fn forces_on(&self, handle: BodyHandle) -> Vec<Vec2> {
        self.forces
            .iter()
            .filter(|f| f.body == handle)
            .map(|f| f.force)
            .collect()
    }
}

impl PhysicsWorld for FakeWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::from_desc(handle, desc, 0.001));
        handle
    }

    fn add_constraint(&mut self, desc: ConstraintDesc) -> ConstraintHandle {
        let handle = ConstraintHandle(self.constraints.len() as u32);
        let length = desc.length.unwrap_or_else(|| {
            match (self.attachment_point(&desc.a), self.attachment_point(&desc.b)) {
                (Some(a), Some(b)) => a.distance(b),
                _ => 0.0,
            }
        });
        self.constraints.push(Constraint {
            handle,
            a: desc.a,
            b: desc.b,
            stiffness: desc.stiffness,
            length,
        });
        handle
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0 as usize)
    }

    fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle.0 as usize)
    }

    fn next_group(&mut self, non_colliding: bool) -> CollisionGroup {
        self.groups += 1;
        CollisionGroup(if non_colliding { -self.groups } else { self.groups })
    }

    fn set_inverse_inertia(&mut self, handle: BodyHandle, inverse_inertia: f32) {
        self.bodies[handle.0 as usize].inverse_inertia = inverse_inertia;
    }

    fn apply_force(&mut self, handle: BodyHandle, world_point: Vec2, force: Vec2) {
        self.forces.push(AppliedForce {
            body: handle,
            point: world_point,
            force,
        });
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32, on_collision_start: &mut dyn FnMut(CollisionPair)) {
        self.steps.push(dt);
        for pair in self.pending.drain(..) {
            on_collision_start(pair);
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn bodies(&self) -> Vec<&Body> {
        self.bodies.iter().collect()
    }

    fn constraints(&self) -> Vec<&Constraint> {
        self.constraints.iter().collect()
    }
}
