//! Reference physics engine
//!
//! A small position-based solver implementing [`PhysicsWorld`]:
//! 1. Integrate forces and gravity into velocities (semi-implicit Euler)
//! 2. Move bodies, remembering where they started
//! 3. Relax distance constraints, with angular response at offset anchors
//! 4. Separate overlapping bounding circles and report new contacts
//! 5. Derive velocities from the corrected displacement
//!
//! It is deliberately narrow: contacts use bounding circles, there is no
//! friction or restitution model, and static bodies never move.

use std::collections::HashSet;

use glam::Vec2;

use super::world::{
    Attachment, Body, BodyDesc, BodyHandle, CollisionGroup, CollisionPair, Constraint,
    ConstraintDesc, ConstraintHandle, PhysicsWorld,
};
use crate::consts::{BASE_STEP_MS, BODY_DENSITY, GRAVITY_Y, MIN_TICK_DT};
use crate::{cross, rotate};

/// Constraint relaxation passes per step
pub const CONSTRAINT_ITERATIONS: u32 = 4;

/// Steps longer than this are clamped (tab switches, debugger pauses)
pub const MAX_STEP_MS: f32 = 50.0;

/// Position-based rigid-body world
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    bodies: Vec<Body>,
    constraints: Vec<Constraint>,
    forces: Vec<(Vec2, f32)>,
    gravity: Vec2,
    density: f32,
    next_group: i32,
    /// Pairs (lower handle first) touching at the end of the last step
    contacts: HashSet<(u32, u32)>,
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, GRAVITY_Y), BODY_DENSITY)
    }
}

impl SimpleWorld {
    pub fn new(gravity: Vec2, density: f32) -> Self {
        Self {
            bodies: Vec::new(),
            constraints: Vec::new(),
            forces: Vec::new(),
            gravity,
            density,
            next_group: 0,
            contacts: HashSet::new(),
        }
    }

    fn integrate(&mut self, dt: f32) -> Vec<(Vec2, f32)> {
        let gravity = self.gravity;
        let mut previous = Vec::with_capacity(self.bodies.len());
        for (body, (force, torque)) in self.bodies.iter_mut().zip(self.forces.iter_mut()) {
            previous.push((body.position, body.angle));
            if body.is_static {
                *force = Vec2::ZERO;
                *torque = 0.0;
                continue;
            }
            body.velocity += (gravity + *force * body.inverse_mass) * dt;
            body.angular_velocity += *torque * body.inverse_inertia * dt;

            let damping = (1.0 - body.air_friction).clamp(0.0, 1.0).powf(dt / BASE_STEP_MS);
            body.velocity *= damping;
            body.angular_velocity *= damping;

            body.position += body.velocity * dt;
            body.angle += body.angular_velocity * dt;

            *force = Vec2::ZERO;
            *torque = 0.0;
        }
        previous
    }

    fn solve_constraints(&mut self) {
        for _ in 0..CONSTRAINT_ITERATIONS {
            for i in 0..self.constraints.len() {
                let constraint = self.constraints[i];
                self.solve_constraint(&constraint);
            }
        }
    }

    fn solve_constraint(&mut self, constraint: &Constraint) {
        let (pa, ra, wa_mass, wa_inertia) = self.anchor_state(&constraint.a);
        let (pb, rb, wb_mass, wb_inertia) = self.anchor_state(&constraint.b);

        let delta = pb - pa;
        let dist = delta.length();
        if dist < f32::EPSILON {
            return;
        }
        let n = delta / dist;
        let error = dist - constraint.length;

        let wa = wa_mass + wa_inertia * cross(ra, n).powi(2);
        let wb = wb_mass + wb_inertia * cross(rb, n).powi(2);
        let w = wa + wb;
        if w <= 0.0 {
            return;
        }
        let impulse = n * (error * constraint.stiffness / w);

        if let Some(body) = constraint.a.body.and_then(|h| self.bodies.get_mut(h.0 as usize)) {
            body.position += impulse * wa_mass;
            body.angle += wa_inertia * cross(ra, impulse);
        }
        if let Some(body) = constraint.b.body.and_then(|h| self.bodies.get_mut(h.0 as usize)) {
            body.position -= impulse * wb_mass;
            body.angle -= wb_inertia * cross(rb, impulse);
        }
    }

    /// World anchor, lever arm, inverse mass and inverse inertia of one end
    fn anchor_state(&self, attachment: &Attachment) -> (Vec2, Vec2, f32, f32) {
        match attachment.body.and_then(|h| self.bodies.get(h.0 as usize)) {
            Some(body) => {
                let r = rotate(attachment.point, body.angle);
                (body.position + r, r, body.inverse_mass, body.inverse_inertia)
            }
            None => (attachment.point, Vec2::ZERO, 0.0, 0.0),
        }
    }

    fn resolve_contacts(&mut self, on_collision_start: &mut dyn FnMut(CollisionPair)) {
        let mut touching = HashSet::new();
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if (a.is_static && b.is_static) || !a.group.can_collide(b.group) {
                    continue;
                }
                let reach = a.shape.bounding_radius() + b.shape.bounding_radius();
                let delta = b.position - a.position;
                let dist_sq = delta.length_squared();
                if dist_sq >= reach * reach {
                    continue;
                }

                let key = (a.handle.0, b.handle.0);
                touching.insert(key);
                if !self.contacts.contains(&key) {
                    on_collision_start(CollisionPair {
                        a: a.handle,
                        a_tag: a.tag,
                        b: b.handle,
                        b_tag: b.tag,
                    });
                }

                let w = a.inverse_mass + b.inverse_mass;
                if w <= 0.0 {
                    continue;
                }
                let dist = dist_sq.sqrt();
                let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
                let correction = normal * ((reach - dist) / w);
                let (wa, wb) = (a.inverse_mass, b.inverse_mass);
                self.bodies[i].position -= correction * wa;
                self.bodies[j].position += correction * wb;
            }
        }
        self.contacts = touching;
    }
}

impl PhysicsWorld for SimpleWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::from_desc(handle, desc, self.density));
        self.forces.push((Vec2::ZERO, 0.0));
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
            stiffness: desc.stiffness.clamp(0.0, 1.0),
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
        self.next_group += 1;
        if non_colliding {
            CollisionGroup(-self.next_group)
        } else {
            CollisionGroup(self.next_group)
        }
    }

    fn set_inverse_inertia(&mut self, handle: BodyHandle, inverse_inertia: f32) {
        if let Some(body) = self.bodies.get_mut(handle.0 as usize) {
            body.inverse_inertia = inverse_inertia.max(0.0);
            if body.inverse_inertia == 0.0 {
                body.angular_velocity = 0.0;
            }
        }
    }

    fn apply_force(&mut self, handle: BodyHandle, world_point: Vec2, force: Vec2) {
        let index = handle.0 as usize;
        if let (Some(body), Some(slot)) = (self.bodies.get(index), self.forces.get_mut(index)) {
            slot.0 += force;
            slot.1 += cross(world_point - body.position, force);
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32, on_collision_start: &mut dyn FnMut(CollisionPair)) {
        let dt = dt.clamp(0.0, MAX_STEP_MS);
        if dt <= 0.0 {
            return;
        }
        let previous = self.integrate(dt);
        self.solve_constraints();
        self.resolve_contacts(on_collision_start);

        // Velocity from the corrected displacement keeps constraints from
        // pumping energy into the system.
        let inv_dt = 1.0 / dt.max(MIN_TICK_DT);
        for (body, (pos, angle)) in self.bodies.iter_mut().zip(previous) {
            if body.is_static {
                continue;
            }
            body.velocity = (body.position - pos) * inv_dt;
            body.angular_velocity = (body.angle - angle) * inv_dt;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::BodyTag;

    fn no_events(_: CollisionPair) {}

    #[test]
    fn test_gravity_pulls_down() {
        let mut world = SimpleWorld::new(Vec2::new(0.0, 0.001), 0.001);
        let ball = world.add_body(BodyDesc::circle(Vec2::ZERO, 5.0, BodyTag::AnchorWeight));
        for _ in 0..10 {
            world.step(16.0, &mut no_events);
        }
        assert!(world.body(ball).unwrap().position.y > 0.0);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut world = SimpleWorld::default();
        let rock = world.add_body(
            BodyDesc::rectangle(Vec2::new(0.0, 100.0), 50.0, 10.0, BodyTag::Terrain).into_static(),
        );
        world.apply_force(rock, Vec2::new(0.0, 100.0), Vec2::new(1.0, 1.0));
        world.step(16.0, &mut no_events);
        assert_eq!(world.body(rock).unwrap().position, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_rigid_constraint_holds_length() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let pin = Attachment::world(Vec2::ZERO);
        let bob = world.add_body(BodyDesc::circle(Vec2::new(20.0, 0.0), 2.0, BodyTag::ChainLink));
        let rope = world.add_constraint(ConstraintDesc::new(pin, Attachment::body(bob, Vec2::ZERO), 1.0));
        assert_eq!(world.constraint(rope).unwrap().length, 20.0);

        world.apply_force(bob, Vec2::new(20.0, 0.0), Vec2::new(0.05, 0.0));
        world.step(16.0, &mut no_events);
        let dist = world.body(bob).unwrap().position.length();
        assert!((dist - 20.0).abs() < 0.01, "distance drifted to {}", dist);
    }

    #[test]
    fn test_offset_force_spins_body() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let plank = world.add_body(BodyDesc::rectangle(Vec2::ZERO, 20.0, 4.0, BodyTag::ChainLink));
        world.apply_force(plank, Vec2::new(10.0, 0.0), Vec2::new(0.0, 0.001));
        world.step(16.0, &mut no_events);
        assert!(world.body(plank).unwrap().angular_velocity > 0.0);
    }

    #[test]
    fn test_locked_rotation_ignores_torque() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let diver = world.add_body(
            BodyDesc::rectangle(Vec2::ZERO, 24.0, 36.0, BodyTag::Diver).with_fixed_rotation(),
        );
        world.apply_force(diver, Vec2::new(12.0, 0.0), Vec2::new(0.0, 0.01));
        world.step(16.0, &mut no_events);
        let body = world.body(diver).unwrap();
        assert_eq!(body.angle, 0.0);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn test_collision_start_reported_once() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let a = world.add_body(BodyDesc::circle(Vec2::ZERO, 5.0, BodyTag::Diver).into_static());
        let b = world.add_body(BodyDesc::circle(Vec2::new(8.0, 0.0), 5.0, BodyTag::TentacleSegment));
        // Hold b against a so the contact persists
        world.add_constraint(
            ConstraintDesc::new(Attachment::world(Vec2::new(8.0, 0.0)), Attachment::body(b, Vec2::ZERO), 1.0)
                .with_length(0.0),
        );

        let mut starts = Vec::new();
        for _ in 0..3 {
            world.step(16.0, &mut |pair| starts.push(pair));
        }
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].other(a), Some((b, BodyTag::TentacleSegment)));
    }

    #[test]
    fn test_shared_negative_group_does_not_collide() {
        let mut world = SimpleWorld::new(Vec2::ZERO, 0.001);
        let group = world.next_group(true);
        assert!(group.0 < 0);
        let a = world.add_body(BodyDesc::circle(Vec2::ZERO, 5.0, BodyTag::ChainLink).with_group(group));
        world.add_body(BodyDesc::circle(Vec2::new(2.0, 0.0), 5.0, BodyTag::ChainLink).with_group(group));
        let mut starts = 0;
        world.step(16.0, &mut |_| starts += 1);
        assert_eq!(starts, 0);
        assert_eq!(world.body(a).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut world = SimpleWorld::default();
        let ball = world.add_body(BodyDesc::circle(Vec2::ZERO, 5.0, BodyTag::AnchorWeight));
        world.step(0.0, &mut no_events);
        world.step(-5.0, &mut no_events);
        assert_eq!(world.body(ball).unwrap().position, Vec2::ZERO);
    }
}
