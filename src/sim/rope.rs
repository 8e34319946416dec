//! Hand-rolled rope tether
//!
//! A physics-engine-free stand-in for the chain: a weighted ball hangs from
//! the diver's legs on an inextensible rope of fixed length. When the ball
//! would move past the rope's reach it is clamped back onto the circle and
//! the diver gets yanked toward it. Velocities are rebuilt from displacement
//! each tick, so the clamp doubles as the constraint solver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_TICK_DT;
use crate::lerp;
use crate::tuning::Tuning;

/// Position and velocity of a point mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Rope constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeParams {
    pub length: f32,
    pub gravity: f32,
    pub pull: f32,
    pub steer: f32,
    pub swim: f32,
    pub air: f32,
    pub drag_blend: f32,
}

impl RopeParams {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            length: tuning.rope_chain_length,
            gravity: tuning.rope_gravity,
            pull: tuning.rope_pull,
            steer: tuning.rope_steer,
            swim: tuning.rope_swim,
            air: tuning.air,
            drag_blend: tuning.bubble_drag_blend,
        }
    }
}

/// Diver and ball joined by a rope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopeTether {
    pub person: PointMass,
    pub ball: PointMass,
    /// Offset from the person's position to the rope's attachment
    pub anchor_offset: Vec2,
}

impl RopeTether {
    /// Ball starts at `ball_pos`; the person stands with its legs there
    pub fn new(ball_pos: Vec2, anchor_offset: Vec2) -> Self {
        Self {
            person: PointMass {
                pos: ball_pos + anchor_offset,
                vel: Vec2::ZERO,
            },
            ball: PointMass {
                pos: ball_pos,
                vel: Vec2::ZERO,
            },
            anchor_offset,
        }
    }

    /// Where the rope attaches to the person
    pub fn legs(&self) -> Vec2 {
        self.person.pos + self.anchor_offset
    }

    /// Advance the ball, then the person
    pub fn update(&mut self, dt: f32, pointer: Vec2, swimming: bool, params: &RopeParams) {
        let dt = dt.max(0.0);
        let legs = self.legs();
        self.update_ball(legs, dt, params);
        self.update_person(dt, pointer, swimming, params);
    }

    fn update_ball(&mut self, anchor: Vec2, dt: f32, params: &RopeParams) {
        let clamped_dt = dt.max(MIN_TICK_DT);
        let old = self.ball.pos;
        let desired = self.ball.pos + self.ball.vel * dt;
        let dir = desired - anchor;
        if dir.length() > params.length {
            let unit = dir.normalize_or_zero();
            self.ball.pos = anchor + unit * params.length;
            // Yank along the rope, independent of how far the ball overshot
            self.person.vel += unit * params.pull;
        } else {
            self.ball.pos = desired;
        }
        self.ball.vel = (self.ball.pos - old) / clamped_dt;
        self.ball.vel *= params.air;
        self.ball.vel.y += params.gravity / clamped_dt;
    }

    fn update_person(&mut self, dt: f32, pointer: Vec2, swimming: bool, params: &RopeParams) {
        let clamped_dt = dt.max(MIN_TICK_DT);
        let toward = (pointer - self.person.pos).normalize_or_zero();
        self.person.vel += toward * params.steer;
        // The ball gets a second helping of gravity here
        self.ball.vel.y += params.gravity / clamped_dt;
        if swimming {
            self.person.vel.y -= params.swim;
        }
        self.person.vel *= lerp(params.air, 1.0, params.drag_blend);
        self.person.pos += self.person.vel * dt;
    }
}
