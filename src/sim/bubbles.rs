//! Ambient bubble particles
//!
//! Bubbles rise from the bottom of the play area, get exhaled by the diver,
//! drift along a shared noise field, and occasionally split in two. The
//! vertical drag blend is applied once per tick and is not scaled by
//! elapsed time; changing that changes how the bubbles feel.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::noise::SmoothNoise;
use crate::consts::BUBBLE_MIN_RADIUS;
use crate::lerp;
use crate::tuning::Tuning;

/// A single bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Region outside of which bubbles are removed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleBounds {
    /// Fixed screen: spawn along `height`, remove above y = 0
    Screen { width: f32, height: f32 },
    /// Scrolling camera: spawn below the view, remove beyond `radius`
    CameraRadius {
        center: Vec2,
        radius: f32,
        half_width: f32,
        half_height: f32,
    },
}

impl BubbleBounds {
    /// Whether a point has left the region
    pub fn is_outside(&self, pos: Vec2) -> bool {
        match self {
            BubbleBounds::Screen { .. } => pos.y < 0.0,
            BubbleBounds::CameraRadius { center, radius, .. } => pos.distance(*center) > *radius,
        }
    }

    /// Random point along the bottom edge
    fn bottom_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self {
            BubbleBounds::Screen { width, height } => Vec2::new(rng.random_range(0.0..=*width), *height),
            BubbleBounds::CameraRadius {
                center,
                half_width,
                half_height,
                ..
            } => Vec2::new(
                center.x + rng.random_range(-*half_width..=*half_width),
                center.y + half_height,
            ),
        }
    }

    /// Random point inside the visible region
    fn interior_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self {
            BubbleBounds::Screen { width, height } => Vec2::new(
                rng.random_range(0.0..=*width),
                rng.random_range(0.0..=*height),
            ),
            BubbleBounds::CameraRadius {
                center,
                half_width,
                half_height,
                ..
            } => {
                *center
                    + Vec2::new(
                        rng.random_range(-*half_width..=*half_width),
                        rng.random_range(-*half_height..=*half_height),
                    )
            }
        }
    }
}

/// Per-tick inputs to the bubble field
#[derive(Debug, Clone, Copy)]
pub struct BubbleContext {
    pub dt: f32,
    pub elapsed_ms: f64,
    /// Where exhaled bubbles appear
    pub mouth: Vec2,
    pub swimming: bool,
    pub bounds: BubbleBounds,
    /// Live bubble cap; spawns are skipped at the cap
    pub max_bubbles: usize,
}

/// Counters from one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BubbleStats {
    pub spawned: usize,
    pub removed: usize,
    pub splits: usize,
}

/// Owned collection of live bubbles
#[derive(Debug, Clone)]
pub struct BubbleField {
    pub bubbles: Vec<Bubble>,
    noise: SmoothNoise,
}

impl BubbleField {
    pub fn new(seed: u64) -> Self {
        Self {
            bubbles: Vec::new(),
            noise: SmoothNoise::new(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Scatter `count` ambient bubbles over the region
    pub fn seed_initial<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        bounds: &BubbleBounds,
        tuning: &Tuning,
    ) {
        for _ in 0..count {
            let pos = bounds.interior_point(rng);
            self.bubbles.push(ambient_bubble(rng, pos, tuning));
        }
    }

    /// Noise drift vector at `pos`, each axis in `[-0.5, 0.5)`
    fn drift(&self, pos: Vec2, noise_time: f32, scale: f32) -> Vec2 {
        Vec2::new(
            self.noise.centered(pos.x * scale, noise_time),
            self.noise.centered(pos.y * scale, noise_time),
        )
    }

    /// Spawn, move, cull and split bubbles for one tick
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        ctx: &BubbleContext,
        tuning: &Tuning,
    ) -> BubbleStats {
        let mut stats = BubbleStats::default();
        let noise_time = (ctx.elapsed_ms * tuning.noise_time_rate) as f32;
        let scale = tuning.noise_scale;

        // Ambient bubbles from the bottom edge
        if rng.random_bool(tuning.ambient_spawn_chance) && self.bubbles.len() < ctx.max_bubbles {
            let pos = ctx.bounds.bottom_point(rng);
            self.bubbles.push(ambient_bubble(rng, pos, tuning));
            stats.spawned += 1;
        }

        // Exhaled bubbles, more of them while swimming
        let exhale_chance = if ctx.swimming {
            tuning.exhale_chance_swimming
        } else {
            tuning.exhale_chance_idle
        };
        if rng.random_bool(exhale_chance) && self.bubbles.len() < ctx.max_bubbles {
            let vel = self.drift(ctx.mouth, noise_time, scale) * tuning.exhale_speed;
            let (lo, hi) = tuning.exhale_radius;
            self.bubbles.push(Bubble {
                pos: ctx.mouth,
                vel,
                radius: rng.random_range(lo..=hi),
            });
            stats.spawned += 1;
        }

        let drag = lerp(tuning.air, 1.0, tuning.bubble_drag_blend);
        let mut children = Vec::new();
        let mut index = 0;
        while index < self.bubbles.len() {
            let mut bubble = self.bubbles[index];
            bubble.pos += bubble.vel * ctx.dt;
            bubble.vel += self.drift(bubble.pos, noise_time, scale) * tuning.bubble_noise_drift;
            bubble.vel.y -= tuning.bubble_buoyancy;
            bubble.vel.y *= drag;

            if ctx.bounds.is_outside(bubble.pos) {
                self.bubbles.swap_remove(index);
                stats.removed += 1;
                continue;
            }

            // Radius gate first, so small bubbles never roll
            if bubble.radius > tuning.bubble_split_radius
                && rng.random::<f32>() < tuning.bubble_split_chance_per_radius * bubble.radius
            {
                children.extend(self.split(rng, &bubble, noise_time, tuning));
                self.bubbles.swap_remove(index);
                stats.splits += 1;
                continue;
            }

            self.bubbles[index] = bubble;
            index += 1;
        }

        if stats.splits > 0 {
            log::debug!("{} bubble splits", stats.splits);
        }
        let before = children.len();
        children.retain(|child: &Bubble| !ctx.bounds.is_outside(child.pos));
        stats.removed += before - children.len();
        self.bubbles.extend(children);
        stats
    }

    /// Two smaller bubbles diverging from `parent`
    fn split<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        parent: &Bubble,
        noise_time: f32,
        tuning: &Tuning,
    ) -> [Bubble; 2] {
        let jitter = tuning.bubble_split_jitter;
        let offset = Vec2::new(
            rng.random_range(-jitter..=jitter),
            rng.random_range(-jitter..=jitter),
        );
        let scale = tuning.noise_scale;
        let speed = tuning.exhale_speed;

        let out_pos = parent.pos + offset;
        let in_pos = parent.pos - offset;
        [
            Bubble {
                pos: out_pos,
                vel: parent.vel + self.drift(out_pos, noise_time, scale) * speed,
                radius: child_radius(rng, parent.radius),
            },
            Bubble {
                pos: in_pos,
                vel: parent.vel - self.drift(in_pos, noise_time, scale) * speed,
                radius: child_radius(rng, parent.radius),
            },
        ]
    }
}

fn ambient_bubble<R: Rng + ?Sized>(rng: &mut R, pos: Vec2, tuning: &Tuning) -> Bubble {
    let (slow, fast) = tuning.ambient_rise_speed;
    let (lo, hi) = tuning.ambient_radius;
    Bubble {
        pos,
        vel: Vec2::new(0.0, -rng.random_range(slow..=fast)),
        radius: rng.random_range(lo..=hi),
    }
}

/// Radius in `[0, parent)`, floored so it stays positive
fn child_radius<R: Rng + ?Sized>(rng: &mut R, parent: f32) -> f32 {
    rng.random_range(0.0..parent).max(BUBBLE_MIN_RADIUS)
}
