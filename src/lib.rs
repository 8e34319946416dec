//! Tether Dive - a diver chained to a sinking rock
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (physics capability, chain, vitals, bubbles)
//! - `renderer`: Rendering surface abstraction and CPU vertex batching
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Time is in milliseconds, distances in pixels, forces in the world's
/// mass * px/ms² units. These are the defaults behind [`Tuning`].
pub mod consts {
    /// Smallest elapsed time used as a divisor
    pub const MIN_TICK_DT: f32 = 1.0;
    /// Reference frame length for per-frame damping factors
    pub const BASE_STEP_MS: f32 = 1000.0 / 60.0;

    /// World gravity (Matter-style 0.05 * 0.001 scale)
    pub const GRAVITY_Y: f32 = 0.000_05;
    /// Mass per square pixel
    pub const BODY_DENSITY: f32 = 0.001;

    /// Diver body
    pub const DIVER_WIDTH: f32 = 16.0 * 1.5; // multiples of 16
    pub const DIVER_HEIGHT: f32 = 24.0 * 1.5; // multiples of 24
    pub const DIVER_AIR_FRICTION: f32 = 0.03;
    pub const SWIM_FORCE: f32 = 0.0004;
    pub const STEER_FORCE: f32 = 0.000_02;

    /// Energy
    pub const MAX_ENERGY: f32 = 1500.0;
    pub const ENERGY_COOLDOWN_MS: f64 = 3000.0;
    pub const ENERGY_REGEN_RATE: f32 = 0.3;

    /// Health and oxygen
    pub const TENTACLE_DAMAGE: f32 = 0.05;
    pub const OXYGEN_MIN_MS: f32 = 60_000.0;
    pub const OXYGEN_MAX_MS: f32 = 90_000.0;
    pub const DEATH_TRANSITION_MS: f64 = 2000.0;
    pub const INTRO_DURATION_MS: f64 = 2000.0;
    /// Overlay alpha when oxygen is fully spent but the diver is still alive
    pub const MAX_AMBIENT_DARKNESS: f32 = 0.7;

    /// Chain and anchor rock
    pub const CHAIN_LINKS: usize = 8;
    pub const CHAIN_LINK_LENGTH: f32 = 10.0;
    pub const CHAIN_LINK_THICKNESS: f32 = 3.0;
    pub const CHAIN_LINK_STIFFNESS: f32 = 1.0;
    pub const CHAIN_ATTACH_STIFFNESS: f32 = 0.5;
    pub const ANCHOR_RADIUS: f32 = 15.0;
    pub const ANCHOR_BUOYANCY: f32 = 0.000_02;

    /// Bubbles
    pub const AIR: f32 = 0.9;
    pub const BUBBLE_DRAG_BLEND: f32 = 0.8;
    pub const INITIAL_BUBBLES: usize = 100;
    pub const AMBIENT_SPAWN_CHANCE: f64 = 0.05;
    pub const EXHALE_CHANCE_IDLE: f64 = 0.1;
    pub const EXHALE_CHANCE_SWIMMING: f64 = 0.5;
    pub const BUBBLE_SPLIT_RADIUS: f32 = 5.0;
    pub const BUBBLE_SPLIT_CHANCE_PER_RADIUS: f32 = 0.001;
    pub const BUBBLE_SPLIT_JITTER: f32 = 3.0;
    pub const BUBBLE_MIN_RADIUS: f32 = 0.1;
    pub const BUBBLE_NOISE_DRIFT: f32 = 0.01;
    pub const BUBBLE_BUOYANCY: f32 = 0.005;
    pub const EXHALE_SPEED: f32 = 0.5;
    pub const NOISE_SCALE: f32 = 0.1;
    pub const NOISE_TIME_RATE: f64 = 0.0001;

    /// Jellyfish
    pub const JELLY_COUNT: usize = 10;
    pub const JELLY_WIDTH: f32 = 40.0;
    pub const JELLY_WANDER_CHANCE: f64 = 0.01;
    pub const JELLY_WANDER_FORCE: f32 = 0.001;

    /// Hand-rolled rope tether
    pub const ROPE_CHAIN_LENGTH: f32 = 150.0;
    pub const ROPE_GRAVITY: f32 = 0.4;
    pub const ROPE_PULL: f32 = 0.05;
    pub const ROPE_STEER: f32 = 0.03;
    pub const ROPE_SWIM: f32 = 0.05;
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// 2D cross product (z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
