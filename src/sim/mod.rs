//! Tick-driven simulation module
//!
//! All gameplay logic lives here. The rules for this module:
//! - Physics goes through the [`PhysicsWorld`] trait only
//! - Seeded RNG only, drawn in a fixed order each tick
//! - No rendering or platform dependencies

pub mod bubbles;
pub mod chain;
pub mod collision;
pub mod engine;
pub mod jelly;
pub mod noise;
pub mod rope;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod vitals;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use bubbles::{Bubble, BubbleBounds, BubbleContext, BubbleField, BubbleStats};
pub use chain::{ChainSpec, SegmentRun, Tether, build_segment_run};
pub use collision::{CollisionDamageRouter, ContactOutcome};
pub use engine::SimpleWorld;
pub use jelly::{Jelly, spawn_swarm};
pub use noise::SmoothNoise;
pub use rope::{PointMass, RopeParams, RopeTether};
pub use state::{DeathCause, GameEvent, GamePhase, GameSession, SessionSummary};
pub use terrain::{SeabedSpec, generate_seabed, surface_y};
pub use tick::{TickInput, tick};
pub use vitals::{DiverVitals, OxygenBudget};
pub use world::{
    Attachment, Body, BodyDesc, BodyHandle, BodyTag, CollisionGroup, CollisionPair, Constraint,
    ConstraintDesc, ConstraintHandle, PhysicsWorld, Shape,
};
