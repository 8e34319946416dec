//! Collision damage routing
//!
//! The physics world reports pairs of bodies that start touching, in no
//! particular order. The router picks out diver/tentacle contacts and turns
//! each into a fixed health hit. Every contact counts separately, so three
//! tentacle segments brushing the diver in one step deal three hits.

use super::vitals::DiverVitals;
use super::world::{BodyHandle, BodyTag, CollisionPair};

/// Outcome of routing one collision pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Not a diver/tentacle contact
    Ignored,
    /// Sting routed without killing (a no-op once health is zero)
    Damaged,
    /// This contact took the diver's health to zero
    Killed,
}

/// Maps diver/tentacle contacts to health damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionDamageRouter {
    pub diver: BodyHandle,
    pub damage: f32,
}

impl CollisionDamageRouter {
    pub fn new(diver: BodyHandle, damage: f32) -> Self {
        Self { diver, damage }
    }

    /// Whether a pair is the diver touching a tentacle
    pub fn is_sting(&self, pair: &CollisionPair) -> bool {
        matches!(pair.other(self.diver), Some((_, BodyTag::TentacleSegment)))
    }

    /// Apply damage for one pair
    pub fn route(&self, pair: &CollisionPair, vitals: &mut DiverVitals) -> ContactOutcome {
        if !self.is_sting(pair) {
            return ContactOutcome::Ignored;
        }
        log::debug!("Tentacle contact: {:?} <-> {:?}", pair.a, pair.b);
        if vitals.damage(self.damage) {
            ContactOutcome::Killed
        } else {
            ContactOutcome::Damaged
        }
    }
}
