//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`], so a
//! JSON file only needs the keys it wants to override. Values differ between
//! play-test iterations; none of them are structural.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Runtime-tunable gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub gravity_y: f32,
    pub body_density: f32,
    /// Play area in pixels (bubble bounds, jellyfish scatter, seabed)
    pub area_width: f32,
    pub area_height: f32,

    // === Diver ===
    pub diver_width: f32,
    pub diver_height: f32,
    pub diver_air_friction: f32,
    pub swim_force: f32,
    pub steer_force: f32,
    /// Inertia restored after the intro; `None` keeps rotation locked
    pub diver_release_inertia: Option<f32>,

    // === Vitals ===
    pub max_energy: f32,
    pub energy_cooldown_ms: f64,
    pub energy_regen_rate: f32,
    pub tentacle_damage: f32,
    pub oxygen_min_ms: f32,
    pub oxygen_max_ms: f32,
    pub death_transition_ms: f64,
    pub intro_duration_ms: f64,
    pub max_ambient_darkness: f32,

    // === Chain ===
    pub chain_links: usize,
    pub chain_link_length: f32,
    pub chain_link_thickness: f32,
    pub chain_link_stiffness: f32,
    pub chain_attach_stiffness: f32,
    pub anchor_radius: f32,
    pub anchor_buoyancy: f32,

    // === Bubbles ===
    pub initial_bubbles: usize,
    pub ambient_spawn_chance: f64,
    pub exhale_chance_idle: f64,
    pub exhale_chance_swimming: f64,
    pub ambient_radius: (f32, f32),
    pub ambient_rise_speed: (f32, f32),
    pub exhale_radius: (f32, f32),
    pub exhale_speed: f32,
    pub bubble_split_radius: f32,
    pub bubble_split_chance_per_radius: f32,
    pub bubble_split_jitter: f32,
    pub bubble_noise_drift: f32,
    pub bubble_buoyancy: f32,
    pub air: f32,
    pub bubble_drag_blend: f32,
    pub noise_scale: f32,
    pub noise_time_rate: f64,
    /// Remove bubbles beyond this distance from the camera instead of above the screen
    pub bubble_camera_radius: Option<f32>,

    // === Jellyfish ===
    pub jelly_count: usize,
    pub jelly_wander_chance: f64,
    pub jelly_wander_force: f32,

    // === Seabed ===
    pub seabed_enabled: bool,
    pub seabed_segment_width: f32,
    pub seabed_amplitude: f32,
    pub seabed_depth: f32,

    // === Hand-rolled rope ===
    pub legacy_rope: bool,
    pub rope_chain_length: f32,
    pub rope_gravity: f32,
    pub rope_pull: f32,
    pub rope_steer: f32,
    pub rope_swim: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity_y: GRAVITY_Y,
            body_density: BODY_DENSITY,
            area_width: 1280.0,
            area_height: 720.0,

            diver_width: DIVER_WIDTH,
            diver_height: DIVER_HEIGHT,
            diver_air_friction: DIVER_AIR_FRICTION,
            swim_force: SWIM_FORCE,
            steer_force: STEER_FORCE,
            diver_release_inertia: None,

            max_energy: MAX_ENERGY,
            energy_cooldown_ms: ENERGY_COOLDOWN_MS,
            energy_regen_rate: ENERGY_REGEN_RATE,
            tentacle_damage: TENTACLE_DAMAGE,
            oxygen_min_ms: OXYGEN_MIN_MS,
            oxygen_max_ms: OXYGEN_MAX_MS,
            death_transition_ms: DEATH_TRANSITION_MS,
            intro_duration_ms: INTRO_DURATION_MS,
            max_ambient_darkness: MAX_AMBIENT_DARKNESS,

            chain_links: CHAIN_LINKS,
            chain_link_length: CHAIN_LINK_LENGTH,
            chain_link_thickness: CHAIN_LINK_THICKNESS,
            chain_link_stiffness: CHAIN_LINK_STIFFNESS,
            chain_attach_stiffness: CHAIN_ATTACH_STIFFNESS,
            anchor_radius: ANCHOR_RADIUS,
            anchor_buoyancy: ANCHOR_BUOYANCY,

            initial_bubbles: INITIAL_BUBBLES,
            ambient_spawn_chance: AMBIENT_SPAWN_CHANCE,
            exhale_chance_idle: EXHALE_CHANCE_IDLE,
            exhale_chance_swimming: EXHALE_CHANCE_SWIMMING,
            ambient_radius: (3.0, 10.0),
            ambient_rise_speed: (0.1, 0.2),
            exhale_radius: (1.0, 15.0),
            exhale_speed: EXHALE_SPEED,
            bubble_split_radius: BUBBLE_SPLIT_RADIUS,
            bubble_split_chance_per_radius: BUBBLE_SPLIT_CHANCE_PER_RADIUS,
            bubble_split_jitter: BUBBLE_SPLIT_JITTER,
            bubble_noise_drift: BUBBLE_NOISE_DRIFT,
            bubble_buoyancy: BUBBLE_BUOYANCY,
            air: AIR,
            bubble_drag_blend: BUBBLE_DRAG_BLEND,
            noise_scale: NOISE_SCALE,
            noise_time_rate: NOISE_TIME_RATE,
            bubble_camera_radius: None,

            jelly_count: JELLY_COUNT,
            jelly_wander_chance: JELLY_WANDER_CHANCE,
            jelly_wander_force: JELLY_WANDER_FORCE,

            seabed_enabled: true,
            seabed_segment_width: 64.0,
            seabed_amplitude: 40.0,
            seabed_depth: 60.0,

            legacy_rope: false,
            rope_chain_length: ROPE_CHAIN_LENGTH,
            rope_gravity: ROPE_GRAVITY,
            rope_pull: ROPE_PULL,
            rope_steer: ROPE_STEER,
            rope_swim: ROPE_SWIM,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would build degenerate bodies or empty ranges
    pub fn validate(&self) -> Result<(), SimError> {
        if self.chain_links == 0 {
            return Err(SimError::invalid("chain_links", 0.0, "at least 1"));
        }
        positive("chain_link_length", self.chain_link_length)?;
        positive("chain_link_thickness", self.chain_link_thickness)?;
        positive("anchor_radius", self.anchor_radius)?;
        positive("diver_width", self.diver_width)?;
        positive("diver_height", self.diver_height)?;
        positive("max_energy", self.max_energy)?;
        positive("area_width", self.area_width)?;
        positive("area_height", self.area_height)?;
        if self.oxygen_min_ms > self.oxygen_max_ms || self.oxygen_min_ms <= 0.0 {
            return Err(SimError::invalid(
                "oxygen_min_ms",
                self.oxygen_min_ms,
                "positive and not above oxygen_max_ms",
            ));
        }
        for (name, (lo, hi)) in [
            ("ambient_radius", self.ambient_radius),
            ("exhale_radius", self.exhale_radius),
        ] {
            if lo <= 0.0 || lo > hi {
                return Err(SimError::invalid(name, lo, "a positive, ordered range"));
            }
        }
        let (lo, hi) = self.ambient_rise_speed;
        if lo < 0.0 || lo > hi {
            return Err(SimError::invalid(
                "ambient_rise_speed",
                lo,
                "a non-negative, ordered range",
            ));
        }
        if self.bubble_split_jitter < 0.0 || self.bubble_split_jitter.is_nan() {
            return Err(SimError::invalid(
                "bubble_split_jitter",
                self.bubble_split_jitter,
                "0 or more",
            ));
        }
        if let Some(radius) = self.bubble_camera_radius {
            positive("bubble_camera_radius", radius)?;
        }
        for (name, chance) in [
            ("ambient_spawn_chance", self.ambient_spawn_chance),
            ("exhale_chance_idle", self.exhale_chance_idle),
            ("exhale_chance_swimming", self.exhale_chance_swimming),
            ("jelly_wander_chance", self.jelly_wander_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(SimError::invalid(name, chance as f32, "a probability in [0, 1]"));
            }
        }
        for (name, stiffness) in [
            ("chain_link_stiffness", self.chain_link_stiffness),
            ("chain_attach_stiffness", self.chain_attach_stiffness),
        ] {
            if stiffness <= 0.0 || stiffness > 1.0 {
                return Err(SimError::invalid(name, stiffness, "in (0, 1]"));
            }
        }
        if self.bubble_split_radius < BUBBLE_MIN_RADIUS {
            return Err(SimError::invalid(
                "bubble_split_radius",
                self.bubble_split_radius,
                "at least the minimum bubble radius",
            ));
        }
        if self.seabed_enabled {
            positive("seabed_segment_width", self.seabed_segment_width)?;
            positive("seabed_depth", self.seabed_depth)?;
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), SimError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(name, value, "greater than 0"))
    }
}
