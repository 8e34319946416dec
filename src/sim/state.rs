//! Session state and lifecycle
//!
//! Everything one play session mutates lives in [`GameSession`]. The physics
//! world is owned next to it by the caller and passed into every tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bubbles::{BubbleBounds, BubbleField};
use super::chain::Tether;
use super::collision::CollisionDamageRouter;
use super::jelly::{Jelly, spawn_swarm};
use super::noise::SmoothNoise;
use super::rope::RopeTether;
use super::terrain::{SeabedSpec, generate_seabed};
use super::vitals::{DiverVitals, OxygenBudget};
use super::world::{BodyHandle, PhysicsWorld};
use crate::error::SimError;
use crate::lerp;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// What ended the dive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health reached zero from tentacle stings
    Health,
    /// The oxygen budget ran out
    Oxygen,
}

impl DeathCause {
    /// Terminal screen message key
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Health => "stung",
            DeathCause::Oxygen => "drowned",
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Locked intro pose until `until_ms`
    Intro { until_ms: f64 },
    /// Normal play
    Alive,
    /// Fading to black after death
    Transitioning {
        cause: DeathCause,
        since_ms: f64,
        /// Overlay alpha when the fade started
        from_darkness: f32,
    },
    /// Terminal screen; ticks no longer simulate
    Dead { cause: DeathCause },
}

impl GamePhase {
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Intro { .. } => "intro",
            GamePhase::Alive => "alive",
            GamePhase::Transitioning { .. } => "transitioning",
            GamePhase::Dead { .. } => "dead",
        }
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    IntroEnded,
    OutOfEnergy,
    Stung { health: f32 },
    DeathStarted { cause: DeathCause },
    Died { cause: DeathCause },
}

/// End-of-run numbers for logs and the terminal screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_ms: f64,
    pub phase: String,
    pub cause: Option<DeathCause>,
    pub health: f32,
    pub energy: f32,
    pub oxygen_ms: f32,
    pub bubbles: usize,
}

/// One play session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub settings: Settings,
    pub phase: GamePhase,
    pub vitals: DiverVitals,
    pub oxygen: OxygenBudget,
    pub tether: Tether,
    pub router: CollisionDamageRouter,
    pub jellies: Vec<Jelly>,
    pub seabed: Vec<BodyHandle>,
    pub bubbles: BubbleField,
    pub rope: Option<RopeTether>,
    /// Ticks simulated so far
    pub time_ticks: u64,
    /// Clock value of the latest tick
    pub elapsed_ms: f64,
    /// Events from the latest tick
    pub events: Vec<GameEvent>,
}

impl GameSession {
    /// Populate `world` and create a session with the diver at `spawn`
    pub fn new<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        seed: u64,
        tuning: Tuning,
        settings: Settings,
        spawn: Vec2,
    ) -> Result<Self, SimError> {
        tuning.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        world.set_gravity(Vec2::new(0.0, tuning.gravity_y));

        let tether = Tether::spawn(world, spawn, &tuning)?;
        let router = CollisionDamageRouter::new(tether.diver, tuning.tentacle_damage);
        let jellies = spawn_swarm(
            world,
            &mut rng,
            tuning.jelly_count,
            tuning.area_width,
            tuning.area_height,
        )?;

        let seabed = if tuning.seabed_enabled {
            let spec = SeabedSpec {
                start_x: 0.0,
                width: tuning.area_width,
                floor_y: tuning.area_height,
                segment_width: tuning.seabed_segment_width,
                amplitude: tuning.seabed_amplitude,
                depth: tuning.seabed_depth,
            };
            generate_seabed(world, &SmoothNoise::new(seed.wrapping_add(1)), &spec)?
        } else {
            Vec::new()
        };

        let oxygen = OxygenBudget::random(&mut rng, tuning.oxygen_min_ms, tuning.oxygen_max_ms);
        let rope = tuning.legacy_rope.then(|| {
            RopeTether::new(
                spawn,
                Vec2::new(tuning.diver_width / 2.0, tuning.diver_height),
            )
        });
        let phase = if tuning.intro_duration_ms > 0.0 {
            GamePhase::Intro {
                until_ms: tuning.intro_duration_ms,
            }
        } else {
            GamePhase::Alive
        };

        let mut session = Self {
            seed,
            rng,
            vitals: DiverVitals::from_tuning(&tuning),
            oxygen,
            tether,
            router,
            jellies,
            seabed,
            bubbles: BubbleField::new(seed),
            rope,
            phase,
            tuning,
            settings,
            time_ticks: 0,
            elapsed_ms: 0.0,
            events: Vec::new(),
        };

        let initial = session.tuning.initial_bubbles.min(session.settings.max_bubbles());
        let bounds = session.bubble_bounds(world);
        session
            .bubbles
            .seed_initial(&mut session.rng, initial, &bounds, &session.tuning);

        log::info!(
            "Session {} ready: {:.0} ms of air, phase {}",
            seed,
            session.oxygen.max,
            session.phase.label()
        );
        Ok(session)
    }

    /// Diver body position (origin if the world lost it)
    pub fn diver_position<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec2 {
        world
            .body(self.tether.diver)
            .map(|b| b.position)
            .unwrap_or(Vec2::ZERO)
    }

    /// Region bubbles live in
    pub fn bubble_bounds<W: PhysicsWorld + ?Sized>(&self, world: &W) -> BubbleBounds {
        let (w, h) = (self.tuning.area_width, self.tuning.area_height);
        match self.tuning.bubble_camera_radius {
            Some(radius) => BubbleBounds::CameraRadius {
                center: self.diver_position(world),
                radius,
                half_width: w / 2.0,
                half_height: h / 2.0,
            },
            None => BubbleBounds::Screen {
                width: w,
                height: h,
            },
        }
    }

    /// Whether ticks still simulate
    pub fn is_running(&self) -> bool {
        !matches!(self.phase, GamePhase::Dead { .. })
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.phase, GamePhase::Alive)
    }

    /// Cause of death once dying or dead
    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.phase {
            GamePhase::Transitioning { cause, .. } | GamePhase::Dead { cause } => Some(cause),
            _ => None,
        }
    }

    /// Start the fade to black; later calls are ignored
    pub fn begin_death(&mut self, cause: DeathCause, now_ms: f64) -> bool {
        if !matches!(self.phase, GamePhase::Alive | GamePhase::Intro { .. }) {
            return false;
        }
        let from_darkness = self.ambient_darkness();
        self.phase = GamePhase::Transitioning {
            cause,
            since_ms: now_ms,
            from_darkness,
        };
        self.vitals.swimming = false;
        self.events.push(GameEvent::DeathStarted { cause });
        log::info!("Diver {} at {:.0} ms", cause.as_str(), now_ms);
        true
    }

    /// Health-damage operation; starts the death fade on the killing blow
    pub fn damage(&mut self, amount: f32, now_ms: f64) {
        if self.vitals.damage(amount) {
            self.begin_death(DeathCause::Health, now_ms);
        }
    }

    /// Overlay alpha from air depletion alone
    fn ambient_darkness(&self) -> f32 {
        if self.settings.reduced_darkness {
            return 0.0;
        }
        (1.0 - self.oxygen.fraction()) * self.tuning.max_ambient_darkness
    }

    /// Full-screen overlay alpha at `now_ms`
    pub fn darkness(&self, now_ms: f64) -> f32 {
        match self.phase {
            GamePhase::Intro { .. } | GamePhase::Alive => self.ambient_darkness(),
            GamePhase::Transitioning {
                since_ms,
                from_darkness,
                ..
            } => {
                let span = self.tuning.death_transition_ms.max(f64::EPSILON);
                let t = ((now_ms - since_ms) / span).clamp(0.0, 1.0) as f32;
                lerp(from_darkness, 1.0, t)
            }
            GamePhase::Dead { .. } => 1.0,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            ticks: self.time_ticks,
            elapsed_ms: self.elapsed_ms,
            phase: self.phase.label().to_string(),
            cause: self.death_cause(),
            health: self.vitals.health,
            energy: self.vitals.energy,
            oxygen_ms: self.oxygen.remaining,
            bubbles: self.bubbles.len(),
        }
    }
}
