//! Simulation tick
//!
//! Advances a session and its physics world by one frame. Everything that
//! draws randomness pulls from the session's seeded rng in a fixed order, so
//! two sessions fed the same inputs stay identical.

use glam::Vec2;

use super::bubbles::BubbleContext;
use super::collision::ContactOutcome;
use super::rope::RopeParams;
use super::state::{DeathCause, GameEvent, GamePhase, GameSession};
use super::world::PhysicsWorld;
use crate::rotate;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Elapsed time since the previous tick (ms)
    pub dt: f32,
    /// Clock value at this tick (ms since session start)
    pub elapsed_ms: f64,
    /// Pointer position in world coordinates
    pub pointer: Vec2,
    /// Ascend key or button held
    pub action_held: bool,
}

impl TickInput {
    /// Elapsed time with negative values clamped to zero
    pub fn clamped_dt(&self) -> f32 {
        if self.dt < 0.0 {
            log::warn!("Negative tick dt {} clamped to 0", self.dt);
            0.0
        } else {
            self.dt
        }
    }
}

/// Advance the session by one tick
pub fn tick<W: PhysicsWorld + ?Sized>(session: &mut GameSession, world: &mut W, input: &TickInput) {
    session.events.clear();
    if !session.is_running() {
        return;
    }

    let dt = input.clamped_dt();
    let now = input.elapsed_ms;
    session.time_ticks += 1;
    session.elapsed_ms = now;

    match session.phase {
        GamePhase::Transitioning {
            cause, since_ms, ..
        } if now - since_ms >= session.tuning.death_transition_ms => {
            session.phase = GamePhase::Dead { cause };
            session.vitals.swimming = false;
            session.events.push(GameEvent::Died { cause });
            log::info!("Dive over ({}) after {} ticks", cause.as_str(), session.time_ticks);
            return;
        }
        GamePhase::Intro { until_ms } if now >= until_ms => {
            session.phase = GamePhase::Alive;
            if let Some(inertia) = session.tuning.diver_release_inertia {
                session.tether.release_rotation(world, inertia);
            }
            session.events.push(GameEvent::IntroEnded);
            log::debug!("Intro finished at {:.0} ms", now);
        }
        _ => {}
    }

    let alive = session.is_alive();
    let diver = session.tether.diver;
    let diver_pose = world.body(diver).map(|b| (b.position, b.angle));

    // Swim control only runs once the diver is free to move
    let propelling = if alive {
        let depleted_at = session.vitals.out_of_energy_at;
        let propelling = session.vitals.update_swim(input.action_held, dt, now);
        if session.vitals.out_of_energy_at != depleted_at {
            session.events.push(GameEvent::OutOfEnergy);
        }
        propelling
    } else {
        session.vitals.swimming = false;
        false
    };

    if let (true, Some((position, angle))) = (alive, diver_pose) {
        if propelling {
            let force = rotate(Vec2::new(0.0, -session.tuning.swim_force), angle);
            world.apply_force(diver, position, force);
        }
        let toward = (input.pointer - position).normalize_or_zero();
        if session.tuning.steer_force > 0.0 && toward != Vec2::ZERO {
            world.apply_force(diver, position, toward * session.tuning.steer_force);
        }
    }

    for jelly in &session.jellies {
        jelly.wander(
            world,
            &mut session.rng,
            session.tuning.jelly_wander_chance,
            session.tuning.jelly_wander_force,
        );
    }
    session
        .tether
        .apply_anchor_buoyancy(world, session.tuning.anchor_buoyancy);

    // Contacts only hurt during play
    let router = session.router;
    let vitals = &mut session.vitals;
    let events = &mut session.events;
    let mut killed = false;
    world.step(dt, &mut |pair| {
        if !alive {
            return;
        }
        let outcome = router.route(&pair, vitals);
        if outcome != ContactOutcome::Ignored {
            events.push(GameEvent::Stung {
                health: vitals.health,
            });
        }
        killed |= outcome == ContactOutcome::Killed;
    });
    if killed {
        session.begin_death(DeathCause::Health, now);
    }

    if session.oxygen.tick(dt) {
        session.begin_death(DeathCause::Oxygen, now);
    }

    let ctx = BubbleContext {
        dt,
        elapsed_ms: now,
        mouth: session.diver_position(world) + Vec2::new(session.tuning.diver_width / 2.0, 10.0),
        swimming: session.vitals.swimming,
        bounds: session.bubble_bounds(world),
        max_bubbles: session.settings.max_bubbles(),
    };
    let stats = session.bubbles.update(&mut session.rng, &ctx, &session.tuning);
    if stats.splits > 0 {
        log::debug!("{} bubbles split", stats.splits);
    }

    if let Some(rope) = session.rope.as_mut() {
        let params = RopeParams::from_tuning(&session.tuning);
        rope.update(dt, input.pointer, propelling, &params);
    }
}
