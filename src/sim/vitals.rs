//! Diver energy, health and oxygen
//!
//! Energy feeds swimming and regenerates, with a pause after it runs dry.
//! Health only goes down. Oxygen counts down every tick no matter what.
//! None of these know about the game phase; they report when they hit zero
//! and the session decides what that means.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Energy and health of the diver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiverVitals {
    pub energy: f32,
    pub max_energy: f32,
    /// Health in `[0, 1]`
    pub health: f32,
    /// When energy last ran out (ms since session start)
    pub out_of_energy_at: Option<f64>,
    /// True only on ticks where propulsion was applied
    pub swimming: bool,
    /// Cooldown after running out of energy
    pub cooldown_ms: f64,
    /// Energy regained per ms of rest
    pub regen_rate: f32,
}

impl DiverVitals {
    pub fn new(max_energy: f32, cooldown_ms: f64, regen_rate: f32) -> Self {
        Self {
            energy: max_energy,
            max_energy,
            health: 1.0,
            out_of_energy_at: None,
            swimming: false,
            cooldown_ms,
            regen_rate,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.max_energy,
            tuning.energy_cooldown_ms,
            tuning.energy_regen_rate,
        )
    }

    /// Whether the post-depletion pause has elapsed
    pub fn cooldown_over(&self, now_ms: f64) -> bool {
        self.out_of_energy_at
            .is_none_or(|at| now_ms - at > self.cooldown_ms)
    }

    /// Run the swim controller for one tick
    ///
    /// Returns true when propulsion should be applied this tick. Spends
    /// energy while ascending, records the moment it runs out, and otherwise
    /// regenerates once the cooldown is over.
    pub fn update_swim(&mut self, ascend: bool, dt: f32, now_ms: f64) -> bool {
        let dt = dt.max(0.0);
        let rested = self.cooldown_over(now_ms);

        if ascend && self.energy > 0.0 && rested {
            self.energy = (self.energy - dt).max(0.0);
            self.swimming = true;
            if self.energy == 0.0 {
                self.out_of_energy_at = Some(now_ms);
                log::debug!("Out of energy at {:.0} ms", now_ms);
            }
        } else {
            self.swimming = false;
            if rested {
                self.energy = (self.energy + dt * self.regen_rate).min(self.max_energy);
            }
        }
        self.swimming
    }

    /// Subtract health; returns true only on the call that reaches zero
    pub fn damage(&mut self, amount: f32) -> bool {
        if self.health <= 0.0 {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.health == 0.0
    }
}

/// Countdown of breathable air, in ms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxygenBudget {
    pub remaining: f32,
    pub max: f32,
}

impl OxygenBudget {
    pub fn new(max: f32) -> Self {
        Self {
            remaining: max,
            max,
        }
    }

    /// Random budget in `[min, max]`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Self {
        Self::new(rng.random_range(min..=max))
    }

    /// Burn `dt` of air; returns true when the budget is spent
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        self.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Remaining air as a fraction of the session max
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.remaining / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn vitals(max: f32) -> DiverVitals {
        DiverVitals::new(max, 3000.0, 0.3)
    }

    #[test]
    fn test_swim_spends_energy() {
        let mut v = vitals(100.0);
        assert!(v.update_swim(true, 10.0, 0.0));
        assert_eq!(v.energy, 90.0);
        assert!(v.swimming);
    }

    #[test]
    fn test_drain_to_zero_records_once() {
        let mut v = vitals(2000.0);
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 1.0;
            v.update_swim(true, 1.0, now);
        }
        assert_eq!(v.energy, 0.0);
        assert_eq!(v.out_of_energy_at, Some(2000.0));

        // Still holding ascend inside the cooldown: nothing changes
        for _ in 0..100 {
            now += 1.0;
            assert!(!v.update_swim(true, 1.0, now));
        }
        assert_eq!(v.energy, 0.0);
        assert_eq!(v.out_of_energy_at, Some(2000.0));
    }

    #[test]
    fn test_no_regen_during_cooldown() {
        let mut v = vitals(10.0);
        v.update_swim(true, 10.0, 1000.0);
        assert_eq!(v.out_of_energy_at, Some(1000.0));

        v.update_swim(false, 100.0, 2000.0);
        v.update_swim(false, 100.0, 4000.0);
        assert_eq!(v.energy, 0.0);

        v.update_swim(false, 10.0, 4001.0);
        assert!((v.energy - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut v = vitals(100.0);
        v.energy = 99.0;
        v.update_swim(false, 1000.0, 0.0);
        assert_eq!(v.energy, 100.0);
    }

    #[test]
    fn test_damage_idempotent_at_zero() {
        let mut v = vitals(100.0);
        assert!(!v.damage(0.5));
        assert!(v.damage(0.7));
        assert_eq!(v.health, 0.0);
        assert!(!v.damage(0.05));
        assert_eq!(v.health, 0.0);
    }

    #[test]
    fn test_oxygen_five_ticks() {
        let mut air = OxygenBudget::new(500.0);
        for _ in 0..4 {
            assert!(!air.tick(100.0));
        }
        assert!(air.tick(100.0));
        assert_eq!(air.remaining, 0.0);
    }

    #[test]
    fn test_random_oxygen_in_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let air = OxygenBudget::random(&mut rng, 100.0, 200.0);
            assert!((100.0..=200.0).contains(&air.max));
            assert_eq!(air.remaining, air.max);
        }
        assert_eq!(OxygenBudget::random(&mut rng, 50.0, 50.0).max, 50.0);
    }

    proptest! {
        #[test]
        fn prop_energy_bounded(steps in prop::collection::vec((any::<bool>(), 0.0f32..50.0), 1..200)) {
            let mut v = vitals(300.0);
            let mut now = 0.0f64;
            for (ascend, dt) in steps {
                now += dt as f64;
                let before = v.energy;
                let swam = v.update_swim(ascend, dt, now);
                prop_assert!(v.energy >= 0.0 && v.energy <= v.max_energy);
                if !ascend {
                    prop_assert!(v.energy >= before);
                }
                if swam {
                    prop_assert!(v.energy <= before);
                }
            }
        }

        #[test]
        fn prop_oxygen_drops_by_dt(dt in 0.0f32..1000.0) {
            let mut air = OxygenBudget::new(100_000.0);
            air.tick(dt);
            prop_assert_eq!(air.remaining, 100_000.0 - dt);
        }
    }
}
