//! Smoothed 2D value noise
//!
//! Deterministic drift field for bubbles and seabed heights. Nearby sample
//! points return nearby values, so particles sampled close together drift
//! together. Output is in `[0, 1)`.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

/// Lattice size (power of two)
const TABLE_SIZE: usize = 256;
/// Octaves summed per sample
const OCTAVES: u32 = 4;
/// Amplitude falloff per octave
const FALLOFF: f32 = 0.5;

/// Seeded value-noise field
#[derive(Debug, Clone)]
pub struct SmoothNoise {
    perm: [u8; TABLE_SIZE * 2],
    values: [f32; TABLE_SIZE],
}

impl SmoothNoise {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);

        let mut order: Vec<u8> = (0..TABLE_SIZE).map(|i| i as u8).collect();
        order.shuffle(&mut rng);
        let mut perm = [0u8; TABLE_SIZE * 2];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = order[i % TABLE_SIZE];
        }

        let mut values = [0.0f32; TABLE_SIZE];
        for (i, value) in values.iter_mut().enumerate() {
            // Evenly spaced lattice values, shuffled by the permutation
            *value = i as f32 / TABLE_SIZE as f32;
        }

        Self { perm, values }
    }

    /// Sample the field, summing octaves with halving amplitude
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = FALLOFF;
        let mut frequency = 1.0;
        let mut norm = 0.0;
        for _ in 0..OCTAVES {
            total += self.lattice(x * frequency, y * frequency) * amplitude;
            norm += amplitude;
            amplitude *= FALLOFF;
            frequency *= 2.0;
        }
        (total / norm).clamp(0.0, 1.0 - f32::EPSILON)
    }

    /// Sample re-centred to `[-0.5, 0.5)`
    #[inline]
    pub fn centered(&self, x: f32, y: f32) -> f32 {
        self.sample(x, y) - 0.5
    }

    fn lattice(&self, x: f32, y: f32) -> f32 {
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (smoothstep(x - x0), smoothstep(y - y0));
        let (xi, yi) = (wrap(x0), wrap(y0));
        let (xj, yj) = ((xi + 1) & (TABLE_SIZE - 1), (yi + 1) & (TABLE_SIZE - 1));

        let v00 = self.value_at(xi, yi);
        let v10 = self.value_at(xj, yi);
        let v01 = self.value_at(xi, yj);
        let v11 = self.value_at(xj, yj);

        let top = v00 + (v10 - v00) * fx;
        let bottom = v01 + (v11 - v01) * fx;
        top + (bottom - top) * fy
    }

    #[inline]
    fn value_at(&self, xi: usize, yi: usize) -> f32 {
        let idx = self.perm[self.perm[xi] as usize + yi] as usize;
        self.values[idx]
    }
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn wrap(v: f32) -> usize {
    (v as i64).rem_euclid(TABLE_SIZE as i64) as usize
}
