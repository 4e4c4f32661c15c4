// src/phase/mod.rs

//! Phase arithmetic shared by every other module.
//!
//! All phases in the crate live in the canonical range (−π, π]. The helpers
//! here normalize into that range, measure signed angular distance, and
//! compute amplitude-weighted circular means.

use crate::config::Config;
use crate::core::{NlqError, PHI_INV, PI, TAU, WEIGHT_TOLERANCE};
use num_complex::Complex;
use num_traits::Zero;
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

/// Maps any real angle into (−π, π].
///
/// Values already inside the range are returned unchanged, which makes the
/// function exactly idempotent. Non-finite input maps to `0.0`.
pub fn normalize_phase(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    if x > -PI && x <= PI {
        return x;
    }
    let wrapped = x.rem_euclid(TAU); // [0, 2π)
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Signed rotation that takes `current` onto `target`, in (−π, π].
pub fn shortest_angle_difference(target: f64, current: f64) -> f64 {
    normalize_phase(target - current)
}

/// Amplitude-weighted circular mean of `phases`.
///
/// Sums `w·e^(iθ)` and takes the argument of the resultant. When every weight
/// is negligible the arithmetic mean of the phases is used instead. Weights are
/// paired with phases positionally; a missing weight counts as zero.
pub fn calculate_circular_mean(phases: &[f64], weights: &[f64]) -> f64 {
    if phases.is_empty() {
        return 0.0;
    }

    let mut resultant = Complex::<f64>::zero();
    let mut total_weight = 0.0;
    for (i, &phase) in phases.iter().enumerate() {
        let w = weights.get(i).copied().unwrap_or(0.0);
        resultant += Complex::from_polar(w, phase);
        total_weight += w.abs();
    }

    if total_weight < WEIGHT_TOLERANCE {
        let mean = phases.iter().sum::<f64>() / phases.len() as f64;
        return normalize_phase(mean);
    }
    normalize_phase(resultant.arg())
}

/// Mean resultant length `R ∈ [0, 1]` of weighted phases (1 = perfectly aligned).
pub fn mean_resultant_length(phases: &[f64], weights: &[f64]) -> f64 {
    let mut resultant = Complex::<f64>::zero();
    let mut total_weight = 0.0;
    for (&phase, &w) in phases.iter().zip(weights) {
        resultant += Complex::from_polar(w.abs(), phase);
        total_weight += w.abs();
    }
    if total_weight < WEIGHT_TOLERANCE {
        return 0.0;
    }
    (resultant.norm() / total_weight).clamp(0.0, 1.0)
}

/// Deterministic seed phase for pulsar `index` of basis `prime`.
///
/// Successive indices step by the golden fraction φ⁻¹ of a full turn, and each
/// prime starts from its own golden offset, so no two pulsars begin aligned.
pub fn calculate_initial_pulsar_phase(index: usize, prime: u64, config: &Config) -> f64 {
    let turns = (index as f64) * PHI_INV + (prime as f64) * PHI_INV * PHI_INV;
    normalize_phase(TAU * turns.fract() + config.initial_phase_offset)
}

/// Source of starting phases for freshly constructed pulsars.
pub trait PhaseSeeder {
    /// Returns the starting phase of pulsar `index` in the basis for `prime`.
    fn initial_phase(&mut self, index: usize, prime: u64, config: &Config) -> f64;
}

/// Purely deterministic golden-ratio dispersion.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoldenRatioSeeder;

impl PhaseSeeder for GoldenRatioSeeder {
    fn initial_phase(&mut self, index: usize, prime: u64, config: &Config) -> f64 {
        calculate_initial_pulsar_phase(index, prime, config)
    }
}

/// Golden-ratio dispersion plus uniform jitter from a seeded PRNG.
///
/// Two seeders built from the same seed and spread produce identical phases.
#[derive(Debug)]
pub struct JitteredSeeder {
    rng: StdRng,
    jitter: Option<Uniform<f64>>,
}

impl JitteredSeeder {
    /// Creates a seeder drawing jitter from `[-spread, spread]`.
    pub fn new(seed: u64, spread: f64) -> Result<Self, NlqError> {
        if !spread.is_finite() || spread < 0.0 {
            return Err(NlqError::InvalidConfiguration {
                message: format!("phase jitter spread must be finite and non-negative, got {}", spread),
            });
        }
        let jitter = if spread > 0.0 {
            let dist = Uniform::new_inclusive(-spread, spread).map_err(|e| NlqError::InvalidConfiguration {
                message: format!("cannot build jitter distribution: {}", e),
            })?;
            Some(dist)
        } else {
            None
        };
        Ok(Self { rng: StdRng::seed_from_u64(seed), jitter })
    }

    /// Builds the seeder described by `config.phase_seed` / `config.phase_jitter`.
    pub fn from_config(config: &Config) -> Result<Option<Self>, NlqError> {
        match config.phase_seed {
            Some(seed) => Self::new(seed, config.phase_jitter).map(Some),
            None => Ok(None),
        }
    }
}

impl PhaseSeeder for JitteredSeeder {
    fn initial_phase(&mut self, index: usize, prime: u64, config: &Config) -> f64 {
        let base = calculate_initial_pulsar_phase(index, prime, config);
        match &self.jitter {
            Some(dist) => normalize_phase(base + dist.sample(&mut self.rng)),
            None => base,
        }
    }
}
