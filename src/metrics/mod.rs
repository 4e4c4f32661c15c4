// src/metrics/mod.rs

//! Scalar quality measures over a `PrimeState` or a pair of states.

use crate::core::{PrimeBasis, PrimeState, WEIGHT_TOLERANCE};
use crate::phase::mean_resultant_length;
use serde::Serialize;
use std::fmt;

/// Snapshot of the metrics an agent reports for its working state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Agreement between working and reference state, in [-1, 1].
    pub resonance_strength: f64,
    /// Shannon entropy (nats) of the energy distribution over bases.
    pub entropy: f64,
    /// 1 − mean resultant length of the composite phases.
    pub phase_dispersion: f64,
}

impl Measurement {
    /// Measures `working` against `reference`.
    pub fn of(working: &PrimeState, reference: &PrimeState) -> Self {
        Self {
            resonance_strength: resonance_strength(working, reference),
            entropy: entropy(working),
            phase_dispersion: phase_dispersion(working),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resonance={:.6}, entropy={:.6}, dispersion={:.6}",
            self.resonance_strength, self.entropy, self.phase_dispersion
        )
    }
}

/// Aggregate phase agreement between two states.
///
/// Bases are paired by position. Each pair contributes `cos(Φa − Φb)` weighted
/// by the product of composite amplitudes; the result is the weighted average,
/// so it lies in [-1, 1] and a state compared with itself scores exactly 1.
/// With negligible total weight the unweighted average of the cosines is used.
/// Returns 0 when there are no pairs.
pub fn resonance_strength(a: &PrimeState, b: &PrimeState) -> f64 {
    let pairs: Vec<(&PrimeBasis, &PrimeBasis)> = a.bases().iter().zip(b.bases()).collect();
    if pairs.is_empty() {
        return 0.0;
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut unweighted = 0.0;
    for (x, y) in &pairs {
        let w = x.composite_amplitude() * y.composite_amplitude();
        let alignment = (x.composite_phase() - y.composite_phase()).cos();
        weighted += w * alignment;
        total_weight += w;
        unweighted += alignment;
    }

    if total_weight < WEIGHT_TOLERANCE {
        (unweighted / pairs.len() as f64).clamp(-1.0, 1.0)
    } else {
        (weighted / total_weight).clamp(-1.0, 1.0)
    }
}

/// Shannon entropy (nats) of the share of energy held by each basis.
///
/// 0 when all energy sits in one basis (or there is none), `ln(n)` when it is
/// spread evenly over `n` bases.
pub fn entropy(state: &PrimeState) -> f64 {
    let energies: Vec<f64> = state
        .bases()
        .iter()
        .map(|b| b.composite_amplitude() * b.composite_amplitude())
        .collect();
    let total: f64 = energies.iter().sum();
    if total < WEIGHT_TOLERANCE {
        return 0.0;
    }
    energies
        .iter()
        .map(|e| e / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum()
}

/// Spread of composite phases: 0 when all bases are aligned, up to 1 when they cancel.
pub fn phase_dispersion(state: &PrimeState) -> f64 {
    let phases: Vec<f64> = state.bases().iter().map(PrimeBasis::composite_phase).collect();
    let weights: Vec<f64> = state.bases().iter().map(PrimeBasis::composite_amplitude).collect();
    if phases.is_empty() {
        return 0.0;
    }
    1.0 - mean_resultant_length(&phases, &weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pulsar;
    use std::f64::consts::PI;

    fn single(phase: f64, amplitude: f64) -> PrimeBasis {
        PrimeBasis::new(2, vec![Pulsar::new(phase, amplitude, 0.0)])
    }

    #[test]
    fn self_resonance_is_maximal() {
        let state = PrimeState::from_bases(vec![single(0.3, 1.0), single(-2.0, 0.5), single(3.0, 2.0)]);
        assert_eq!(resonance_strength(&state, &state), 1.0);

        let mut other = state.clone();
        other.bases_mut()[0].pulsars_mut()[0].set_phase(1.3);
        other.update_composites();
        assert!(resonance_strength(&state, &other) < 1.0);
    }

    #[test]
    fn opposite_phases_anti_resonate() {
        let a = PrimeState::from_bases(vec![single(0.0, 1.0)]);
        let b = PrimeState::from_bases(vec![single(PI, 1.0)]);
        assert!((resonance_strength(&a, &b) + 1.0).abs() < 1e-12);
        assert_eq!(resonance_strength(&PrimeState::from_bases(vec![]), &a), 0.0);
    }

    #[test]
    fn zero_energy_falls_back_to_unweighted_alignment() {
        let a = PrimeState::from_bases(vec![single(0.0, 0.0), single(0.0, 0.0)]);
        assert_eq!(resonance_strength(&a, &a), 1.0);
        assert_eq!(entropy(&a), 0.0);
    }

    #[test]
    fn entropy_grows_with_spread() {
        let concentrated = PrimeState::from_bases(vec![single(0.0, 1.0), single(0.0, 0.0)]);
        let even = PrimeState::from_bases(vec![single(0.0, 1.0), single(0.0, 1.0)]);
        assert_eq!(entropy(&concentrated), 0.0);
        assert!((entropy(&even) - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn dispersion_tracks_alignment() {
        let aligned = PrimeState::from_bases(vec![single(0.5, 1.0), single(0.5, 1.0)]);
        let opposed = PrimeState::from_bases(vec![single(0.0, 1.0), single(PI, 1.0)]);
        assert!(phase_dispersion(&aligned).abs() < 1e-12);
        assert!((phase_dispersion(&opposed) - 1.0).abs() < 1e-12);
    }
}
