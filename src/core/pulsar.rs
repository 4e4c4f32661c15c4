// src/core/pulsar.rs

use crate::phase::normalize_phase;
use std::fmt;

/// A single oscillator: the phase/amplitude carrier inside a prime basis.
///
/// The phase is kept in (−π, π] and the amplitude is never negative; both
/// setters enforce this, so every mutation path goes through them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulsar {
    phase: f64,
    amplitude: f64,
    base_frequency: f64,
}

impl Pulsar {
    /// Creates a pulsar, normalizing the phase and clamping the amplitude.
    pub fn new(phase: f64, amplitude: f64, base_frequency: f64) -> Self {
        let mut pulsar = Self { phase: 0.0, amplitude: 0.0, base_frequency };
        pulsar.set_phase(phase);
        pulsar.set_amplitude(amplitude);
        pulsar
    }

    /// Current phase in (−π, π].
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Current amplitude, always ≥ 0.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Intrinsic rotation rate.
    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Stores `phase` wrapped into the canonical range.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = normalize_phase(phase);
    }

    /// Stores `amplitude` clamped to be non-negative; non-finite values become 0.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = if amplitude.is_finite() { amplitude.max(0.0) } else { 0.0 };
    }
}

impl fmt::Display for Pulsar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pulsar(θ={:.4}, a={:.4}, ω={:.4})", self.phase, self.amplitude, self.base_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn setters_enforce_invariants() {
        let mut p = Pulsar::new(2.0 * TAU + 1.0, -2.0, 0.5);
        assert!((p.phase() - 1.0).abs() < 1e-12);
        assert_eq!(p.amplitude(), 0.0);

        p.set_amplitude(f64::NAN);
        assert_eq!(p.amplitude(), 0.0);
        p.set_amplitude(0.25);
        assert_eq!(p.amplitude(), 0.25);
    }
}
