// src/core/basis.rs

use super::pulsar::Pulsar;
use crate::phase::calculate_circular_mean;
use std::fmt;

/// The oscillators grouped under one prime: the unit of message encoding.
///
/// `composite_phase` (amplitude-weighted circular mean) and
/// `composite_amplitude` (root-sum-of-squares) are derived values; every
/// mutation through [`PrimeBasis::pulsars_mut`] must be followed by
/// [`PrimeBasis::update_composites`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrimeBasis {
    prime: u64,
    pulsars: Vec<Pulsar>,
    composite_phase: f64,
    composite_amplitude: f64,
}

impl PrimeBasis {
    /// Creates a basis and computes its composites.
    pub fn new(prime: u64, pulsars: Vec<Pulsar>) -> Self {
        let mut basis = Self { prime, pulsars, composite_phase: 0.0, composite_amplitude: 0.0 };
        basis.update_composites();
        basis
    }

    /// The prime this basis is grouped under.
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Oscillators in catalog order.
    pub fn pulsars(&self) -> &[Pulsar] {
        &self.pulsars
    }

    /// Mutable access for the state and evolution code.
    pub(crate) fn pulsars_mut(&mut self) -> &mut [Pulsar] {
        &mut self.pulsars
    }

    /// Number of oscillators.
    pub fn len(&self) -> usize {
        self.pulsars.len()
    }

    /// True when the basis holds no oscillators.
    pub fn is_empty(&self) -> bool {
        self.pulsars.is_empty()
    }

    /// Amplitude-weighted circular mean phase; 0 for an empty basis.
    pub fn composite_phase(&self) -> f64 {
        self.composite_phase
    }

    /// Root-sum-of-squares amplitude; 0 for an empty basis.
    pub fn composite_amplitude(&self) -> f64 {
        self.composite_amplitude
    }

    /// Sum of squared pulsar amplitudes.
    pub fn energy(&self) -> f64 {
        self.pulsars.iter().map(|p| p.amplitude() * p.amplitude()).sum()
    }

    /// Recomputes only the composite amplitude.
    pub fn update_composite_amplitude(&mut self) {
        self.composite_amplitude = self.energy().sqrt();
    }

    /// Recomputes both composites from the pulsars.
    pub fn update_composites(&mut self) {
        if self.pulsars.is_empty() {
            self.composite_phase = 0.0;
            self.composite_amplitude = 0.0;
            return;
        }
        let phases: Vec<f64> = self.pulsars.iter().map(Pulsar::phase).collect();
        let weights: Vec<f64> = self.pulsars.iter().map(Pulsar::amplitude).collect();
        self.composite_phase = calculate_circular_mean(&phases, &weights);
        self.update_composite_amplitude();
    }
}

impl fmt::Display for PrimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Basis(p={}, n={}, Φ={:.4}, A={:.4})",
            self.prime,
            self.pulsars.len(),
            self.composite_phase,
            self.composite_amplitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_basis_has_zero_composites() {
        let basis = PrimeBasis::new(7, vec![]);
        assert!(basis.is_empty());
        assert_eq!(basis.composite_phase(), 0.0);
        assert_eq!(basis.composite_amplitude(), 0.0);
    }

    #[test]
    fn composites_follow_pulsars() {
        let mut basis = PrimeBasis::new(3, vec![Pulsar::new(0.2, 3.0, 1.0), Pulsar::new(0.2, 4.0, 1.0)]);
        assert!((basis.composite_amplitude() - 5.0).abs() < 1e-12);
        assert!((basis.composite_phase() - 0.2).abs() < 1e-12);

        basis.pulsars_mut()[0].set_phase(0.6);
        basis.pulsars_mut()[1].set_phase(0.6);
        basis.update_composites();
        assert!((basis.composite_phase() - 0.6).abs() < 1e-12);
    }
}
