// src/core/state.rs

use super::basis::PrimeBasis;
use super::constants::nlq_constants::WEIGHT_TOLERANCE;
use super::error::{Bit, NlqError};
use super::pulsar::Pulsar;
use crate::catalog::OscillatorRecord;
use crate::config::Config;
use crate::phase::PhaseSeeder;
use std::collections::HashMap;
use std::fmt;

/// Amplitude every pulsar starts from before the initial normalization.
const INITIAL_PULSAR_AMPLITUDE: f64 = 1.0;

/// The full oscillator hierarchy owned by one agent: prime bases in prime-list order.
///
/// `Clone` is a deep copy (every basis owns its pulsars), which is what the
/// reference snapshot and the simulated transfer rely on.
///
/// Amplitude normalization follows a fixed-total-energy rule: the sum of
/// squared pulsar amplitudes over the whole state equals the number of
/// non-empty bases. A freshly built state therefore has composite amplitude 1
/// in every non-empty basis, and amplitude perturbations survive
/// renormalization as shifts of energy between bases.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimeState {
    prime_bases: Vec<PrimeBasis>,
}

impl PrimeState {
    /// Builds one basis per prime from the catalog grouping.
    ///
    /// Each record (capped at `config.max_pulsars_per_prime`) becomes a pulsar
    /// with a phase from `seeder`, the record's frequency and a unit starting
    /// amplitude. Primes missing from `groups` get an empty basis.
    pub fn new(
        primes: &[u64],
        groups: &HashMap<u64, Vec<OscillatorRecord>>,
        seeder: &mut dyn PhaseSeeder,
        config: &Config,
    ) -> Self {
        let prime_bases = primes
            .iter()
            .map(|&prime| {
                let pulsars = groups
                    .get(&prime)
                    .map(|records| {
                        records
                            .iter()
                            .take(config.max_pulsars_per_prime)
                            .enumerate()
                            .map(|(index, record)| {
                                let phase = seeder.initial_phase(index, prime, config);
                                Pulsar::new(phase, INITIAL_PULSAR_AMPLITUDE, record.frequency)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                PrimeBasis::new(prime, pulsars)
            })
            .collect();

        let mut state = Self { prime_bases };
        state.initialize_normalized_amplitudes();
        state
    }

    /// Wraps already-built bases without renormalizing them.
    pub fn from_bases(prime_bases: Vec<PrimeBasis>) -> Self {
        Self { prime_bases }
    }

    /// All bases in encoding order.
    pub fn bases(&self) -> &[PrimeBasis] {
        &self.prime_bases
    }

    /// Basis at `index`, if present.
    pub fn basis(&self, index: usize) -> Option<&PrimeBasis> {
        self.prime_bases.get(index)
    }

    pub(crate) fn bases_mut(&mut self) -> &mut [PrimeBasis] {
        &mut self.prime_bases
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.prime_bases.len()
    }

    /// True when the state has no bases.
    pub fn is_empty(&self) -> bool {
        self.prime_bases.is_empty()
    }

    /// Sum of squared amplitudes over every pulsar.
    pub fn total_energy(&self) -> f64 {
        self.prime_bases.iter().map(PrimeBasis::energy).sum()
    }

    /// Encodes `bit` on basis `basis_index` relative to `reference_basis`.
    ///
    /// A `1` places every pulsar `epsilon` ahead of its reference pulsar; a `0`
    /// places it exactly on the reference phase. Composites are recomputed.
    /// Nothing is mutated when the index is out of range or the pulsar counts
    /// differ from the reference.
    pub fn modulate_prime_basis_phase(
        &mut self,
        basis_index: usize,
        bit: Bit,
        epsilon: f64,
        reference_basis: &PrimeBasis,
    ) -> Result<(), NlqError> {
        let basis = self
            .prime_bases
            .get_mut(basis_index)
            .ok_or(NlqError::BasisNotFound { index: basis_index })?;

        if basis.len() != reference_basis.len() {
            return Err(NlqError::MalformedBasis {
                index: basis_index,
                message: format!(
                    "basis has {} pulsars but its reference has {}",
                    basis.len(),
                    reference_basis.len()
                ),
            });
        }

        let offset = match bit {
            Bit::One => epsilon,
            Bit::Zero => 0.0,
        };
        for (pulsar, reference) in basis.pulsars_mut().iter_mut().zip(reference_basis.pulsars()) {
            pulsar.set_phase(reference.phase() + offset);
        }
        basis.update_composites();
        Ok(())
    }

    /// Adds `delta` to every pulsar amplitude of one basis, clamping at zero.
    ///
    /// Composites are recomputed; no renormalization happens here.
    pub fn shift_basis_amplitudes(&mut self, basis_index: usize, delta: f64) -> Result<(), NlqError> {
        let basis = self
            .prime_bases
            .get_mut(basis_index)
            .ok_or(NlqError::BasisNotFound { index: basis_index })?;
        for pulsar in basis.pulsars_mut() {
            pulsar.set_amplitude(pulsar.amplitude() + delta);
        }
        basis.update_composites();
        Ok(())
    }

    /// Rescales every amplitude by one global factor so the total energy equals
    /// the number of non-empty bases. A state with no energy is left as is.
    pub fn normalize_all_pulsar_amplitudes(&mut self) {
        let target = self.prime_bases.iter().filter(|b| !b.is_empty()).count() as f64;
        let energy = self.total_energy();
        if energy < WEIGHT_TOLERANCE || target == 0.0 {
            return;
        }
        let scale = (target / energy).sqrt();
        for basis in &mut self.prime_bases {
            for pulsar in basis.pulsars_mut() {
                pulsar.set_amplitude(pulsar.amplitude() * scale);
            }
        }
    }

    /// Recomputes the composite amplitude of every basis.
    pub fn update_composite_amplitudes(&mut self) {
        for basis in &mut self.prime_bases {
            basis.update_composite_amplitude();
        }
    }

    /// Recomputes composite phase and amplitude of every basis.
    pub fn update_composites(&mut self) {
        for basis in &mut self.prime_bases {
            basis.update_composites();
        }
    }

    /// Establishes the normalized amplitude baseline at construction.
    pub fn initialize_normalized_amplitudes(&mut self) {
        self.normalize_all_pulsar_amplitudes();
        // Weights changed, so the circular means move too.
        self.update_composites();
    }
}

impl fmt::Display for PrimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimeState[")?;
        for (i, basis) in self.prime_bases.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, basis)?;
        }
        write!(f, "]")
    }
}
