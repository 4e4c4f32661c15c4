// src/agents/extended.rs

use super::{CommunicationAgent, Transceiver};
use crate::catalog::OscillatorCatalog;
use crate::config::Config;
use crate::core::{Bit, NlqError};
use crate::logging::{LogLevel, Logger};
use crate::phase::{PhaseSeeder, calculate_circular_mean, normalize_phase, shortest_angle_difference};
use std::sync::Arc;

/// Agent with a second, amplitude-based channel and a phase-correction pass.
///
/// Holds a [`CommunicationAgent`] and builds on its phase encoding and
/// decoding; nothing of the base agent is reimplemented.
#[derive(Debug)]
pub struct QuantumCommunicationAgent {
    base: CommunicationAgent,
}

impl QuantumCommunicationAgent {
    /// See [`CommunicationAgent::new`].
    pub fn new(
        name: &str,
        config: &Config,
        catalog: &dyn OscillatorCatalog,
        seeder: &mut dyn PhaseSeeder,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, NlqError> {
        CommunicationAgent::new(name, config, catalog, seeder, logger).map(Self::from_base)
    }

    /// See [`CommunicationAgent::with_defaults`].
    pub fn with_defaults(name: &str, config: &Config) -> Result<Self, NlqError> {
        CommunicationAgent::with_defaults(name, config).map(Self::from_base)
    }

    /// Adds the amplitude channel to an existing agent.
    pub fn from_base(base: CommunicationAgent) -> Self {
        Self { base }
    }

    /// The wrapped phase agent.
    pub fn base(&self) -> &CommunicationAgent {
        &self.base
    }

    /// Mutable access to the wrapped phase agent.
    pub fn base_mut(&mut self) -> &mut CommunicationAgent {
        &mut self.base
    }

    /// Phase-encodes `message`, then optionally writes it into amplitudes too.
    ///
    /// With `amplitude_epsilon > 0`, every pulsar of an encoded basis gains
    /// (`1`) or loses (`0`) `amplitude_epsilon / n`, clamped at zero, followed
    /// by a global renormalization and a composite recompute. Characters other
    /// than `0` and `1` are recorded as `0` by the phase encoding but leave the
    /// amplitudes of their basis untouched.
    pub fn send_quantum_message(
        &mut self,
        message: &str,
        phase_epsilon: f64,
        amplitude_epsilon: f64,
    ) -> Result<(), NlqError> {
        self.base.send_message(message, phase_epsilon)?;
        if amplitude_epsilon <= 0.0 {
            return Ok(());
        }

        let bases = self.base.state().len();
        for (index, c) in message.chars().take(bases).enumerate() {
            let Some(bit) = Bit::from_char(c) else {
                continue;
            };
            let count = self.base.state().basis(index).map_or(0, |b| b.len());
            if count == 0 {
                self.base.log(LogLevel::Warn, &format!("basis {} has no pulsars, amplitude channel skipped", index));
                continue;
            }
            let step = amplitude_epsilon / count as f64;
            let delta = if bit == Bit::One { step } else { -step };
            if let Err(e) = self.base.state_mut().shift_basis_amplitudes(index, delta) {
                self.base.log(LogLevel::Warn, &format!("amplitude modulation of basis {} skipped: {}", index, e));
            }
        }

        let state = self.base.state_mut();
        state.normalize_all_pulsar_amplitudes();
        state.update_composites();
        self.base.log(LogLevel::Info, &format!("amplitude channel written with epsilon {}", amplitude_epsilon));
        Ok(())
    }

    /// Rotates every pulsar part of the way back toward its corrected target.
    ///
    /// Per basis the target composite is the circular mean of the reference
    /// pulsar phases weighted by the working amplitudes; each pulsar's target
    /// keeps its reference offset from that composite. The pulsar then moves by
    /// `strength` (clamped to [0, 1]) of the shortest rotation to its target.
    ///
    /// The target assumes every basis carries a `0`: the encoded bit is not
    /// consulted, so `1`-encoded bases are pulled back toward the reference
    /// just like drifted `0` bases.
    ///
    /// # Errors
    /// `NlqError::InvalidOperation` after decoding or for a non-finite strength.
    pub fn apply_phase_correction(&mut self, strength: f64) -> Result<(), NlqError> {
        self.base.ensure_not_decoded("apply phase correction")?;
        if !strength.is_finite() {
            return Err(NlqError::InvalidOperation {
                message: format!("correction strength must be finite, got {}", strength),
            });
        }
        let strength = strength.clamp(0.0, 1.0);
        let assumed_offset = 0.0;

        let reference = self.base.reference_state().clone();
        let mut skipped = Vec::new();
        for (index, basis) in self.base.state_mut().bases_mut().iter_mut().enumerate() {
            let Some(reference_basis) = reference.basis(index) else {
                skipped.push(index);
                continue;
            };
            if basis.is_empty() || basis.len() != reference_basis.len() {
                skipped.push(index);
                continue;
            }

            let reference_phases: Vec<f64> =
                reference_basis.pulsars().iter().map(|p| p.phase() + assumed_offset).collect();
            let weights: Vec<f64> = basis.pulsars().iter().map(|p| p.amplitude()).collect();
            let target_composite = calculate_circular_mean(&reference_phases, &weights);

            for (pulsar, baseline) in basis.pulsars_mut().iter_mut().zip(reference_basis.pulsars()) {
                let spread = shortest_angle_difference(baseline.phase(), reference_basis.composite_phase());
                let target = normalize_phase(target_composite + spread);
                let correction = shortest_angle_difference(target, pulsar.phase());
                pulsar.set_phase(pulsar.phase() + strength * correction);
            }
            basis.update_composites();
        }

        for index in skipped {
            self.base.log(LogLevel::Warn, &format!("phase correction skipped malformed basis {}", index));
        }
        self.base.log(LogLevel::Debug, &format!("phase correction applied with strength {}", strength));
        Ok(())
    }

    /// `1` when the working composite amplitude exceeds the reference by more than `amplitude_threshold`.
    pub fn decode_amplitude_bit(&self, basis_index: usize, amplitude_threshold: f64) -> Result<Bit, NlqError> {
        let working = self.base.state().basis(basis_index).ok_or(NlqError::BasisNotFound { index: basis_index })?;
        let reference = self
            .base
            .reference_state()
            .basis(basis_index)
            .ok_or(NlqError::BasisNotFound { index: basis_index })?;

        let gain = working.composite_amplitude() - reference.composite_amplitude();
        Ok(if gain > amplitude_threshold { Bit::One } else { Bit::Zero })
    }

    /// Phase decode, optionally OR-fused with the amplitude channel.
    ///
    /// With `use_amplitude`, any position whose amplitude decodes to `1`
    /// becomes `1` regardless of its phase vote. The same `threshold` is used
    /// for both channels.
    pub fn decode_quantum_message(&mut self, threshold: f64, use_amplitude: bool) -> String {
        let phase_decoded = self.base.decode_message(threshold);
        if !use_amplitude {
            return phase_decoded;
        }

        let fused: String = phase_decoded
            .chars()
            .enumerate()
            .map(|(index, phase_bit)| match self.decode_amplitude_bit(index, threshold) {
                Ok(Bit::One) => '1',
                Ok(Bit::Zero) => phase_bit,
                Err(e) => {
                    self.base.log(LogLevel::Warn, &format!("amplitude decode of basis {} failed: {}", index, e));
                    phase_bit
                }
            })
            .collect();

        if fused != phase_decoded {
            self.base.log(LogLevel::Debug, &format!("amplitude channel changed '{}' to '{}'", phase_decoded, fused));
        }
        fused
    }
}

impl Transceiver for QuantumCommunicationAgent {
    fn agent(&self) -> &CommunicationAgent {
        &self.base
    }

    fn agent_mut(&mut self) -> &mut CommunicationAgent {
        &mut self.base
    }

    fn encode(&mut self, config: &Config) -> Result<(), NlqError> {
        let amplitude_epsilon = if config.use_amplitude_modulation { config.amplitude_epsilon } else { 0.0 };
        self.send_quantum_message(&config.message, config.epsilon, amplitude_epsilon)
    }

    fn correct(&mut self, strength: f64) -> Result<(), NlqError> {
        self.apply_phase_correction(strength)
    }

    fn decode(&mut self, config: &Config) -> String {
        self.decode_quantum_message(config.threshold, config.use_amplitude_modulation)
    }
}
