// src/simulation/engine.rs
use crate::config::EvolutionConfig;
use crate::core::{Bit, NlqError, PrimeBasis, PrimeState, Pulsar};
use crate::phase::calculate_circular_mean;

/// What one evolution step could not do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionReport {
    /// Bases that carried a message bit but had no reference basis, so the
    /// message attractor was skipped for them.
    pub missing_reference: Vec<usize>,
}

impl EvolutionReport {
    /// True when every force could be applied.
    pub fn is_clean(&self) -> bool {
        self.missing_reference.is_empty()
    }
}

/// Advances every pulsar of `state` by one explicit step of size `timestep`.
///
/// Phase rate per pulsar `p` in basis `b`:
/// - intrinsic rotation `ω_p`
/// - inter-basis resonance `K_res · sin(Ψ − Φ_b)`, Ψ the amplitude-weighted
///   circular mean of all composite phases
/// - intra-basis coherence `K_coh · sin(Φ_b − θ_p)`
/// - message attractor `K_msg · sin(θ_ref + ε·bit − θ_p)`, only when
///   `message_bits` is non-empty and the basis has a bit
///
/// Amplitude rate: `K_amp · (A_b/√n − a_p)`, clamped so amplitudes stay ≥ 0.
///
/// Every rate is computed from the pre-step state, so the update does not
/// depend on the order pulsars are visited in. `θ_ref` is the matching
/// reference pulsar's phase, or the reference composite phase when the
/// reference basis is shorter.
pub fn evolve_quantum_state(
    state: &mut PrimeState,
    timestep: f64,
    config: &EvolutionConfig,
    message_bits: &[Bit],
    reference_bases: &[PrimeBasis],
) -> Result<EvolutionReport, NlqError> {
    if !timestep.is_finite() || timestep < 0.0 {
        return Err(NlqError::InvalidOperation {
            message: format!("evolution timestep must be finite and non-negative, got {}", timestep),
        });
    }

    let snapshot = state.clone();
    let composite_phases: Vec<f64> = snapshot.bases().iter().map(PrimeBasis::composite_phase).collect();
    let composite_amplitudes: Vec<f64> = snapshot.bases().iter().map(PrimeBasis::composite_amplitude).collect();
    let global_phase = calculate_circular_mean(&composite_phases, &composite_amplitudes);

    let mut report = EvolutionReport::default();

    for (index, basis) in state.bases_mut().iter_mut().enumerate() {
        let before = &snapshot.bases()[index];
        if before.is_empty() {
            continue;
        }

        let composite_phase = before.composite_phase();
        let resonance_rate = config.inter_basis_resonance_strength * (global_phase - composite_phase).sin();
        let amplitude_share = before.composite_amplitude() / (before.len() as f64).sqrt();

        // Receiver-side evolution passes no bits and runs without the attractor.
        let attractor = match message_bits.get(index) {
            Some(&bit) => match reference_bases.get(index) {
                Some(reference) => {
                    let offset = if bit == Bit::One { config.epsilon_for_encoding } else { 0.0 };
                    Some((reference, offset))
                }
                None => {
                    report.missing_reference.push(index);
                    None
                }
            },
            None => None,
        };

        for (p_index, (pulsar, prior)) in basis.pulsars_mut().iter_mut().zip(before.pulsars()).enumerate() {
            let theta = prior.phase();
            let mut phase_rate = prior.base_frequency()
                + resonance_rate
                + config.intra_basis_coherence_strength * (composite_phase - theta).sin();

            if let Some((reference, offset)) = attractor {
                let anchor = reference
                    .pulsars()
                    .get(p_index)
                    .map(Pulsar::phase)
                    .unwrap_or_else(|| reference.composite_phase());
                phase_rate += config.message_attractor_force_strength * (anchor + offset - theta).sin();
            }

            let amplitude_rate = config.amplitude_coupling_strength * (amplitude_share - prior.amplitude());

            pulsar.set_phase(theta + phase_rate * timestep);
            pulsar.set_amplitude(prior.amplitude() + amplitude_rate * timestep);
        }
        basis.update_composites();
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::shortest_angle_difference;

    const TOL: f64 = 1e-9;

    fn basis(prime: u64, phases: &[f64], amplitude: f64, frequency: f64) -> PrimeBasis {
        PrimeBasis::new(prime, phases.iter().map(|&p| Pulsar::new(p, amplitude, frequency)).collect())
    }

    fn sample_state(frequency: f64) -> PrimeState {
        PrimeState::from_bases(vec![
            basis(2, &[0.1, 0.9, -1.2], 0.6, frequency),
            basis(3, &[2.5, -2.9, 0.4], 0.5, frequency),
            basis(5, &[-0.3, 1.7], 0.7, frequency),
        ])
    }

    fn assert_states_close(a: &PrimeState, b: &PrimeState, context: &str) {
        for (x, y) in a.bases().iter().zip(b.bases()) {
            for (p, q) in x.pulsars().iter().zip(y.pulsars()) {
                assert!(shortest_angle_difference(p.phase(), q.phase()).abs() < TOL, "phase mismatch - {}", context);
                assert!((p.amplitude() - q.amplitude()).abs() < TOL, "amplitude mismatch - {}", context);
            }
        }
    }

    #[test]
    fn inert_step_leaves_state_unchanged() -> Result<(), NlqError> {
        let mut state = sample_state(0.0);
        let before = state.clone();
        let report = evolve_quantum_state(&mut state, 0.1, &EvolutionConfig::inert(), &[], &[])?;
        assert!(report.is_clean());
        assert_eq!(state, before);
        Ok(())
    }

    #[test]
    fn intrinsic_rotation_advances_by_frequency_times_step() -> Result<(), NlqError> {
        let mut state = sample_state(2.0);
        let before = state.clone();
        evolve_quantum_state(&mut state, 0.05, &EvolutionConfig::inert(), &[], &[])?;
        for (x, y) in state.bases().iter().zip(before.bases()) {
            for (p, q) in x.pulsars().iter().zip(y.pulsars()) {
                assert!((shortest_angle_difference(p.phase(), q.phase()) - 0.1).abs() < TOL);
            }
        }
        Ok(())
    }

    #[test]
    fn coherence_pulls_pulsars_together() -> Result<(), NlqError> {
        let mut state = PrimeState::from_bases(vec![basis(2, &[-0.4, 0.4], 1.0, 0.0)]);
        let config = EvolutionConfig { intra_basis_coherence_strength: 1.0, ..EvolutionConfig::inert() };
        for _ in 0..50 {
            evolve_quantum_state(&mut state, 0.1, &config, &[], &[])?;
        }
        let pulsars = state.bases()[0].pulsars();
        assert!(shortest_angle_difference(pulsars[0].phase(), pulsars[1].phase()).abs() < 0.1);
        Ok(())
    }

    #[test]
    fn resonance_pulls_bases_toward_common_phase() -> Result<(), NlqError> {
        let mut state = PrimeState::from_bases(vec![basis(2, &[-0.5], 1.0, 0.0), basis(3, &[0.5], 1.0, 0.0)]);
        let config = EvolutionConfig { inter_basis_resonance_strength: 1.0, ..EvolutionConfig::inert() };
        let spread = |s: &PrimeState| shortest_angle_difference(s.bases()[1].composite_phase(), s.bases()[0].composite_phase());
        let initial = spread(&state);
        evolve_quantum_state(&mut state, 0.1, &config, &[], &[])?;
        assert!(spread(&state) < initial);
        Ok(())
    }

    #[test]
    fn update_is_independent_of_pulsar_order() -> Result<(), NlqError> {
        let config = EvolutionConfig {
            inter_basis_resonance_strength: 0.3,
            intra_basis_coherence_strength: 0.7,
            message_attractor_force_strength: 0.0,
            amplitude_coupling_strength: 0.5,
            epsilon_for_encoding: 0.0,
        };
        let forward = PrimeState::from_bases(vec![
            PrimeBasis::new(2, vec![Pulsar::new(0.1, 0.2, 1.0), Pulsar::new(1.1, 0.9, 0.5), Pulsar::new(-2.0, 0.4, 0.2)]),
        ]);
        let reversed = PrimeState::from_bases(vec![PrimeBasis::new(
            2,
            forward.bases()[0].pulsars().iter().rev().copied().collect(),
        )]);

        let mut a = forward.clone();
        let mut b = reversed.clone();
        evolve_quantum_state(&mut a, 0.1, &config, &[], &[])?;
        evolve_quantum_state(&mut b, 0.1, &config, &[], &[])?;

        let b_back = PrimeState::from_bases(vec![PrimeBasis::new(
            2,
            b.bases()[0].pulsars().iter().rev().copied().collect(),
        )]);
        assert_states_close(&a, &b_back, "reversed pulsar order");
        Ok(())
    }

    #[test]
    fn message_attractor_settles_on_encoded_offsets() -> Result<(), NlqError> {
        let reference = sample_state(0.0);
        let mut state = reference.clone();
        let bits = [Bit::One, Bit::Zero, Bit::One];
        let config = EvolutionConfig {
            message_attractor_force_strength: 10.0,
            epsilon_for_encoding: 0.2,
            ..EvolutionConfig::inert()
        };
        for _ in 0..200 {
            evolve_quantum_state(&mut state, 0.05, &config, &bits, reference.bases())?;
        }
        for ((basis, reference_basis), bit) in state.bases().iter().zip(reference.bases()).zip(bits) {
            let expected = if bit == Bit::One { 0.2 } else { 0.0 };
            for (p, r) in basis.pulsars().iter().zip(reference_basis.pulsars()) {
                assert!((shortest_angle_difference(p.phase(), r.phase()) - expected).abs() < 1e-6);
            }
        }
        Ok(())
    }

    #[test]
    fn passive_evolution_ignores_reference() -> Result<(), NlqError> {
        let reference = sample_state(0.0);
        let config = EvolutionConfig {
            message_attractor_force_strength: 10.0,
            epsilon_for_encoding: 0.2,
            ..EvolutionConfig::inert()
        };
        let mut state = reference.clone();
        evolve_quantum_state(&mut state, 0.05, &config, &[], reference.bases())?;
        assert_eq!(state, reference);
        Ok(())
    }

    #[test]
    fn missing_reference_is_reported_not_fatal() -> Result<(), NlqError> {
        let mut state = sample_state(0.0);
        let config = EvolutionConfig { message_attractor_force_strength: 1.0, ..EvolutionConfig::inert() };
        let report = evolve_quantum_state(&mut state, 0.1, &config, &[Bit::One, Bit::One], &[])?;
        assert_eq!(report.missing_reference, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn amplitudes_never_go_negative() -> Result<(), NlqError> {
        let mut state = PrimeState::from_bases(vec![PrimeBasis::new(
            2,
            vec![Pulsar::new(0.0, 0.0, 0.0), Pulsar::new(0.5, 2.0, 0.0)],
        )]);
        let config = EvolutionConfig { amplitude_coupling_strength: 50.0, ..EvolutionConfig::inert() };
        for _ in 0..5 {
            evolve_quantum_state(&mut state, 0.1, &config, &[], &[])?;
            assert!(state.bases()[0].pulsars().iter().all(|p| p.amplitude() >= 0.0));
        }
        Ok(())
    }

    #[test]
    fn rejects_invalid_timestep() {
        let mut state = sample_state(0.0);
        assert!(evolve_quantum_state(&mut state, f64::NAN, &EvolutionConfig::inert(), &[], &[]).is_err());
        assert!(evolve_quantum_state(&mut state, -0.1, &EvolutionConfig::inert(), &[], &[]).is_err());
    }
}
