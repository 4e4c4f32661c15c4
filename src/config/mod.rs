//! Configuration types for agents, evolution and scenarios.
//!
//! A `Config` is passed into every stateful operation; nothing here is global.
//! Loaded from JSON using the camelCase option names (`maxPulsarsPerPrime`,
//! `resonanceStrength`, ...). Unknown keys are ignored and missing keys take
//! the defaults below.

use crate::core::NlqError;
use serde::{Deserialize, Serialize};

/// Default coupling of pulsar amplitudes toward their basis composite.
pub const DEFAULT_AMPLITUDE_COUPLING_STRENGTH: f64 = 0.5;
/// Default pull of pulsar phases toward their basis composite phase.
pub const DEFAULT_INTRA_BASIS_COHERENCE_STRENGTH: f64 = 0.05;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Prime numbers, one basis per entry, in encoding order.
    pub primes: Vec<u64>,

    /// Upper bound on pulsars pulled from the catalog for each prime.
    pub max_pulsars_per_prime: usize,

    /// Bitstring to transmit.
    pub message: String,

    /// Phase advance applied to `1` bits.
    pub epsilon: f64,

    /// Amplitude perturbation for the amplitude channel (0 disables it).
    pub amplitude_epsilon: f64,

    /// Decode threshold for phase and amplitude deltas. The default sits at
    /// half the default `epsilon`.
    pub threshold: f64,

    /// Evolution time step.
    pub delta: f64,

    /// Number of evolution steps in evolution mode.
    pub cycles: usize,

    /// Inter-basis resonance coupling.
    pub resonance_strength: f64,

    /// Message attractor coupling. Must dominate intrinsic rotation and the
    /// other couplings for an evolved message to stay within `threshold`;
    /// `message_force · delta` above 1 makes the explicit step overshoot.
    pub message_force: f64,

    /// Amplitude coupling; `None` falls back to [`DEFAULT_AMPLITUDE_COUPLING_STRENGTH`].
    pub amplitude_coupling_strength: Option<f64>,

    /// Intra-basis coherence; `None` falls back to [`DEFAULT_INTRA_BASIS_COHERENCE_STRENGTH`].
    pub intra_basis_coherence_strength: Option<f64>,

    /// Run the phase-correction pass during evolution.
    pub enable_phase_correction: bool,

    /// Correct every N cycles.
    pub correction_interval: usize,

    /// Fraction of the shortest-angle error removed per correction.
    pub correction_strength: f64,

    /// Use the extended agent's amplitude channel.
    pub use_amplitude_modulation: bool,

    /// Emit per-basis debug lines. Never affects results.
    pub verbose: bool,

    /// Constant added to every seed phase.
    pub initial_phase_offset: f64,

    /// Seed for jittered phase initialization; `None` keeps seeding purely deterministic.
    pub phase_seed: Option<u64>,

    /// Half-width of the seed jitter window, in radians.
    pub phase_jitter: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primes: vec![2, 3, 5, 7, 11, 13, 17, 19],
            max_pulsars_per_prime: 3,
            message: "10110010".to_string(),
            epsilon: 0.01,
            amplitude_epsilon: 0.0,
            threshold: 0.005,
            delta: 0.01,
            cycles: 100,
            resonance_strength: 0.1,
            message_force: 50.0,
            amplitude_coupling_strength: None,
            intra_basis_coherence_strength: None,
            enable_phase_correction: false,
            correction_interval: 10,
            correction_strength: 0.1,
            use_amplitude_modulation: false,
            verbose: false,
            initial_phase_offset: 0.0,
            phase_seed: None,
            phase_jitter: 0.0,
        }
    }
}

impl Config {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, NlqError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Checks that the configuration can drive a simulation.
    pub fn validate(&self) -> Result<(), NlqError> {
        if self.primes.is_empty() {
            return Err(invalid("at least one prime is required"));
        }
        if self.max_pulsars_per_prime == 0 {
            return Err(invalid("maxPulsarsPerPrime must be at least 1"));
        }
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("amplitudeEpsilon", self.amplitude_epsilon),
            ("threshold", self.threshold),
            ("delta", self.delta),
            ("correctionStrength", self.correction_strength),
            ("phaseJitter", self.phase_jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("{} must be finite and non-negative, got {}", name, value)));
            }
        }
        if self.enable_phase_correction && self.correction_interval == 0 {
            return Err(invalid("correctionInterval must be at least 1 when phase correction is enabled"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> NlqError {
    NlqError::InvalidConfiguration { message: message.to_string() }
}

/// Coupling coefficients for one evolution step, resolved from a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionConfig {
    /// Pull of each basis toward the state-wide mean composite phase.
    pub inter_basis_resonance_strength: f64,
    /// Pull of each pulsar toward its basis composite phase.
    pub intra_basis_coherence_strength: f64,
    /// Pull toward the encoded message target.
    pub message_attractor_force_strength: f64,
    /// Pull of each pulsar amplitude toward its equal share of the composite.
    pub amplitude_coupling_strength: f64,
    /// Phase offset that marks a `1` bit.
    pub epsilon_for_encoding: f64,
}

impl EvolutionConfig {
    /// Resolves coefficients, applying the documented defaults for unset options.
    pub fn from_config(config: &Config) -> Self {
        Self {
            inter_basis_resonance_strength: config.resonance_strength,
            intra_basis_coherence_strength: config
                .intra_basis_coherence_strength
                .unwrap_or(DEFAULT_INTRA_BASIS_COHERENCE_STRENGTH),
            message_attractor_force_strength: config.message_force,
            amplitude_coupling_strength: config
                .amplitude_coupling_strength
                .unwrap_or(DEFAULT_AMPLITUDE_COUPLING_STRENGTH),
            epsilon_for_encoding: config.epsilon,
        }
    }

    /// A configuration with every force switched off.
    pub fn inert() -> Self {
        Self {
            inter_basis_resonance_strength: 0.0,
            intra_basis_coherence_strength: 0.0,
            message_attractor_force_strength: 0.0,
            amplitude_coupling_strength: 0.0,
            epsilon_for_encoding: 0.0,
        }
    }
}
