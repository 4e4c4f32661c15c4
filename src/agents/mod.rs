// src/agents/mod.rs

//! Communication agents: the encode / evolve / decode / measure protocol.
//!
//! [`CommunicationAgent`] is the phase-only agent. [`QuantumCommunicationAgent`]
//! wraps one and adds the amplitude channel and phase correction. Both speak
//! [`Transceiver`], which is what the simulator drives.

pub mod extended;

pub use extended::QuantumCommunicationAgent;

use crate::catalog::{HarmonicCatalog, OscillatorCatalog};
use crate::config::{Config, EvolutionConfig};
use crate::core::{Bit, NlqError, PrimeState};
use crate::logging::{LogLevel, Logger, TracingLogger};
use crate::metrics::Measurement;
use crate::phase::{GoldenRatioSeeder, JitteredSeeder, PhaseSeeder, shortest_angle_difference};
use crate::simulation::{EvolutionReport, evolve_quantum_state};
use std::fmt;
use std::sync::Arc;

/// Lifecycle of an agent. Transitions only move forward; going back means
/// building a new agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentPhase {
    /// Freshly built; working state equals the reference.
    Constructed,
    /// A message has been written into the working state.
    Encoded,
    /// At least one evolution step has run.
    Evolved,
    /// The working state has been read out.
    Decoded,
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Phase-only communication agent.
///
/// Owns a working [`PrimeState`] and a reference snapshot taken right after
/// construction. The reference is never mutated; it is the zero-message
/// baseline that decoding measures against.
pub struct CommunicationAgent {
    name: String,
    config: Config,
    state: PrimeState,
    reference: PrimeState,
    lifecycle: AgentPhase,
    encoded: Vec<Bit>,
    logger: Arc<dyn Logger>,
}

impl CommunicationAgent {
    /// Builds an agent from a catalog grouping and a phase seeder.
    ///
    /// # Errors
    /// `NlqError::InvalidConfiguration` when `config` fails validation.
    pub fn new(
        name: &str,
        config: &Config,
        catalog: &dyn OscillatorCatalog,
        seeder: &mut dyn PhaseSeeder,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, NlqError> {
        config.validate()?;

        let groups = catalog.group_by_prime(&config.primes, config.max_pulsars_per_prime);
        let state = PrimeState::new(&config.primes, &groups, seeder, config);
        for basis in state.bases().iter().filter(|b| b.is_empty()) {
            logger.log(LogLevel::Warn, &format!("{}: catalog has no oscillators for prime {}", name, basis.prime()));
        }
        let reference = state.clone();

        logger.log(
            LogLevel::System,
            &format!("{}: constructed with {} prime bases", name, state.len()),
        );

        Ok(Self {
            name: name.to_string(),
            config: config.clone(),
            state,
            reference,
            lifecycle: AgentPhase::Constructed,
            encoded: Vec::new(),
            logger,
        })
    }

    /// Builds an agent over a generated harmonic catalog, logging through `tracing`.
    ///
    /// Phases are jittered when `config.phase_seed` is set, golden-ratio otherwise.
    pub fn with_defaults(name: &str, config: &Config) -> Result<Self, NlqError> {
        let catalog = HarmonicCatalog::covering(&config.primes, config.max_pulsars_per_prime);
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
        match JitteredSeeder::from_config(config)? {
            Some(mut seeder) => Self::new(name, config, &catalog, &mut seeder, logger),
            None => Self::new(name, config, &catalog, &mut GoldenRatioSeeder, logger),
        }
    }

    /// Wraps explicit working and reference states, e.g. hand-built test fixtures.
    pub fn from_states(
        name: &str,
        config: &Config,
        state: PrimeState,
        reference: PrimeState,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.to_string(),
            config: config.clone(),
            state,
            reference,
            lifecycle: AgentPhase::Constructed,
            encoded: Vec::new(),
            logger,
        }
    }

    /// Agent name used in log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the agent was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Working state.
    pub fn state(&self) -> &PrimeState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut PrimeState {
        &mut self.state
    }

    /// Immutable zero-message baseline.
    pub fn reference_state(&self) -> &PrimeState {
        &self.reference
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> AgentPhase {
        self.lifecycle
    }

    /// Bits written by the last `send_message`, one per encoded basis.
    pub fn encoded_message(&self) -> &[Bit] {
        &self.encoded
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        self.logger.log(level, &format!("{}: {}", self.name, message));
    }

    pub(crate) fn ensure_not_decoded(&self, operation: &str) -> Result<(), NlqError> {
        if self.lifecycle == AgentPhase::Decoded {
            return Err(NlqError::InvalidOperation {
                message: format!("{}: cannot {} after the state has been decoded", self.name, operation),
            });
        }
        Ok(())
    }

    /// Writes `bits` into the working state, one bit per basis.
    ///
    /// Characters past the last basis are ignored. Characters other than `0`
    /// and `1` leave their basis on the reference (and are recorded as `0`).
    /// A basis that cannot be modulated is logged and skipped.
    ///
    /// # Errors
    /// `NlqError::InvalidOperation` unless the agent is freshly constructed.
    pub fn send_message(&mut self, bits: &str, epsilon: f64) -> Result<(), NlqError> {
        if self.lifecycle != AgentPhase::Constructed {
            return Err(NlqError::InvalidOperation {
                message: format!("{}: a message can only be encoded once, agent is {}", self.name, self.lifecycle),
            });
        }

        let capacity = self.state.len();
        let mut encoded = Vec::with_capacity(capacity.min(bits.len()));
        for (index, c) in bits.chars().take(capacity).enumerate() {
            let bit = match Bit::from_char(c) {
                Some(bit) => bit,
                None => {
                    self.log(LogLevel::Warn, &format!("position {}: '{}' is not a bit, leaving basis on reference", index, c));
                    encoded.push(Bit::Zero);
                    continue;
                }
            };
            encoded.push(bit);

            let outcome = match self.reference.basis(index) {
                Some(reference_basis) => self.state.modulate_prime_basis_phase(index, bit, epsilon, reference_basis),
                None => Err(NlqError::BasisNotFound { index }),
            };
            if let Err(e) = outcome {
                self.log(LogLevel::Warn, &format!("skipping basis {}: {}", index, e));
            }
        }

        let ignored = bits.chars().count().saturating_sub(capacity);
        if ignored > 0 {
            self.log(LogLevel::Debug, &format!("{} message bits beyond {} bases ignored", ignored, capacity));
        }

        self.encoded = encoded;
        self.lifecycle = AgentPhase::Encoded;
        self.log(LogLevel::Info, &format!("encoded {} bits with epsilon {}", self.encoded.len(), epsilon));
        Ok(())
    }

    /// Runs one evolution step of size `timestep` against the reference.
    ///
    /// An empty `message_bits` evolves passively (no message attractor).
    /// Unset amplitude coupling and intra-basis coherence fall back to 0.5 and 0.05.
    ///
    /// # Errors
    /// `NlqError::InvalidOperation` after decoding or for an invalid timestep.
    pub fn evolve(&mut self, timestep: f64, config: &Config, message_bits: &[Bit]) -> Result<EvolutionReport, NlqError> {
        self.ensure_not_decoded("evolve")?;

        let evolution = EvolutionConfig::from_config(config);
        let report = evolve_quantum_state(&mut self.state, timestep, &evolution, message_bits, self.reference.bases())?;
        for index in &report.missing_reference {
            self.log(LogLevel::Warn, &format!("basis {} has no reference, message attractor skipped", index));
        }
        self.lifecycle = AgentPhase::Evolved;

        if self.config.verbose {
            self.log(LogLevel::Debug, &format!("evolved by {}: {}", timestep, self.measure()));
        }
        Ok(report)
    }

    /// Metrics of the working state against the reference.
    pub fn measure(&self) -> Measurement {
        Measurement::of(&self.state, &self.reference)
    }

    /// Reads one bit per basis by pulsar majority vote.
    ///
    /// A pulsar votes `1` when its phase leads its reference pulsar by more
    /// than `threshold`. Ties decode to `0`. A basis that cannot be read is
    /// logged and decodes to `0`. The result always has one character per basis.
    pub fn decode_message(&mut self, threshold: f64) -> String {
        let decoded: String = (0..self.state.len())
            .map(|index| match self.decode_phase_bit(index, threshold) {
                Ok(bit) => bit.as_char(),
                Err(e) => {
                    self.log(LogLevel::Warn, &format!("basis {} decoded as 0: {}", index, e));
                    '0'
                }
            })
            .collect();

        self.lifecycle = AgentPhase::Decoded;
        self.log(LogLevel::Info, &format!("decoded '{}'", decoded));
        decoded
    }

    /// Majority-vote phase decode of a single basis.
    pub fn decode_phase_bit(&self, basis_index: usize, threshold: f64) -> Result<Bit, NlqError> {
        let working = self.state.basis(basis_index).ok_or(NlqError::BasisNotFound { index: basis_index })?;
        let reference = self.reference.basis(basis_index).ok_or(NlqError::BasisNotFound { index: basis_index })?;

        if working.is_empty() {
            return Err(NlqError::MalformedBasis { index: basis_index, message: "basis has no pulsars".to_string() });
        }
        if working.len() != reference.len() {
            return Err(NlqError::MalformedBasis {
                index: basis_index,
                message: format!("{} pulsars against {} in the reference", working.len(), reference.len()),
            });
        }

        let mut ones = 0usize;
        let mut zeros = 0usize;
        for (pulsar, baseline) in working.pulsars().iter().zip(reference.pulsars()) {
            let delta = shortest_angle_difference(pulsar.phase(), baseline.phase());
            if delta > threshold {
                ones += 1;
            } else {
                zeros += 1;
            }
        }

        if self.config.verbose {
            self.log(LogLevel::Debug, &format!("basis {} (p={}): {} votes for 1, {} for 0", basis_index, working.prime(), ones, zeros));
        }
        Ok(if ones > zeros { Bit::One } else { Bit::Zero })
    }

    /// Copies working and reference state into `receiver`, simulating transfer.
    ///
    /// The receiver gets deep copies and takes over the sender's lifecycle phase
    /// and encoded bits; nothing is shared afterwards.
    pub fn transfer_to(&self, receiver: &mut CommunicationAgent) {
        receiver.state = self.state.clone();
        receiver.reference = self.reference.clone();
        receiver.lifecycle = self.lifecycle;
        receiver.encoded = self.encoded.clone();
        self.log(LogLevel::System, &format!("state copied to {}", receiver.name));
    }
}

impl fmt::Debug for CommunicationAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommunicationAgent")
            .field("name", &self.name)
            .field("lifecycle", &self.lifecycle)
            .field("bases", &self.state.len())
            .field("encoded", &self.encoded)
            .finish_non_exhaustive()
    }
}

/// The protocol surface the simulator drives.
///
/// Defaults implement phase-only behaviour on top of [`CommunicationAgent`];
/// agents with an amplitude channel override `encode`, `decode` and `correct`.
pub trait Transceiver {
    /// The underlying phase agent.
    fn agent(&self) -> &CommunicationAgent;

    /// Mutable access to the underlying phase agent.
    fn agent_mut(&mut self) -> &mut CommunicationAgent;

    /// Encodes `config.message` with `config.epsilon`.
    fn encode(&mut self, config: &Config) -> Result<(), NlqError> {
        self.agent_mut().send_message(&config.message, config.epsilon)
    }

    /// One evolution step of `config.delta`.
    fn evolve(&mut self, config: &Config, message_bits: &[Bit]) -> Result<EvolutionReport, NlqError> {
        self.agent_mut().evolve(config.delta, config, message_bits)
    }

    /// Phase-correction pass. Phase-only agents have none.
    fn correct(&mut self, _strength: f64) -> Result<(), NlqError> {
        Ok(())
    }

    /// Decodes with `config.threshold`.
    fn decode(&mut self, config: &Config) -> String {
        self.agent_mut().decode_message(config.threshold)
    }

    /// Working-vs-reference metrics.
    fn measure(&self) -> Measurement {
        self.agent().measure()
    }

    /// Replaces this agent's states with copies of `sender`'s.
    fn receive_from(&mut self, sender: &Self)
    where
        Self: Sized,
    {
        sender.agent().transfer_to(self.agent_mut());
    }
}

impl Transceiver for CommunicationAgent {
    fn agent(&self) -> &CommunicationAgent {
        self
    }

    fn agent_mut(&mut self) -> &mut CommunicationAgent {
        self
    }
}
