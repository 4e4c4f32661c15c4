// src/simulation/mod.rs

//! Time evolution of prime states and the scenario runner built on top of it.
//!
//! `engine` holds the integrator used by the agents. The `Simulator` plays the
//! orchestrator: it builds a sender and a receiver, sequences encode, evolve,
//! correct, transfer and decode for a [`Scenario`], and is the only place where
//! an error aborts a run (it becomes a failed [`TransmissionResult`]).

mod results;
pub mod engine;

// Re-export the main public interface types
pub use engine::{EvolutionReport, evolve_quantum_state};
pub use results::TransmissionResult;

use crate::agents::{CommunicationAgent, QuantumCommunicationAgent, Transceiver};
use crate::catalog::{HarmonicCatalog, OscillatorCatalog};
use crate::config::Config;
use crate::core::{Bit, NlqError};
use crate::logging::{LogLevel, Logger, TracingLogger};
use crate::phase::{GoldenRatioSeeder, JitteredSeeder};
use std::fmt;
use std::sync::Arc;

/// The workflows the simulator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Encode, then decode with no evolution; the receiver decodes a copy of the sender's state.
    Direct,
    /// Encode, copy into the receiver, then evolve both (sender with the
    /// message attractor, receiver passively) before decoding each.
    Evolution,
    /// Encode and evolve the sender, then copy its state into the receiver and decode both.
    Transfer,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Runs scenarios between a freshly built sender and receiver.
pub struct Simulator {
    config: Config,
    catalog: Box<dyn OscillatorCatalog>,
    logger: Arc<dyn Logger>,
}

impl Simulator {
    /// Creates a simulator over a generated harmonic catalog that logs through `tracing`.
    pub fn new(config: Config) -> Self {
        let catalog = HarmonicCatalog::covering(&config.primes, config.max_pulsars_per_prime);
        Self { config, catalog: Box::new(catalog), logger: Arc::new(TracingLogger) }
    }

    /// Replaces the oscillator catalog.
    pub fn with_catalog(mut self, catalog: impl OscillatorCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    /// Replaces the logging sink.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// The configuration every run uses.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs `scenario`, converting any error into a failed result.
    ///
    /// Both sides are [`QuantumCommunicationAgent`]s, so phase correction runs
    /// whenever `enable_phase_correction` is set; the amplitude channel is only
    /// written and read with `use_amplitude_modulation`.
    pub fn run(&self, scenario: Scenario) -> TransmissionResult {
        match self.try_run(scenario) {
            Ok(result) => {
                let level = if result.is_success() { LogLevel::Success } else { LogLevel::Info };
                self.logger.log(
                    level,
                    &format!(
                        "{} scenario: sender {}, receiver {}",
                        scenario,
                        if result.sender_success { "ok" } else { "failed" },
                        if result.receiver_success { "ok" } else { "failed" }
                    ),
                );
                result
            }
            Err(e) => {
                self.logger.log(LogLevel::Error, &format!("{} scenario aborted: {}", scenario, e));
                TransmissionResult::failed()
            }
        }
    }

    /// Runs `scenario`, surfacing the first error.
    pub fn try_run(&self, scenario: Scenario) -> Result<TransmissionResult, NlqError> {
        self.config.validate()?;
        self.logger.log(
            LogLevel::System,
            &format!("{} scenario: message '{}' over {} bases", scenario, self.config.message, self.config.primes.len()),
        );

        let sender = QuantumCommunicationAgent::from_base(self.build_agent("sender")?);
        let receiver = QuantumCommunicationAgent::from_base(self.build_agent("receiver")?);
        self.run_with(sender, receiver, scenario)
    }

    fn build_agent(&self, name: &str) -> Result<CommunicationAgent, NlqError> {
        let logger = Arc::clone(&self.logger);
        match JitteredSeeder::from_config(&self.config)? {
            Some(mut seeder) => CommunicationAgent::new(name, &self.config, self.catalog.as_ref(), &mut seeder, logger),
            None => CommunicationAgent::new(name, &self.config, self.catalog.as_ref(), &mut GoldenRatioSeeder, logger),
        }
    }

    fn run_with<T: Transceiver>(&self, mut sender: T, mut receiver: T, scenario: Scenario) -> Result<TransmissionResult, NlqError> {
        let config = &self.config;
        sender.encode(config)?;

        match scenario {
            Scenario::Direct => receiver.receive_from(&sender),
            Scenario::Evolution => {
                receiver.receive_from(&sender);
                let bits = attractor_bits(sender.agent());
                for cycle in 0..config.cycles {
                    sender.evolve(config, &bits)?;
                    receiver.evolve(config, &[])?;
                    if self.correction_due(cycle) {
                        sender.correct(config.correction_strength)?;
                        receiver.correct(config.correction_strength)?;
                    }
                }
            }
            Scenario::Transfer => {
                let bits = attractor_bits(sender.agent());
                self.evolve_sender(&mut sender, &bits)?;
                receiver.receive_from(&sender);
            }
        }

        let sender_measurement = sender.measure();
        let receiver_measurement = receiver.measure();
        let sender_decoded = sender.decode(config);
        let receiver_decoded = receiver.decode(config);

        let expected = expected_decoding(&config.message, sender.agent().state().len());
        Ok(TransmissionResult {
            sender_success: sender_decoded == expected,
            receiver_success: receiver_decoded == expected,
            sender_decoded: Some(sender_decoded),
            receiver_decoded: Some(receiver_decoded),
            sender_measurement: Some(sender_measurement),
            receiver_measurement: Some(receiver_measurement),
        })
    }

    fn evolve_sender<T: Transceiver>(&self, sender: &mut T, bits: &[Bit]) -> Result<(), NlqError> {
        for cycle in 0..self.config.cycles {
            sender.evolve(&self.config, bits)?;
            if self.correction_due(cycle) {
                sender.correct(self.config.correction_strength)?;
            }
        }
        Ok(())
    }

    fn correction_due(&self, cycle: usize) -> bool {
        self.config.enable_phase_correction
            && self.config.correction_interval > 0
            && (cycle + 1) % self.config.correction_interval == 0
    }
}

/// The encoded bits, padded with `0` so every basis has an attractor target.
fn attractor_bits(agent: &CommunicationAgent) -> Vec<Bit> {
    let mut bits = agent.encoded_message().to_vec();
    bits.resize(agent.state().len().max(bits.len()), Bit::Zero);
    bits
}

/// The bitstring a perfect decode of `message` over `bases` bases yields:
/// truncated to the number of bases, non-bit characters read as `0`, and
/// bases past the end of the message read as `0`.
pub fn expected_decoding(message: &str, bases: usize) -> String {
    let mut expected: String = message
        .chars()
        .take(bases)
        .map(|c| Bit::from_char(c).unwrap_or(Bit::Zero).as_char())
        .collect();
    while expected.chars().count() < bases {
        expected.push('0');
    }
    expected
}
