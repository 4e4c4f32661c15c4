// src/lib.rs

//! `nlq` - A library for simulating message transfer over prime-indexed oscillators
//!
//! A message is written bit by bit into small banks of coupled phase
//! oscillators ("pulsars"), one bank per prime. The state can be evolved in
//! time, copied to a receiver, measured against its pre-message reference and
//! read back by majority vote.

pub mod core;
pub mod phase;
pub mod config;
pub mod catalog;
pub mod logging;
pub mod metrics;
pub mod agents;
pub mod simulation;

// Re-export the most common types for easier top-level use
pub use core::{Bit, NlqError, PrimeBasis, PrimeState, Pulsar};
pub use config::{Config, EvolutionConfig};
pub use catalog::{HarmonicCatalog, OscillatorCatalog, OscillatorRecord};
pub use logging::{LogLevel, Logger, MemoryLogger, NullLogger, TracingLogger};
pub use metrics::Measurement;
pub use agents::{AgentPhase, CommunicationAgent, QuantumCommunicationAgent, Transceiver};
pub use simulation::{Scenario, Simulator, TransmissionResult};

// Example 1: Direct round trip
// Encodes a message into a four-basis state and reads it straight back.
/// ```
/// use nlq::{CommunicationAgent, Config, NlqError};
///
/// let config = Config {
///     primes: vec![2, 3, 5, 7],
///     message: "1010".to_string(),
///     ..Config::default()
/// };
/// let mut agent = CommunicationAgent::with_defaults("alice", &config)?;
/// agent.send_message(&config.message, 0.01)?;
/// assert_eq!(agent.decode_message(0.001), "1010");
/// # Ok::<(), NlqError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Transfer to a receiver
// The receiver gets a deep copy of the sender's states and decodes the same bits.
/// ```
/// use nlq::{CommunicationAgent, Config, NlqError, Transceiver};
///
/// let config = Config { primes: vec![2, 3, 5], message: "110".to_string(), ..Config::default() };
/// let mut sender = CommunicationAgent::with_defaults("sender", &config)?;
/// let mut receiver = CommunicationAgent::with_defaults("receiver", &config)?;
///
/// sender.encode(&config)?;
/// receiver.receive_from(&sender);
/// assert_eq!(receiver.decode(&config), "110");
/// assert_eq!(sender.decode(&config), "110");
/// # Ok::<(), NlqError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Running a scenario through the simulator
/// ```
/// use std::sync::Arc;
/// use nlq::{Config, NullLogger, Scenario, Simulator};
///
/// let config = Config { primes: vec![2, 3, 5, 7], message: "0110".to_string(), ..Config::default() };
/// let result = Simulator::new(config).with_logger(Arc::new(NullLogger)).run(Scenario::Direct);
/// println!("{}", result);
/// assert!(result.is_success());
/// assert_eq!(result.receiver_decoded.as_deref(), Some("0110"));
/// ```
#[doc(hidden)]
const _: () = ();
