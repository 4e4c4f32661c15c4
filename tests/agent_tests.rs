// tests/agent_tests.rs

use nlq::{
    Bit, CommunicationAgent, Config, HarmonicCatalog, LogLevel, MemoryLogger, NlqError, NullLogger,
    QuantumCommunicationAgent, Transceiver, metrics, phase,
};
use std::sync::Arc;

// Helper for approximate float comparison
fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() < tolerance,
        "{}: expected {} (±{}), got {}",
        what,
        expected,
        tolerance,
        actual
    );
}

fn config_for(primes: &[u64], message: &str) -> Config {
    Config { primes: primes.to_vec(), message: message.to_string(), ..Config::default() }
}

fn quiet_agent(config: &Config) -> Result<CommunicationAgent, NlqError> {
    let catalog = HarmonicCatalog::covering(&config.primes, config.max_pulsars_per_prime);
    CommunicationAgent::new("agent", config, &catalog, &mut phase::GoldenRatioSeeder, Arc::new(NullLogger))
}

#[test]
fn test_direct_round_trip() -> Result<(), NlqError> {
    let config = config_for(&[2, 3, 5, 7], "1010");
    let mut agent = quiet_agent(&config)?;
    agent.send_message("1010", 0.01)?;
    assert_eq!(agent.decode_message(0.001), "1010");
    Ok(())
}

#[test]
fn test_default_message_round_trip() -> Result<(), NlqError> {
    let config = Config::default();
    let mut agent = quiet_agent(&config)?;
    agent.encode(&config)?;
    assert_eq!(agent.decode(&config), config.message);
    Ok(())
}

#[test]
fn test_decoded_length_matches_basis_count() -> Result<(), NlqError> {
    // Longer message: the tail is dropped.
    let config = config_for(&[2, 3, 5], "110101");
    let mut agent = quiet_agent(&config)?;
    agent.send_message(&config.message, 0.01)?;
    assert_eq!(agent.encoded_message(), &[Bit::One, Bit::One, Bit::Zero]);
    assert_eq!(agent.decode_message(0.001), "110");

    // Shorter message: untouched bases read as 0.
    let mut agent = quiet_agent(&config)?;
    agent.send_message("1", 0.01)?;
    assert_eq!(agent.decode_message(0.001), "100");
    Ok(())
}

#[test]
fn test_unencoded_agent_decodes_zeros() -> Result<(), NlqError> {
    let config = config_for(&[2, 3, 5, 7, 11], "11111");
    let mut agent = quiet_agent(&config)?;
    assert_eq!(agent.decode_message(0.001), "00000");
    Ok(())
}

#[test]
fn test_transfer_reproduces_sender_decode() -> Result<(), NlqError> {
    let config = config_for(&[2, 3, 5, 7, 11, 13], "100110");
    let mut sender = quiet_agent(&config)?;
    let mut receiver = quiet_agent(&config)?;

    sender.encode(&config)?;
    let bits = sender.encoded_message().to_vec();
    for _ in 0..25 {
        sender.evolve(config.delta, &config, &bits)?;
    }
    sender.transfer_to(&mut receiver);

    assert_eq!(receiver.state(), sender.state());
    assert_eq!(receiver.reference_state(), sender.reference_state());
    assert_eq!(receiver.lifecycle(), sender.lifecycle());
    assert_eq!(receiver.decode_message(config.threshold), sender.decode_message(config.threshold));
    Ok(())
}

#[test]
fn test_transferred_state_is_independent() -> Result<(), NlqError> {
    let config = config_for(&[2, 3], "10");
    let mut sender = quiet_agent(&config)?;
    let mut receiver = quiet_agent(&config)?;
    sender.encode(&config)?;
    sender.transfer_to(&mut receiver);

    // Evolving the receiver must leave the sender untouched.
    let snapshot = sender.state().clone();
    receiver.evolve(config.delta, &config, &[])?;
    assert_eq!(sender.state(), &snapshot);
    assert_ne!(receiver.state(), &snapshot);
    Ok(())
}

#[test]
fn test_state_clone_is_deep() -> Result<(), NlqError> {
    let config = config_for(&[2, 3, 5], "000");
    let agent = quiet_agent(&config)?;
    let original = agent.state().clone();
    let mut copy = original.clone();

    let reference_basis = agent.reference_state().bases()[1].clone();
    copy.modulate_prime_basis_phase(1, Bit::One, 0.2, &reference_basis)?;

    assert_eq!(&original, agent.state());
    assert_ne!(copy, original);
    Ok(())
}

#[test]
fn test_self_resonance_is_maximal() -> Result<(), NlqError> {
    let config = Config::default();
    let mut agent = quiet_agent(&config)?;
    let fresh = agent.state().clone();
    assert_close(metrics::resonance_strength(&fresh, &fresh), 1.0, 1e-12, "fresh self-resonance");

    agent.encode(&config)?;
    for _ in 0..10 {
        agent.evolve(config.delta, &config, &[])?;
    }
    let evolved = agent.state();
    assert_close(metrics::resonance_strength(evolved, evolved), 1.0, 1e-12, "evolved self-resonance");
    assert!(metrics::resonance_strength(evolved, agent.reference_state()) <= 1.0 + 1e-12);
    Ok(())
}

#[test]
fn test_amplitudes_stay_non_negative() -> Result<(), NlqError> {
    let config = Config { use_amplitude_modulation: true, amplitude_epsilon: 0.5, ..config_for(&[2, 3, 5, 7], "1001") };
    let catalog = HarmonicCatalog::covering(&config.primes, config.max_pulsars_per_prime);
    let mut agent =
        QuantumCommunicationAgent::new("amp", &config, &catalog, &mut phase::GoldenRatioSeeder, Arc::new(NullLogger))?;

    agent.encode(&config)?;
    let check = |agent: &QuantumCommunicationAgent| {
        agent
            .base()
            .state()
            .bases()
            .iter()
            .flat_map(|b| b.pulsars())
            .all(|p| p.amplitude() >= 0.0 && p.amplitude().is_finite())
    };
    assert!(check(&agent), "negative amplitude after modulation");

    let bits = agent.base().encoded_message().to_vec();
    for _ in 0..50 {
        agent.evolve(&config, &bits)?;
        assert!(check(&agent), "negative amplitude after evolution");
    }
    Ok(())
}

#[test]
fn test_amplitude_channel_round_trip() -> Result<(), NlqError> {
    let config = Config { use_amplitude_modulation: true, amplitude_epsilon: 0.05, ..config_for(&[2, 3, 5, 7], "0110") };
    let mut agent = QuantumCommunicationAgent::with_defaults("amp", &config)?;
    agent.encode(&config)?;
    assert_eq!(agent.decode(&config), "0110");
    Ok(())
}

#[test]
fn test_same_seed_builds_identical_agents() -> Result<(), NlqError> {
    let config = Config { phase_seed: Some(42), phase_jitter: 0.3, ..Config::default() };
    let a = CommunicationAgent::with_defaults("a", &config)?;
    let b = CommunicationAgent::with_defaults("b", &config)?;
    assert_eq!(a.state(), b.state());

    let unjittered = CommunicationAgent::with_defaults("c", &Config::default())?;
    assert_ne!(a.state(), unjittered.state());
    Ok(())
}

#[test]
fn test_logger_choice_does_not_change_outcome() -> Result<(), NlqError> {
    let config = Config { verbose: true, ..config_for(&[2, 3, 5, 7], "1x01") };
    let catalog = HarmonicCatalog::covering(&config.primes, config.max_pulsars_per_prime);
    let memory = Arc::new(MemoryLogger::new());

    let mut silent = CommunicationAgent::new("s", &config, &catalog, &mut phase::GoldenRatioSeeder, Arc::new(NullLogger))?;
    let mut recorded = CommunicationAgent::new("r", &config, &catalog, &mut phase::GoldenRatioSeeder, memory.clone())?;

    for agent in [&mut silent, &mut recorded] {
        agent.encode(&config)?;
        let bits = agent.encoded_message().to_vec();
        for _ in 0..5 {
            agent.evolve(config.delta, &config, &bits)?;
        }
    }
    assert_eq!(silent.state(), recorded.state());
    assert_eq!(silent.decode_message(config.threshold), recorded.decode_message(config.threshold));

    // The invalid character was reported, and verbose mode added per-basis lines.
    assert_eq!(memory.count(LogLevel::Warn), 1);
    assert!(memory.count(LogLevel::Debug) > 0);
    Ok(())
}
