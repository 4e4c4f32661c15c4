//! Runs every scenario with the default configuration and prints the results.
//!
//! Set `RUST_LOG=debug` together with `"verbose": true` in a config file to see
//! per-basis vote counts. A config file path can be passed as the first argument.

use nlq::{Config, NlqError, Scenario, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), NlqError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| NlqError::InvalidConfiguration {
                message: format!("cannot read {}: {}", path, e),
            })?;
            Config::from_json(&json)?
        }
        None => Config::default(),
    };
    config.validate()?;

    println!("Message '{}' over primes {:?}", config.message, config.primes);
    let simulator = Simulator::new(config);

    for scenario in [Scenario::Direct, Scenario::Transfer, Scenario::Evolution] {
        let result = simulator.run(scenario);
        println!("\n--- {} ---", scenario);
        print!("{}", result);
        println!("{}", result.to_json()?);
    }
    Ok(())
}
