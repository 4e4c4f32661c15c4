// src/catalog/mod.rs

//! Oscillator catalog: the source of per-prime oscillator records.
//!
//! Agents consume a catalog once at construction through [`OscillatorCatalog`]
//! and never mutate it. [`HarmonicCatalog`] is a small generated table that
//! stands in for a full seed catalog; any other table can be plugged in by
//! implementing the trait or loading records from JSON.

use crate::core::NlqError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Frequency of a key-1 harmonic; record `n` rotates at `HARMONIC_BASE_FREQUENCY / n`.
///
/// Kept small against the default message force so an attracted pulsar
/// settles well inside the default decode threshold.
pub const HARMONIC_BASE_FREQUENCY: f64 = 0.1;

/// One seed oscillator as listed in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorRecord {
    /// Integer the record is filed under; a record belongs to every prime dividing it.
    pub key: u64,
    /// Natural frequency used as the pulsar's intrinsic rotation rate.
    pub frequency: f64,
    /// True when the record was selected through a composite factor rather than an exact match.
    #[serde(default)]
    pub derived: bool,
}

/// Grouping function consumed by agent construction.
pub trait OscillatorCatalog {
    /// Returns up to `max_per_prime` records for every prime in `primes`.
    ///
    /// Exact-match records come first; records filed under multiples of the
    /// prime fill any remaining slots and are flagged `derived`. Primes with
    /// no records map to an empty list.
    fn group_by_prime(&self, primes: &[u64], max_per_prime: usize) -> HashMap<u64, Vec<OscillatorRecord>>;
}

/// A flat catalog table with harmonic defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarmonicCatalog {
    records: Vec<OscillatorRecord>,
}

impl HarmonicCatalog {
    /// Builds a catalog from explicit records.
    pub fn new(records: Vec<OscillatorRecord>) -> Self {
        Self { records }
    }

    /// Generates one harmonic record for every integer in `2..=limit`.
    pub fn generated(limit: u64) -> Self {
        Self { records: (2..=limit).map(harmonic_record).collect() }
    }

    /// Smallest harmonic table that fills `max_per_prime` slots for every prime:
    /// the keys `prime · k` for `k` in `1..=max_per_prime`, deduplicated and sorted.
    pub fn covering(primes: &[u64], max_per_prime: usize) -> Self {
        let keys: BTreeSet<u64> = primes
            .iter()
            .filter(|&&prime| prime > 0)
            .flat_map(|&prime| (1..=max_per_prime as u64).filter_map(move |k| prime.checked_mul(k)))
            .collect();
        Self { records: keys.into_iter().map(harmonic_record).collect() }
    }

    /// Loads records from a JSON array of `{ "key": .., "frequency": .. }` objects.
    pub fn from_json(json: &str) -> Result<Self, NlqError> {
        let records: Vec<OscillatorRecord> = serde_json::from_str(json)?;
        if let Some(bad) = records.iter().find(|r| r.key == 0 || !r.frequency.is_finite()) {
            return Err(NlqError::Catalog {
                message: format!("record with key {} has an invalid key or frequency", bad.key),
            });
        }
        Ok(Self { records })
    }

    /// All records in table order.
    pub fn records(&self) -> &[OscillatorRecord] {
        &self.records
    }
}

/// `HARMONIC_BASE_FREQUENCY / key`.
fn harmonic_record(key: u64) -> OscillatorRecord {
    OscillatorRecord { key, frequency: HARMONIC_BASE_FREQUENCY / key as f64, derived: false }
}

impl OscillatorCatalog for HarmonicCatalog {
    fn group_by_prime(&self, primes: &[u64], max_per_prime: usize) -> HashMap<u64, Vec<OscillatorRecord>> {
        let mut groups = HashMap::with_capacity(primes.len());
        for &prime in primes {
            let mut group: Vec<OscillatorRecord> = self
                .records
                .iter()
                .filter(|r| r.key == prime)
                .take(max_per_prime)
                .cloned()
                .map(|r| OscillatorRecord { derived: false, ..r })
                .collect();

            if group.len() < max_per_prime && prime > 1 {
                let remaining = max_per_prime - group.len();
                group.extend(
                    self.records
                        .iter()
                        .filter(|r| r.key != prime && r.key % prime == 0)
                        .take(remaining)
                        .cloned()
                        .map(|r| OscillatorRecord { derived: true, ..r }),
                );
            }
            groups.insert(prime, group);
        }
        groups
    }
}
