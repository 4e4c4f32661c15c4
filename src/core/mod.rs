// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod pulsar;
pub mod basis;
pub mod state;

// Re-export public types for convenient access via `nlq::core::TypeName`
pub use error::{Bit, NlqError};
pub use pulsar::Pulsar;
pub use basis::PrimeBasis;
pub use state::PrimeState;

pub mod constants;
pub use constants::nlq_constants::{PHI_INV, PI, TAU, WEIGHT_TOLERANCE}; // Re-export
