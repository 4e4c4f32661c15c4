//! Error handling logic

use std::fmt;
use thiserror::Error;

/// A single message bit carried by one prime basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bit {
    /// Zero-delta encoding: the basis stays on its reference phase.
    Zero,
    /// The basis is advanced by the encoding epsilon.
    One,
}

impl Bit {
    /// Parses a message character. Anything other than `'0'` or `'1'` yields `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    /// Character form used in decoded bitstrings.
    pub fn as_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Error types raised by the state model, the agents and the orchestrator.
///
/// Inside the core these are mostly caught at the agent boundary, logged and
/// replaced by a safe default; only configuration and state-machine errors
/// escape to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlqError {
    /// The supplied configuration cannot drive a simulation.
    #[error("Invalid Configuration: {message}")]
    InvalidConfiguration {
        /// InvalidConfiguration failure message
        message: String,
    },

    /// A basis index does not exist in the state.
    #[error("Basis Not Found: index {index}")]
    BasisNotFound {
        /// Requested basis position
        index: usize,
    },

    /// Basis data is missing pulsars, mismatched against its reference, or non-finite.
    #[error("Malformed Basis ({index}): {message}")]
    MalformedBasis {
        /// Position of the offending basis
        index: usize,
        /// MalformedBasis failure message
        message: String,
    },

    /// An operation is inconsistent with the agent's lifecycle or inputs.
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// The oscillator catalog could not be built or queried.
    #[error("Catalog Error: {message}")]
    Catalog {
        /// Catalog failure message
        message: String,
    },

    /// JSON (de)serialization of configuration or catalog data failed.
    #[error("Serialization Error: {message}")]
    Serialization {
        /// Serialization failure message
        message: String,
    },
}

impl From<serde_json::Error> for NlqError {
    fn from(err: serde_json::Error) -> Self {
        NlqError::Serialization { message: err.to_string() }
    }
}
