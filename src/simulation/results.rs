// src/simulation/results.rs
use crate::metrics::Measurement;
use serde::Serialize;
use std::fmt;

/// Outcome of one scenario run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionResult {
    /// Sender decoded the original message exactly.
    pub sender_success: bool,
    /// Receiver decoded the original message exactly.
    pub receiver_success: bool,
    /// Sender's decoded bitstring, if the run got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_decoded: Option<String>,
    /// Receiver's decoded bitstring, if the run got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_decoded: Option<String>,
    /// Sender metrics just before decoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_measurement: Option<Measurement>,
    /// Receiver metrics just before decoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_measurement: Option<Measurement>,
}

impl TransmissionResult {
    /// The result reported when a run aborts.
    pub(crate) fn failed() -> Self {
        Self::default()
    }

    /// Both sides recovered the message.
    pub fn is_success(&self) -> bool {
        self.sender_success && self.receiver_success
    }

    /// JSON form using the camelCase field names.
    pub fn to_json(&self) -> Result<String, crate::core::NlqError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for TransmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transmission Results:")?;
        let sides = [
            ("Sender", self.sender_success, &self.sender_decoded, &self.sender_measurement),
            ("Receiver", self.receiver_success, &self.receiver_decoded, &self.receiver_measurement),
        ];
        for (label, success, decoded, measurement) in sides {
            write!(f, "  {}: {}", label, if success { "ok" } else { "FAILED" })?;
            if let Some(bits) = decoded {
                write!(f, " decoded '{}'", bits)?;
            }
            if let Some(m) = measurement {
                write!(f, " ({})", m)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
