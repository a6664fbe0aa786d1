//! Line-delimited JSON feature packets.
//!
//! One packet per line, e.g.
//! `{"alpha":0.4,"beta":0.2,"delta":0.1,"theta":0.2,"gamma":0.1}`.
//! Band streamers may append a numeric `timestamp`; any other field is
//! rejected, as is a band value outside the finite `f32` range.

use crate::error::AgentError;
use crate::features::{FeatureVector, BAND_NAMES};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandPacket {
    pub alpha: f32,
    pub beta: f32,
    pub delta: f32,
    pub theta: f32,
    pub gamma: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl BandPacket {
    #[must_use]
    pub fn from_features(features: FeatureVector) -> Self {
        let [alpha, beta, delta, theta, gamma] = features.0;
        Self { alpha, beta, delta, theta, gamma, timestamp: None }
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        FeatureVector([self.alpha, self.beta, self.delta, self.theta, self.gamma])
    }

    /// Serialises the packet as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialisation failures.
    pub fn to_line(&self) -> Result<String, AgentError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Parses one line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MalformedPacket`] when the line is not a JSON
    /// object with exactly the five band fields (plus an optional timestamp),
    /// and [`AgentError::NonFiniteBand`] when a band overflows `f32`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, AgentError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let packet: Self = serde_json::from_str(line)?;
        packet.check_finite()?;
        Ok(Some(packet))
    }

    // serde_json saturates numbers beyond f32::MAX to infinity
    fn check_finite(&self) -> Result<(), AgentError> {
        for (band, value) in BAND_NAMES.into_iter().zip(self.features().0) {
            if !value.is_finite() {
                return Err(AgentError::NonFiniteBand { band, value });
            }
        }
        Ok(())
    }

    /// Like [`BandPacket::parse_line`] for raw bytes off the wire.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidUtf8`] for non UTF-8 input, otherwise as
    /// [`BandPacket::parse_line`].
    pub fn parse_bytes(bytes: &[u8]) -> Result<Option<Self>, AgentError> {
        Self::parse_line(std::str::from_utf8(bytes)?)
    }
}
