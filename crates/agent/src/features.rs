use serde::{Deserialize, Serialize};
use std::fmt;

pub const BAND_COUNT: usize = 5;

/// Band order used everywhere a [`FeatureVector`] is indexed.
pub const BAND_NAMES: [&str; BAND_COUNT] = ["alpha", "beta", "delta", "theta", "gamma"];

/// Power in each spectral band, ordered as [`BAND_NAMES`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f32; BAND_COUNT]);

impl FeatureVector {
    pub const ZERO: FeatureVector = FeatureVector([0.0; BAND_COUNT]);

    #[must_use]
    pub fn new(bands: [f32; BAND_COUNT]) -> Self {
        Self(bands)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    #[must_use]
    pub fn map(self, f: impl FnMut(f32) -> f32) -> Self {
        Self(self.0.map(f))
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &FeatureVector) -> f32 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<[f32; BAND_COUNT]> for FeatureVector {
    fn from(bands: [f32; BAND_COUNT]) -> Self {
        Self(bands)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.4}")?;
        }
        write!(f, "]")
    }
}
