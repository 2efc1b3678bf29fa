use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// Speech rate that represents the normal speaking rate.
pub const DEFAULT_RATE: i32 = 100;

/// Pitch that represents the normal voice pitch.
pub const DEFAULT_PITCH: i32 = 100;

/// Locale requested for synthesis. Each part is an opaque string and an
/// empty string means "unset"; no ISO validation is done here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    /// ISO 3-letter language code, e.g. `"eng"`.
    pub language: String,
    /// ISO 3-letter country code, e.g. `"USA"`.
    pub country: String,
    pub variant: String,
}

impl Locale {
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
            variant: variant.into(),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.language.is_empty() && self.country.is_empty() && self.variant.is_empty()
    }
}

/// Parameters a driver sets on a request before handing it to an engine.
///
/// ```rust
/// use tts_request::SynthesisParamsBuilder;
///
/// let params = SynthesisParamsBuilder::default()
///     .speech_rate(150)
///     .build()?;
/// assert_eq!(params.pitch, tts_request::DEFAULT_PITCH);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct SynthesisParams {
    pub locale: Locale,
    /// Relative rate, [`DEFAULT_RATE`] is normal.
    pub speech_rate: i32,
    /// Relative pitch, [`DEFAULT_PITCH`] is normal.
    pub pitch: i32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            speech_rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
        }
    }
}

impl SynthesisParams {
    /// Load params from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SynthesisError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SynthesisError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SynthesisError> {
        serde_json::from_str(json)
            .map_err(|e| SynthesisError::Config(format!("Failed to parse JSON: {e}")))
    }
}
