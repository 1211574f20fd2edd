//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::assembler::PositioningMethod;
use crate::builder::BuildMode;
use crate::canonical::canonical_hash_hex;
use crate::MULTITEXT_SCHEMA_VERSION;

/// Parameters of one slots-to-inputs run.
///
/// ## Parameters
///
/// - `build_mode`: How slots are laid out as a DAG
/// - `positioning`: How position ids are assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Schema version identifier.
    pub version: String,
    /// DAG construction strategy.
    pub build_mode: BuildMode,
    /// Position id assignment.
    pub positioning: PositioningMethod,
}

impl PipelineConfig {
    /// Create a config with custom parameters.
    pub fn new(build_mode: BuildMode, positioning: PositioningMethod) -> Self {
        Self {
            version: MULTITEXT_SCHEMA_VERSION.to_string(),
            build_mode,
            positioning,
        }
    }

    /// Every combination as its own chain.
    pub fn full() -> Self {
        Self::new(BuildMode::Full, PositioningMethod::default())
    }

    /// Shared prefixes.
    pub fn standard() -> Self {
        Self::new(BuildMode::Standard, PositioningMethod::default())
    }

    /// Shared prefixes and shared singletons.
    pub fn frugal() -> Self {
        Self::new(BuildMode::Frugal, PositioningMethod::default())
    }

    /// Replace the positioning method.
    pub fn with_positioning(mut self, positioning: PositioningMethod) -> Self {
        self.positioning = positioning;
        self
    }

    /// Compute a hash of the config parameters.
    ///
    /// Equal configs hash equally across runs and processes, so the hash can
    /// tag cached model inputs.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::standard()
    }
}
