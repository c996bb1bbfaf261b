//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::EqResult;

/// How designed Butterworth sections are assigned to cut cascade slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutSectionPolicy {
    /// Every active slot gets the first section of the design.
    /// Reproduces the classic plugin response bit for bit.
    #[default]
    RepeatFirst,
    /// Slot `i` gets section `i`: a true N-th order Butterworth response.
    Distinct,
}

/// Static configuration of a `ParametricEq` instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqConfig {
    pub cut_sections: CutSectionPolicy,
    /// Enable FTZ/DAZ for the duration of each processed block
    pub flush_denormals: bool,
}

impl Default for EqConfig {
    fn default() -> Self {
        Self {
            cut_sections: CutSectionPolicy::RepeatFirst,
            flush_denormals: true,
        }
    }
}

impl EqConfig {
    pub fn from_json(json: &str) -> EqResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        log::debug!("EqConfig loaded: {:?}", config);
        Ok(config)
    }

    pub fn to_json(&self) -> EqResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_cut_sections(mut self, policy: CutSectionPolicy) -> Self {
        self.cut_sections = policy;
        self
    }

    pub fn with_flush_denormals(mut self, enabled: bool) -> Self {
        self.flush_denormals = enabled;
        self
    }
}
