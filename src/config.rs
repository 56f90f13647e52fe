use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::functions::{AngleMode, MAX_FACTORIAL};

/// Settings a calculator brain starts with
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// angle mode of a fresh brain and after memory-preserving resets
    pub angle_mode: AngleMode,
    /// the largest `n` accepted by `n!`
    pub factorial_limit: u32,
    /// makes the `Rand` key reproducible
    pub random_seed: Option<u64>,
}

impl Default for BrainConfig {
    fn default() -> Self {
        BrainConfig {
            angle_mode: AngleMode::Degree,
            factorial_limit: MAX_FACTORIAL,
            random_seed: None,
        }
    }
}

impl BrainConfig {
    pub fn from_toml(s: &str) -> Result<Self, CalcError> {
        let cfg: BrainConfig = toml::from_str(s).map_err(|e| CalcError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CalcErrorResult {
        if self.factorial_limit > MAX_FACTORIAL {
            return Err(CalcError::Config(format!(
                "factorial_limit {} exceeds {}",
                self.factorial_limit, MAX_FACTORIAL
            )));
        }
        Ok(())
    }
}
