use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Rect4Error, Result};

/// Largest accepted `initial_step`; perturbed corners must stay within a rasterizable range
pub const MAX_INITIAL_STEP: f64 = 1e6;

/// Tuning knobs for hull clustering, scoring and refinement.
///
/// The defaults are the values the algorithm was tuned with; changing the
/// gain/penalty ratio in particular changes how the refiner converges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Rect4Params {
    /// Adjacent edges merge when their combined length exceeds this multiple of their angle difference
    #[schemars(range(min = 0.0))]
    pub merge_length_ratio: f64,
    /// Adjacent edges never merge at or above this angle difference (degrees)
    #[schemars(range(min = 0.0, max = 180.0))]
    pub merge_max_angle_deg: f64,
    /// Sides shorter than `(width + height) / side_divisor` are dropped
    #[schemars(range(min = 1))]
    pub side_divisor: usize,
    /// Perturbation magnitude at iteration zero (pixels)
    #[schemars(range(min = 0.0, max = 1e6))]
    pub initial_step: f64,
    /// Iterations for the perturbation magnitude to fall by a factor of e
    pub step_decay: f64,
    pub iterations: usize,
    /// Score for each pixel the candidate gets right that the reference got wrong
    pub gain: i64,
    /// Score for each pixel the candidate gets wrong that the reference got right
    pub penalty: i64,
}

impl Default for Rect4Params {
    fn default() -> Self {
        Self {
            merge_length_ratio: 5.0,
            merge_max_angle_deg: 15.0,
            side_divisor: 10,
            initial_step: 200.0,
            step_decay: 50.0,
            iterations: 10_000,
            gain: 1,
            penalty: 2,
        }
    }
}

impl Rect4Params {
    /// JSON schema for the parameter file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Rect4Params)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let params: Rect4Params = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let params: Rect4Params = serde_json::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Auto-detect file format from the extension and load
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(Rect4Error::Config(format!(
                "unsupported parameter file {}; use .toml or .json",
                path.display()
            ))),
        }
    }

    /// Reject values the clusterer or refiner cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.side_divisor == 0 {
            return Err(Rect4Error::Config("side_divisor must be at least 1".into()));
        }
        if !(self.step_decay > 0.0) {
            return Err(Rect4Error::Config("step_decay must be positive".into()));
        }
        if !(0.0..=MAX_INITIAL_STEP).contains(&self.initial_step) {
            return Err(Rect4Error::Config(format!(
                "initial_step must be between 0 and {}, got {}",
                MAX_INITIAL_STEP, self.initial_step
            )));
        }
        Ok(())
    }
}
