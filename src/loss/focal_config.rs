use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};
use crate::loss::reduction::Reduction;

/// Hyperparameters for a [`FocalLoss`](crate::loss::focal_loss::FocalLoss).
///
/// # Fields
/// - `use_sigmoid` — must be `true`; only the sigmoid variant is implemented
/// - `gamma`       — focusing strength, `>= 0`; `0` disables focusing
/// - `alpha`       — weight of the positive (true-class) term, in `[0, 1]`
/// - `reduction`   — default reduction, overridable per call
/// - `loss_weight` — multiplier applied to the final loss
///
/// Missing JSON fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocalLossConfig {
    pub use_sigmoid: bool,
    pub gamma: f64,
    pub alpha: f64,
    pub reduction: Reduction,
    pub loss_weight: f64,
}

impl Default for FocalLossConfig {
    fn default() -> Self {
        FocalLossConfig {
            use_sigmoid: true,
            gamma: 2.0,
            alpha: 0.25,
            reduction: Reduction::Mean,
            loss_weight: 1.0,
        }
    }
}

impl FocalLossConfig {
    /// Creates a config with the given focusing parameters and default
    /// reduction and loss weight.
    pub fn new(gamma: f64, alpha: f64) -> Self {
        FocalLossConfig {
            gamma,
            alpha,
            ..Default::default()
        }
    }

    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_loss_weight(mut self, loss_weight: f64) -> Self {
        self.loss_weight = loss_weight;
        self
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !self.use_sigmoid {
            return Err(LossError::InvalidConfig(
                "only sigmoid focal loss is supported (use_sigmoid must be true)".to_string(),
            ));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(LossError::InvalidConfig(format!(
                "gamma must be a finite value >= 0, got {}", self.gamma
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(LossError::InvalidConfig(format!(
                "alpha must be in [0, 1], got {}", self.alpha
            )));
        }
        if !self.loss_weight.is_finite() {
            return Err(LossError::InvalidConfig(format!(
                "loss_weight must be finite, got {}", self.loss_weight
            )));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file. The result is not validated;
    /// `FocalLoss::new` does that.
    pub fn load_json(path: &str) -> Result<FocalLossConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
