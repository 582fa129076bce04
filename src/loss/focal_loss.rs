use log::debug;

use crate::error::{LossError, Result};
use crate::loss::focal::{sigmoid_focal_loss, sigmoid_focal_loss_grad};
use crate::loss::focal_config::FocalLossConfig;
use crate::loss::reduction::{LossValue, Reduction};
use crate::math::matrix::Matrix;

/// Focal loss with hyperparameters bound at construction.
///
/// Immutable once built; a single instance can be shared across threads and
/// every call is independent of the ones before it.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalLoss {
    use_sigmoid: bool,
    gamma: f64,
    alpha: f64,
    reduction: Reduction,
    loss_weight: f64,
}

impl FocalLoss {
    /// Validates `config` and builds the loss.
    ///
    /// Fails with `LossError::InvalidConfig` if `use_sigmoid` is false or a
    /// hyperparameter is out of range.
    pub fn new(config: FocalLossConfig) -> Result<FocalLoss> {
        config.validate()?;
        let FocalLossConfig { use_sigmoid, gamma, alpha, reduction, loss_weight } = config;
        Ok(FocalLoss { use_sigmoid, gamma, alpha, reduction, loss_weight })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn loss_weight(&self) -> f64 {
        self.loss_weight
    }

    /// The configuration this loss was built from.
    pub fn config(&self) -> FocalLossConfig {
        FocalLossConfig {
            use_sigmoid: self.use_sigmoid,
            gamma: self.gamma,
            alpha: self.alpha,
            reduction: self.reduction,
            loss_weight: self.loss_weight,
        }
    }

    /// Computes `loss_weight · sigmoid_focal_loss(...)`.
    ///
    /// # Arguments
    /// - `pred`               — raw scores, N×C
    /// - `target`             — class index per row, each in `[0, C)`
    /// - `weight`             — optional element-wise weight broadcastable to N×C
    /// - `avg_factor`         — optional normalizer replacing the element count
    ///                          of a `mean` reduction
    /// - `reduction_override` — reduction for this call only
    pub fn forward(
        &self,
        pred: &Matrix,
        target: &[usize],
        weight: Option<&Matrix>,
        avg_factor: Option<f64>,
        reduction_override: Option<Reduction>,
    ) -> Result<LossValue> {
        let reduction = self.effective_reduction(pred, avg_factor, reduction_override)?;
        let loss = sigmoid_focal_loss(
            pred,
            target,
            weight,
            self.gamma,
            self.alpha,
            reduction,
            avg_factor,
        )?;
        Ok(loss.scale(self.loss_weight))
    }

    /// Gradient of [`forward`](Self::forward) w.r.t. `pred`, shape N×C.
    ///
    /// With a `none` reduction this is the gradient of the summed loss.
    pub fn backward(
        &self,
        pred: &Matrix,
        target: &[usize],
        weight: Option<&Matrix>,
        avg_factor: Option<f64>,
        reduction_override: Option<Reduction>,
    ) -> Result<Matrix> {
        let reduction = self.effective_reduction(pred, avg_factor, reduction_override)?;
        let grad = sigmoid_focal_loss_grad(
            pred,
            target,
            weight,
            self.gamma,
            self.alpha,
            reduction,
            avg_factor,
        )?;
        Ok(grad.map(|g| g * self.loss_weight))
    }

    fn effective_reduction(
        &self,
        pred: &Matrix,
        avg_factor: Option<f64>,
        reduction_override: Option<Reduction>,
    ) -> Result<Reduction> {
        if !self.use_sigmoid {
            return Err(LossError::NotImplemented("softmax focal loss"));
        }
        let reduction = reduction_override.unwrap_or(self.reduction);
        debug!(
            "focal loss: pred=[{}, {}] reduction={} avg_factor={:?} gamma={} alpha={}",
            pred.rows, pred.cols, reduction, avg_factor, self.gamma, self.alpha
        );
        if reduction == Reduction::None && avg_factor.is_some() {
            debug!("focal loss: avg_factor has no effect with reduction=none");
        }
        Ok(reduction)
    }
}

impl Default for FocalLoss {
    fn default() -> Self {
        let FocalLossConfig { use_sigmoid, gamma, alpha, reduction, loss_weight } =
            FocalLossConfig::default();
        FocalLoss { use_sigmoid, gamma, alpha, reduction, loss_weight }
    }
}
