//! Sigmoid focal loss (Lin et al., "Focal Loss for Dense Object Detection").
//!
//! Every class column is treated as an independent binary problem:
//!
//! ```text
//! p            = σ(pred)
//! pt           = (1 - p)·y + p·(1 - y)          probability of the wrong outcome
//! focal_weight = (α·y + (1 - α)·(1 - y)) · pt^γ
//! loss         = bce_with_logits(pred, y) · focal_weight
//! ```
//!
//! where `y` is the one-hot expansion of the class-index targets.

use log::trace;

use crate::activation::sigmoid::{sigmoid, softplus};
use crate::error::{LossError, Result};
use crate::loss::bce::bce_with_logits;
use crate::loss::reduction::{reduction_scale, weight_reduce_loss, LossValue, Reduction};
use crate::math::matrix::Matrix;

/// Expands class indices into an N×`num_classes` indicator matrix.
pub fn one_hot(target: &[usize], num_classes: usize) -> Result<Matrix> {
    let mut res = Matrix::zeros(target.len(), num_classes);
    for (row, &class) in target.iter().enumerate() {
        if class >= num_classes {
            return Err(LossError::TargetOutOfRange { row, value: class, num_classes });
        }
        res.data[row][class] = 1.0;
    }
    Ok(res)
}

fn check_batch(pred: &Matrix, target: &[usize]) -> Result<()> {
    if pred.rows != target.len() {
        return Err(LossError::ShapeMismatch {
            what: "target",
            expected: format!("{} class indices (one per pred row)", pred.rows),
            got: format!("{}", target.len()),
        });
    }
    Ok(())
}

/// Focal loss of a single logit `x` against a binary label.
#[inline]
fn focal_term(x: f64, positive: bool, gamma: f64, alpha: f64) -> f64 {
    let p = sigmoid(x);
    let (pt, class_weight, y) = if positive {
        (1.0 - p, alpha, 1.0)
    } else {
        (p, 1.0 - alpha, 0.0)
    };
    bce_with_logits(x, y) * class_weight * pt.powf(gamma)
}

/// d(focal_term)/dx.
///
/// positive: α·(1-p)^γ · (γ·p·ln p - (1 - p))
/// negative: (1-α)·p^γ · (p - γ·(1 - p)·ln(1 - p))
#[inline]
fn focal_term_grad(x: f64, positive: bool, gamma: f64, alpha: f64) -> f64 {
    let p = sigmoid(x);
    if positive {
        let log_p = -softplus(-x);
        alpha * (1.0 - p).powf(gamma) * (gamma * p * log_p - (1.0 - p))
    } else {
        let log_1mp = -softplus(x);
        (1.0 - alpha) * p.powf(gamma) * (p - gamma * (1.0 - p) * log_1mp)
    }
}

fn map_with_targets<F>(pred: &Matrix, target: &[usize], term: F) -> Result<Matrix>
where
    F: Fn(f64, bool) -> f64,
{
    check_batch(pred, target)?;
    // Validates every index before any arithmetic.
    let onehot = one_hot(target, pred.cols)?;
    pred.zip_map(&onehot, |x, y| term(x, y == 1.0))
}

/// Unreduced sigmoid focal loss, shape N×C.
pub fn sigmoid_focal_loss_elementwise(
    pred: &Matrix,
    target: &[usize],
    gamma: f64,
    alpha: f64,
) -> Result<Matrix> {
    map_with_targets(pred, target, |x, positive| focal_term(x, positive, gamma, alpha))
}

/// Sigmoid focal loss with optional weighting and reduction.
///
/// `pred` holds raw scores (N×C), `target` the class index of each row.
/// Weighting and `avg_factor` follow [`weight_reduce_loss`].
#[allow(clippy::too_many_arguments)]
pub fn sigmoid_focal_loss(
    pred: &Matrix,
    target: &[usize],
    weight: Option<&Matrix>,
    gamma: f64,
    alpha: f64,
    reduction: Reduction,
    avg_factor: Option<f64>,
) -> Result<LossValue> {
    let loss = sigmoid_focal_loss_elementwise(pred, target, gamma, alpha)?;
    let reduced = weight_reduce_loss(loss, weight, reduction, avg_factor)?;
    trace!("sigmoid_focal_loss({reduction}) = {reduced:?}");
    Ok(reduced)
}

/// Gradient of [`sigmoid_focal_loss`] w.r.t. `pred`, shape N×C.
///
/// With `Reduction::None` this is the gradient of the sum of the element-wise
/// loss.
#[allow(clippy::too_many_arguments)]
pub fn sigmoid_focal_loss_grad(
    pred: &Matrix,
    target: &[usize],
    weight: Option<&Matrix>,
    gamma: f64,
    alpha: f64,
    reduction: Reduction,
    avg_factor: Option<f64>,
) -> Result<Matrix> {
    let scale = reduction_scale(pred.len(), reduction, avg_factor)?;
    let grad = map_with_targets(pred, target, |x, positive| {
        focal_term_grad(x, positive, gamma, alpha) * scale
    })?;
    match weight {
        Some(w) => grad.broadcast_mul(w),
        None => Ok(grad),
    }
}
