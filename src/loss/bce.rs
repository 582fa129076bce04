use crate::activation::sigmoid::softplus;
use crate::error::Result;
use crate::math::matrix::Matrix;

/// Binary cross-entropy on raw logits.
///
/// Takes pre-sigmoid scores rather than probabilities, which lets the loss use
/// the form softplus(x) - x·y and stay finite for any logit.
pub struct BceWithLogitsLoss;

/// Per-element BCE-with-logits: max(x, 0) - x·y + ln(1 + e^-|x|)
#[inline]
pub(crate) fn bce_with_logits(x: f64, y: f64) -> f64 {
    softplus(x) - x * y
}

impl BceWithLogitsLoss {
    /// Unreduced loss, same shape as `logits`.
    pub fn elementwise(logits: &Matrix, targets: &Matrix) -> Result<Matrix> {
        logits.zip_map(targets, bce_with_logits)
    }

    /// Scalar BCE: mean over all outputs
    pub fn loss(logits: &[f64], expected: &[f64]) -> f64 {
        let n = logits.len() as f64;
        logits.iter().zip(expected.iter())
            .map(|(&x, &y)| bce_with_logits(x, y))
            .sum::<f64>() / n
    }
}
