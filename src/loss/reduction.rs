use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};
use crate::math::matrix::Matrix;

/// How an element-wise loss is collapsed into the reported value.
///
/// Serialized as `"none"`, `"mean"` or `"sum"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    None,
    #[default]
    Mean,
    Sum,
}

impl Reduction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reduction::None => "none",
            Reduction::Mean => "mean",
            Reduction::Sum => "sum",
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reduction {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Reduction::None),
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            other => Err(LossError::InvalidArgument(format!(
                "unknown reduction {other:?}, expected one of \"none\", \"mean\", \"sum\""
            ))),
        }
    }
}

/// Result of a loss evaluation: a scalar for `mean`/`sum`, the untouched
/// element-wise tensor for `none`.
#[derive(Debug, Clone, PartialEq)]
pub enum LossValue {
    Scalar(f64),
    Elementwise(Matrix),
}

impl LossValue {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            LossValue::Scalar(v) => Some(*v),
            LossValue::Elementwise(_) => None,
        }
    }

    pub fn elementwise(&self) -> Option<&Matrix> {
        match self {
            LossValue::Scalar(_) => None,
            LossValue::Elementwise(m) => Some(m),
        }
    }

    /// Multiplies every component by `factor`.
    pub fn scale(self, factor: f64) -> LossValue {
        match self {
            LossValue::Scalar(v) => LossValue::Scalar(v * factor),
            LossValue::Elementwise(m) => LossValue::Elementwise(m.map(|x| x * factor)),
        }
    }
}

/// Reduces an element-wise loss according to `reduction`.
pub fn reduce_loss(loss: Matrix, reduction: Reduction) -> LossValue {
    match reduction {
        Reduction::None => LossValue::Elementwise(loss),
        Reduction::Mean => LossValue::Scalar(loss.mean()),
        Reduction::Sum => LossValue::Scalar(loss.sum()),
    }
}

/// Applies an optional element-wise `weight`, then reduces.
///
/// `weight` must broadcast against `loss` (see [`Matrix::broadcast_mul`]).
/// When `avg_factor` is given it replaces the element count of a `mean`
/// reduction; it is ignored for `none` and rejected for `sum`.
pub fn weight_reduce_loss(
    loss: Matrix,
    weight: Option<&Matrix>,
    reduction: Reduction,
    avg_factor: Option<f64>,
) -> Result<LossValue> {
    let loss = match weight {
        Some(w) => loss.broadcast_mul(w)?,
        None => loss,
    };

    match (avg_factor, reduction) {
        (None, _) => Ok(reduce_loss(loss, reduction)),
        (Some(avg), Reduction::Mean) => Ok(LossValue::Scalar(loss.sum() / avg)),
        (Some(_), Reduction::None) => Ok(LossValue::Elementwise(loss)),
        (Some(_), Reduction::Sum) => Err(avg_factor_with_sum()),
    }
}

/// d(reduced)/d(element) for the same reduction rules as
/// [`weight_reduce_loss`]. `none` is treated as the gradient of the sum.
pub(crate) fn reduction_scale(
    numel: usize,
    reduction: Reduction,
    avg_factor: Option<f64>,
) -> Result<f64> {
    match (avg_factor, reduction) {
        (None, Reduction::Mean) => Ok(1.0 / numel as f64),
        (None, _) | (Some(_), Reduction::None) => Ok(1.0),
        (Some(avg), Reduction::Mean) => Ok(1.0 / avg),
        (Some(_), Reduction::Sum) => Err(avg_factor_with_sum()),
    }
}

fn avg_factor_with_sum() -> LossError {
    LossError::InvalidArgument("avg_factor can not be used with reduction=\"sum\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix {
        Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn parses_the_three_reductions_only() {
        assert_eq!("none".parse::<Reduction>().unwrap(), Reduction::None);
        assert_eq!("mean".parse::<Reduction>().unwrap(), Reduction::Mean);
        assert_eq!("sum".parse::<Reduction>().unwrap(), Reduction::Sum);
        for bad in ["elementwise_mean", "Mean", "", "avg"] {
            assert!(matches!(bad.parse::<Reduction>(), Err(LossError::InvalidArgument(_))));
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Reduction::Sum).unwrap(), "\"sum\"");
        let r: Reduction = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(r, Reduction::None);
        assert!(serde_json::from_str::<Reduction>("\"median\"").is_err());
    }

    #[test]
    fn reduce_none_is_identity() {
        assert_eq!(reduce_loss(sample(), Reduction::None), LossValue::Elementwise(sample()));
    }

    #[test]
    fn reduce_mean_and_sum() {
        assert_eq!(reduce_loss(sample(), Reduction::Sum).scalar(), Some(21.0));
        assert_eq!(reduce_loss(sample(), Reduction::Mean).scalar(), Some(3.5));
    }

    #[test]
    fn weight_is_applied_before_reduction() {
        let w = Matrix::column(&[1.0, 0.0]);
        let v = weight_reduce_loss(sample(), Some(&w), Reduction::Sum, None).unwrap();
        assert_eq!(v.scalar(), Some(6.0));
    }

    #[test]
    fn avg_factor_replaces_count_for_mean() {
        let v = weight_reduce_loss(sample(), None, Reduction::Mean, Some(7.0)).unwrap();
        assert_abs_diff_eq!(v.scalar().unwrap(), 3.0);
    }

    #[test]
    fn avg_factor_is_ignored_for_none() {
        let v = weight_reduce_loss(sample(), None, Reduction::None, Some(7.0)).unwrap();
        assert_eq!(v.elementwise(), Some(&sample()));
    }

    #[test]
    fn avg_factor_with_sum_is_rejected() {
        let err = weight_reduce_loss(sample(), None, Reduction::Sum, Some(2.0)).unwrap_err();
        assert!(matches!(err, LossError::InvalidArgument(_)));
        assert!(reduction_scale(6, Reduction::Sum, Some(2.0)).is_err());
    }

    #[test]
    fn bad_weight_shape_is_rejected() {
        let w = Matrix::zeros(3, 3);
        assert!(matches!(
            weight_reduce_loss(sample(), Some(&w), Reduction::Mean, None),
            Err(LossError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn scale_multiplies_both_variants() {
        assert_eq!(LossValue::Scalar(2.0).scale(1.5), LossValue::Scalar(3.0));
        let m = LossValue::Elementwise(sample()).scale(2.0);
        assert_eq!(m.elementwise().unwrap().sum(), 42.0);
    }

    #[test]
    fn reduction_scale_matches_reducer() {
        assert_abs_diff_eq!(reduction_scale(4, Reduction::Mean, None).unwrap(), 0.25);
        assert_abs_diff_eq!(reduction_scale(4, Reduction::Sum, None).unwrap(), 1.0);
        assert_abs_diff_eq!(reduction_scale(4, Reduction::Mean, Some(8.0)).unwrap(), 0.125);
        assert_abs_diff_eq!(reduction_scale(4, Reduction::None, Some(8.0)).unwrap(), 1.0);
    }
}
