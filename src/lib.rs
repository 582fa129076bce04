pub mod error;
pub mod math;
pub mod activation;
pub mod loss;

// Convenience re-exports
pub use error::{LossError, Result};
pub use math::matrix::Matrix;
pub use loss::reduction::{reduce_loss, weight_reduce_loss, LossValue, Reduction};
pub use loss::focal::{sigmoid_focal_loss, sigmoid_focal_loss_grad};
pub use loss::focal_config::FocalLossConfig;
pub use loss::focal_loss::FocalLoss;
