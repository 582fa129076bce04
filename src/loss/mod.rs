pub mod bce;
pub mod reduction;
pub mod focal;
pub mod focal_config;
pub mod focal_loss;

pub use bce::BceWithLogitsLoss;
pub use reduction::{reduce_loss, weight_reduce_loss, LossValue, Reduction};
pub use focal::{one_hot, sigmoid_focal_loss, sigmoid_focal_loss_elementwise, sigmoid_focal_loss_grad};
pub use focal_config::FocalLossConfig;
pub use focal_loss::FocalLoss;
