/// Logistic sigmoid, 1 / (1 + e^-x).
///
/// Evaluated through e^x for negative inputs so that large |x| saturates to
/// 0 or 1 instead of overflowing.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// softplus(x) = ln(1 + e^x) = max(x, 0) + ln(1 + e^-|x|)
///
/// Note that -softplus(-x) = ln(sigmoid(x)) and -softplus(x) = ln(1 - sigmoid(x)).
pub fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}
