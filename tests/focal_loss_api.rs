use approx::assert_abs_diff_eq;
use ferrite_focal::{FocalLoss, FocalLossConfig, LossError, LossValue, Matrix, Reduction};

const FIXTURE_MEAN: f64 = 0.008722216920080296;

fn fixture() -> (Matrix, Vec<usize>) {
    (Matrix::from_data(vec![vec![2.0, -1.0]]).unwrap(), vec![0])
}

fn temp_path(name: &str) -> String {
    let dir = std::env::temp_dir();
    dir.join(format!("ferrite-focal-{}-{name}", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

#[test]
fn end_to_end_fixture() {
    let (pred, target) = fixture();
    let focal = FocalLoss::new(FocalLossConfig::default()).unwrap();
    let loss = focal.forward(&pred, &target, None, None, None).unwrap();
    assert_abs_diff_eq!(loss.scalar().unwrap(), FIXTURE_MEAN, epsilon = 1e-12);
}

#[test]
fn reduction_override_from_string() {
    let (pred, target) = fixture();
    let focal = FocalLoss::default();

    let r: Reduction = "sum".parse().unwrap();
    let v = focal.forward(&pred, &target, None, None, Some(r)).unwrap();
    assert_abs_diff_eq!(v.scalar().unwrap(), 2.0 * FIXTURE_MEAN, epsilon = 1e-12);

    let err = "elementwise_mean".parse::<Reduction>().unwrap_err();
    assert!(matches!(err, LossError::InvalidArgument(_)));
}

#[test]
fn none_reduction_returns_elementwise_tensor() {
    let pred = Matrix::from_data(vec![vec![0.1, 0.2, -0.3], vec![1.0, -2.0, 0.5]]).unwrap();
    let focal = FocalLoss::new(FocalLossConfig::default().with_reduction(Reduction::None)).unwrap();
    let v = focal.forward(&pred, &[2, 1], None, Some(10.0), None).unwrap();
    match v {
        LossValue::Elementwise(m) => {
            assert_eq!(m.shape(), (2, 3));
            assert!(m.data.iter().flatten().all(|&x| x > 0.0));
        }
        LossValue::Scalar(_) => panic!("expected element-wise loss"),
    }
}

#[test]
fn per_class_weight_can_silence_a_class() {
    let pred = Matrix::from_data(vec![vec![0.5, -0.5], vec![-1.0, 2.0]]).unwrap();
    let focal = FocalLoss::new(FocalLossConfig::default().with_reduction(Reduction::Sum)).unwrap();

    let only_first = Matrix::row(&[1.0, 0.0]);
    let only_second = Matrix::row(&[0.0, 1.0]);
    let a = focal.forward(&pred, &[0, 1], Some(&only_first), None, None).unwrap();
    let b = focal.forward(&pred, &[0, 1], Some(&only_second), None, None).unwrap();
    let all = focal.forward(&pred, &[0, 1], None, None, None).unwrap();

    assert_abs_diff_eq!(
        a.scalar().unwrap() + b.scalar().unwrap(),
        all.scalar().unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn config_round_trips_through_json_file() {
    let path = temp_path("config.json");
    let config = FocalLossConfig::new(1.5, 0.4)
        .with_reduction(Reduction::Sum)
        .with_loss_weight(2.0);
    config.save_json(&path).unwrap();

    let loaded = FocalLossConfig::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(FocalLoss::new(loaded).unwrap().config(), config);
}

#[test]
fn config_file_with_use_sigmoid_false_is_rejected_at_construction() {
    let path = temp_path("softmax.json");
    std::fs::write(&path, r#"{"use_sigmoid": false}"#).unwrap();

    let loaded = FocalLossConfig::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(FocalLoss::new(loaded), Err(LossError::InvalidConfig(_))));
}

#[test]
fn malformed_config_file_is_json_error() {
    let path = temp_path("broken.json");
    std::fs::write(&path, "{ gamma: ").unwrap();

    let err = FocalLossConfig::load_json(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, LossError::Json(_)));
}

#[test]
fn training_step_reduces_the_loss() {
    let pred = Matrix::from_data(vec![
        vec![0.2, 0.1, -0.3],
        vec![-0.5, 0.4, 0.0],
        vec![1.0, -1.0, 0.5],
    ]).unwrap();
    let target = [1, 2, 0];
    let focal = FocalLoss::default();

    let before = focal.forward(&pred, &target, None, None, None).unwrap().scalar().unwrap();
    let grad = focal.backward(&pred, &target, None, None, None).unwrap();
    let stepped = pred.zip_map(&grad, |x, g| x - 10.0 * g).unwrap();
    let after = focal.forward(&stepped, &target, None, None, None).unwrap().scalar().unwrap();

    assert!(after < before, "{after} >= {before}");
}
