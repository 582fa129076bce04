// Thin CLI around the library: evaluates the focal loss on a fixed example and
// on a random batch so a config file can be sanity-checked.
//
//   cargo run -- [config.json]
//   RUST_LOG=debug cargo run
use ferrite_focal::{FocalLoss, FocalLossConfig, Matrix, Reduction};
use log::info;
use rand::Rng;

const BATCH: usize = 8;
const CLASSES: usize = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading focal loss config from {path}");
            FocalLossConfig::load_json(&path)?
        }
        None => FocalLossConfig::default(),
    };
    let focal = FocalLoss::new(config)?;
    println!("ferrite-focal: {}", serde_json::to_string(&focal.config())?);

    let pred = Matrix::from_data(vec![vec![2.0, -1.0]])?;
    let fixed = focal.forward(&pred, &[0], None, None, None)?;
    println!("pred=[[2.0, -1.0]] target=[0] -> {fixed:?}");

    let mut rng = rand::thread_rng();
    let pred = Matrix::random(BATCH, CLASSES, 3.0);
    let target: Vec<usize> = (0..BATCH).map(|_| rng.gen_range(0..CLASSES)).collect();
    for reduction in [Reduction::Mean, Reduction::Sum] {
        let loss = focal.forward(&pred, &target, None, None, Some(reduction))?;
        println!("random {BATCH}x{CLASSES} batch, {reduction}: {loss:?}");
    }

    Ok(())
}
