use ferrite_focal::{FocalLoss, FocalLossConfig, Matrix};
use rand::Rng;

// Two Gaussian-ish blobs, 95% of samples in class 0. A linear model trained
// with focal loss still learns to find the rare class.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::thread_rng();
    let n = 400;

    let mut features = Vec::with_capacity(n);
    let mut targets = Vec::with_capacity(n);
    for i in 0..n {
        let class = if i % 20 == 0 { 1 } else { 0 };
        let center = if class == 1 { 1.5 } else { -1.0 };
        features.push(vec![
            center + rng.gen_range(-1.0..1.0),
            center + rng.gen_range(-1.0..1.0),
            1.0, // bias
        ]);
        targets.push(class);
    }
    let inputs = Matrix::from_data(features)?;

    let focal = FocalLoss::new(FocalLossConfig::new(2.0, 0.25))?;
    let mut weights = Matrix::random(3, 2, 0.1);
    let learning_rate = 0.5;
    let epochs = 2000;

    for epoch in 0..epochs {
        let logits = inputs.clone() * weights.clone();
        let grad_logits = focal.backward(&logits, &targets, None, None, None)?;
        let grad_weights = inputs.transpose() * grad_logits;
        weights = weights - grad_weights.map(|g| g * learning_rate);

        if epoch % 200 == 0 {
            let loss = focal.forward(&logits, &targets, None, None, None)?;
            println!("Epoch {epoch}: loss = {:.6}", loss.scalar().unwrap_or(f64::NAN));
        }
    }

    let logits = inputs * weights;
    let mut hits = [0usize; 2];
    let mut totals = [0usize; 2];
    for (row, &class) in logits.data.iter().zip(targets.iter()) {
        let predicted = if row[1] > row[0] { 1 } else { 0 };
        totals[class] += 1;
        if predicted == class {
            hits[class] += 1;
        }
    }
    for class in 0..2 {
        println!("class {class}: recall {}/{}", hits[class], totals[class]);
    }

    Ok(())
}
