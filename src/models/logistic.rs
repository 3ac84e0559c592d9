use nalgebra::DVector;

use crate::datasets::assembly::FeatureMatrix;
use crate::errors::ModelError;
use crate::models::{sigmoid, BinaryClassifier, Standardizer};

/// Logistic regression trained by batch gradient descent on the log loss.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    l2: f64,
    weights: Option<DVector<f64>>,
    bias: f64,
    scaler: Option<Standardizer>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 1000, 1e-6, 1e-4)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize, tolerance: f64, l2: f64) -> Self {
        Self {
            learning_rate,
            max_iter,
            tolerance,
            l2,
            weights: None,
            bias: 0.0,
            scaler: None,
        }
    }
}

fn log_loss(y: &DVector<f64>, predictions: &DVector<f64>) -> f64 {
    let eps = 1e-15;
    let n = y.len() as f64;
    -y.iter()
        .zip(predictions.iter())
        .map(|(&label, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            label * p.ln() + (1.0 - label) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / n
}

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[f64]) -> Result<(), ModelError> {
        let x_raw = features.to_dmatrix();
        let scaler = Standardizer::fit(&x_raw);
        let x = scaler.transform(&x_raw);
        let y = DVector::from_column_slice(labels);
        let n_samples = x.nrows() as f64;

        let mut weights = DVector::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut previous_cost = f64::INFINITY;

        for _ in 0..self.max_iter {
            let linear = (&x * &weights).add_scalar(bias);
            let predictions = linear.map(sigmoid);
            let errors = &predictions - &y;

            let dw = x.transpose() * &errors / n_samples + &weights * self.l2;
            let db = errors.sum() / n_samples;
            weights -= dw * self.learning_rate;
            bias -= db * self.learning_rate;

            let cost = log_loss(&y, &predictions);
            if (previous_cost - cost).abs() < self.tolerance {
                break;
            }
            previous_cost = cost;
        }

        self.weights = Some(weights);
        self.bias = bias;
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        let weights = self.weights.as_ref().ok_or(ModelError::NotFitted)?;
        let scaler = self.scaler.as_ref().ok_or(ModelError::NotFitted)?;
        if features.n_columns() != weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                actual: features.n_columns(),
            });
        }
        let x = scaler.transform(&features.to_dmatrix());
        let linear = (x * weights).add_scalar(self.bias);
        Ok(linear.iter().map(|&z| sigmoid(z)).collect())
    }
}
