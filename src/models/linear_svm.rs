use nalgebra::DVector;

use crate::datasets::assembly::FeatureMatrix;
use crate::errors::ModelError;
use crate::models::{sigmoid, BinaryClassifier, Standardizer};

/// Linear margin classifier trained by batch subgradient descent on the
/// L2-regularized hinge loss. Probabilities are a sigmoid squash of the
/// signed margin, which is enough calibration for soft voting.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    learning_rate: f64,
    max_iter: usize,
    lambda: f64,
    weights: Option<DVector<f64>>,
    bias: f64,
    scaler: Option<Standardizer>,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new(0.1, 1000, 1e-3)
    }
}

impl LinearSvm {
    pub fn new(learning_rate: f64, max_iter: usize, lambda: f64) -> Self {
        Self {
            learning_rate,
            max_iter,
            lambda,
            weights: None,
            bias: 0.0,
            scaler: None,
        }
    }

    fn decision_values(&self, features: &FeatureMatrix) -> Result<DVector<f64>, ModelError> {
        let weights = self.weights.as_ref().ok_or(ModelError::NotFitted)?;
        let scaler = self.scaler.as_ref().ok_or(ModelError::NotFitted)?;
        if features.n_columns() != weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                actual: features.n_columns(),
            });
        }
        let x = scaler.transform(&features.to_dmatrix());
        Ok((x * weights).add_scalar(self.bias))
    }
}

impl BinaryClassifier for LinearSvm {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[f64]) -> Result<(), ModelError> {
        let x_raw = features.to_dmatrix();
        let scaler = Standardizer::fit(&x_raw);
        let x = scaler.transform(&x_raw);
        // hinge loss wants {-1, +1} targets
        let y = DVector::from_iterator(
            labels.len(),
            labels.iter().map(|&label| if label > 0.5 { 1.0 } else { -1.0 }),
        );
        let n_samples = x.nrows() as f64;

        let mut weights = DVector::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..self.max_iter {
            let margins = (&x * &weights).add_scalar(bias).component_mul(&y);
            // subgradient contribution only from margin violations
            let active = DVector::from_iterator(
                y.len(),
                margins.iter().map(|&m| if m < 1.0 { 1.0 } else { 0.0 }),
            );
            let weighted = y.component_mul(&active);
            let dw = &weights * self.lambda - x.transpose() * &weighted / n_samples;
            let db = -weighted.sum() / n_samples;
            weights -= dw * self.learning_rate;
            bias -= db * self.learning_rate;
        }

        self.weights = Some(weights);
        self.bias = bias;
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        let decisions = self.decision_values(features)?;
        Ok(decisions.iter().map(|&d| sigmoid(d)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svm_fits_separable_data() {
        let rows = vec![
            vec![0.0, 0.1],
            vec![0.2, 0.0],
            vec![0.1, 0.2],
            vec![4.0, 4.1],
            vec![4.2, 4.0],
            vec![4.1, 4.2],
        ];
        let features = FeatureMatrix::from_rows(rows, 2);
        let labels = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LinearSvm::default();
        model.fit(&features, &labels).unwrap();

        let probabilities = model.predict_probability(&features).unwrap();
        assert!(probabilities[0] < 0.5);
        assert!(probabilities[3] > 0.5);
    }

    #[test]
    fn unfitted_svm_reports_not_fitted() {
        let features = FeatureMatrix::from_rows(vec![vec![0.0]], 1);
        let model = LinearSvm::default();
        assert!(matches!(
            model.predict_probability(&features),
            Err(ModelError::NotFitted)
        ));
    }
}
