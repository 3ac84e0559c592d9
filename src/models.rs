use nalgebra::{DMatrix, DVector};

use crate::datasets::assembly::FeatureMatrix;
use crate::errors::ModelError;

pub(crate) mod decision_tree;
pub(crate) mod ensemble;
pub(crate) mod linear_svm;
pub(crate) mod logistic;
pub(crate) mod random_forest;

pub use ensemble::SoftVotingEnsemble;
pub use linear_svm::LinearSvm;
pub use logistic::LogisticRegression;
pub use random_forest::{ForestConfig, RandomForest};

/// The capability set shared by every ensemble member. The three model
/// families have nothing else in common, so this is the whole contract.
pub trait BinaryClassifier: Send {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[f64]) -> Result<(), ModelError>;

    /// Positive-class probability for every row of `features`.
    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError>;
}

// Numerically stable in both tails.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

/// Per-column z-score transform fitted alongside the linear models; the raw
/// node-identifier columns dwarf the similarity scores otherwise.
#[derive(Debug, Clone)]
pub(crate) struct Standardizer {
    means: DVector<f64>,
    scales: DVector<f64>,
}

impl Standardizer {
    pub fn fit(x: &DMatrix<f64>) -> Self {
        let n_rows = x.nrows().max(1) as f64;
        let mut means = DVector::zeros(x.ncols());
        let mut scales = DVector::from_element(x.ncols(), 1.0);
        for j in 0..x.ncols() {
            let mean = x.column(j).sum() / n_rows;
            let variance = x.column(j).iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>() / n_rows;
            means[j] = mean;
            let scale = variance.sqrt();
            if scale > 0.0 {
                scales[j] = scale;
            }
        }
        Self { means, scales }
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = x.clone_owned();
        for j in 0..out.ncols() {
            for i in 0..out.nrows() {
                out[(i, j)] = (out[(i, j)] - self.means[j]) / self.scales[j];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_bounded_and_centred() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(100.0) > 0.99);
        assert!(sigmoid(-100.0) < 0.01);
    }

    #[test]
    fn standardizer_centres_columns() {
        let x = DMatrix::from_row_slice(4, 2, &[
            0.0, 10.0,
            2.0, 20.0,
            4.0, 30.0,
            6.0, 40.0,
        ]);
        let scaler = Standardizer::fit(&x);
        let transformed = scaler.transform(&x);
        for j in 0..2 {
            let mean: f64 = transformed.column(j).sum() / 4.0;
            assert!(mean.abs() < 1e-12);
        }
    }

    #[test]
    fn standardizer_keeps_constant_columns_finite() {
        let x = DMatrix::from_row_slice(3, 1, &[5.0, 5.0, 5.0]);
        let scaler = Standardizer::fit(&x);
        let transformed = scaler.transform(&x);
        assert!(transformed.iter().all(|v| v.is_finite()));
    }
}
