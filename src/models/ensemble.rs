use rayon::prelude::*;

use crate::datasets::assembly::FeatureMatrix;
use crate::errors::ModelError;
use crate::models::{BinaryClassifier, LinearSvm, LogisticRegression, RandomForest};

/// Soft-voting ensemble: every member is trained on the identical matrix,
/// and the final decision is the arithmetic mean of their positive-class
/// probabilities thresholded at 0.5.
pub struct SoftVotingEnsemble {
    members: Vec<Box<dyn BinaryClassifier + Send>>,
    n_fitted_columns: Option<usize>,
}

impl SoftVotingEnsemble {
    pub fn new(members: Vec<Box<dyn BinaryClassifier + Send>>) -> Self {
        Self { members, n_fitted_columns: None }
    }

    /// The three stock members: a tree ensemble, a margin classifier and a
    /// linear discriminative model.
    pub fn with_default_members() -> Self {
        Self::new(vec![
            Box::new(RandomForest::default()),
            Box::new(LinearSvm::default()),
            Box::new(LogisticRegression::default()),
        ])
    }

    /// Train every member independently. Members share no mutable state, so
    /// the fits run in parallel; averaging later is the only barrier.
    pub fn fit(&mut self, features: &FeatureMatrix, labels: &[f64]) -> Result<(), ModelError> {
        self.members.par_iter_mut()
            .try_for_each(|member| member.fit(features, labels))?;
        self.n_fitted_columns = Some(features.n_columns());
        Ok(())
    }

    pub fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        let expected = self.n_fitted_columns.ok_or(ModelError::NotFitted)?;
        if features.n_columns() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.n_columns(),
            });
        }

        let per_member = self.members.iter()
            .map(|member| member.predict_probability(features))
            .collect::<Result<Vec<_>, _>>()?;

        let n_rows = features.n_rows();
        let mut averaged = vec![0.0; n_rows];
        for probabilities in &per_member {
            for (total, p) in averaged.iter_mut().zip(probabilities) {
                *total += p;
            }
        }
        for total in averaged.iter_mut() {
            *total /= per_member.len() as f64;
        }
        Ok(averaged)
    }

    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u8>, ModelError> {
        let probabilities = self.predict_probability(features)?;
        Ok(probabilities.into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }
}
