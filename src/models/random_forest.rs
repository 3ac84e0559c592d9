use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::datasets::assembly::FeatureMatrix;
use crate::errors::ModelError;
use crate::models::decision_tree::{DecisionTree, TreeConfig};
use crate::models::BinaryClassifier;

#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// Bagged gini trees; the predicted probability is the mean positive-class
/// leaf frequency over all trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_fitted_columns: Option<usize>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self { config, trees: Vec::new(), n_fitted_columns: None }
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl BinaryClassifier for RandomForest {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[f64]) -> Result<(), ModelError> {
        let n_rows = features.n_rows();
        let n_features = features.n_columns();
        let max_features = (n_features as f64).sqrt().ceil() as usize;
        let config = self.config.clone();

        // Trees are mutually independent given their derived seeds.
        self.trees = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = config.seed.wrapping_add(i as u64);
                let tree_config = TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split,
                    min_samples_leaf: config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: tree_seed,
                };
                let indices = bootstrap_indices(n_rows, tree_seed);
                let mut tree = DecisionTree::new(tree_config);
                tree.fit(features, labels, &indices);
                tree
            })
            .collect();
        self.n_fitted_columns = Some(n_features);
        Ok(())
    }

    fn predict_probability(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        let expected = self.n_fitted_columns.ok_or(ModelError::NotFitted)?;
        if features.n_columns() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.n_columns(),
            });
        }
        let probabilities = features.rows()
            .map(|row| {
                let total: f64 = self.trees.iter()
                    .map(|tree| tree.predict_proba_one(row))
                    .sum();
                total / self.trees.len() as f64
            })
            .collect();
        Ok(probabilities)
    }
}

fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (FeatureMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 10.0, 1.0]).collect();
        let labels: Vec<f64> = (0..100).map(|i| if i >= 50 { 1.0 } else { 0.0 }).collect();
        (FeatureMatrix::from_rows(rows, 2), labels)
    }

    #[test]
    fn forest_learns_a_threshold() {
        let (features, labels) = separable();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 20,
            max_depth: 5,
            ..Default::default()
        });
        forest.fit(&features, &labels).unwrap();

        let probabilities = forest.predict_probability(&features).unwrap();
        assert_eq!(probabilities.len(), 100);
        assert!(probabilities[5] < 0.5);
        assert!(probabilities[95] > 0.5);
    }

    #[test]
    fn forest_is_deterministic_for_a_fixed_seed() {
        let (features, labels) = separable();
        let mut first = RandomForest::default();
        let mut second = RandomForest::default();
        first.fit(&features, &labels).unwrap();
        second.fit(&features, &labels).unwrap();
        assert_eq!(
            first.predict_probability(&features).unwrap(),
            second.predict_probability(&features).unwrap()
        );
    }

    #[test]
    fn unfitted_forest_reports_not_fitted() {
        let (features, _) = separable();
        let forest = RandomForest::default();
        assert!(matches!(
            forest.predict_probability(&features),
            Err(ModelError::NotFitted)
        ));
    }
}
