use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::datasets::records::PairRecord;
use crate::errors::{PipelineError, SchemaError};
use crate::features::{generate_features, FeatureVector};
use crate::graph::{DegreeOnePolicy, Graph};

/// Row-major feature matrix. Stored flat, like the graph matrices;
/// `row * n_columns` gives the row offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_columns: usize,
}

impl FeatureMatrix {
    pub fn from_features(features: Vec<FeatureVector>) -> Self {
        let mut data = Vec::with_capacity(features.len() * FeatureVector::WIDTH);
        for feature in features {
            data.extend_from_slice(&feature.as_row());
        }
        Self { data, n_columns: FeatureVector::WIDTH }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>, n_columns: usize) -> Self {
        let mut data = Vec::with_capacity(rows.len() * n_columns);
        for row in rows {
            assert_eq!(row.len(), n_columns, "ragged feature row");
            data.extend_from_slice(&row);
        }
        Self { data, n_columns }
    }

    pub fn n_rows(&self) -> usize {
        self.data.len() / self.n_columns
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let offset = index * self.n_columns;
        &self.data[offset..offset + self.n_columns]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_columns)
    }

    pub fn to_dmatrix(&self) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_row_slice(self.n_rows(), self.n_columns, &self.data)
    }
}

/// Labels in pair order. Every training pair must carry a label.
pub fn extract_labels(pairs: &[PairRecord]) -> Result<Vec<f64>, SchemaError> {
    pairs.iter()
        .map(|pair| match pair.label {
            Some(label) => Ok(label as f64),
            None => Err(SchemaError::MissingLabel {
                node1: pair.node1.clone(),
                node2: pair.node2.clone(),
            }),
        })
        .collect()
}

/// Join training pairs with their computed features.
pub fn assemble_training(pairs: &[PairRecord],
                         graph: &Graph<String>,
                         policy: DegreeOnePolicy)
    -> Result<(FeatureMatrix, Vec<f64>), PipelineError>
{
    let labels = extract_labels(pairs)?;
    let features = generate_features(pairs, graph, policy)?;
    Ok((FeatureMatrix::from_features(features), labels))
}

pub fn assemble_inference(pairs: &[PairRecord],
                          graph: &Graph<String>,
                          policy: DegreeOnePolicy) -> Result<FeatureMatrix, PipelineError>
{
    let features = generate_features(pairs, graph, policy)?;
    Ok(FeatureMatrix::from_features(features))
}

/// Deterministic row-disjoint holdout split. The same (matrix, labels,
/// fraction, seed) always yields the same partition; together the two
/// partitions cover every input row exactly once.
pub fn split(matrix: &FeatureMatrix,
             labels: &[f64],
             holdout_fraction: f64,
             seed: u64)
    -> Result<(FeatureMatrix, FeatureMatrix, Vec<f64>, Vec<f64>), SchemaError>
{
    if labels.len() != matrix.n_rows() {
        return Err(SchemaError::LabelRowMismatch {
            labels: labels.len(),
            rows: matrix.n_rows(),
        });
    }
    // NaN falls outside the range and is rejected too
    if !(0.0..=1.0).contains(&holdout_fraction) {
        return Err(SchemaError::InvalidHoldoutFraction { fraction: holdout_fraction });
    }
    let n_rows = matrix.n_rows();
    let n_holdout = ((n_rows as f64) * holdout_fraction).round() as usize;

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let take = |selected: &[usize]| {
        let rows = selected.iter()
            .map(|&i| matrix.row(i).to_vec())
            .collect::<Vec<_>>();
        let taken_labels = selected.iter().map(|&i| labels[i]).collect::<Vec<_>>();
        (FeatureMatrix::from_rows(rows, matrix.n_columns()), taken_labels)
    };

    let (eval_matrix, eval_labels) = take(&indices[..n_holdout]);
    let (train_matrix, train_labels) = take(&indices[n_holdout..]);
    Ok((train_matrix, eval_matrix, train_labels, eval_labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;

    fn small_graph() -> Graph<String> {
        let universe = ["1", "2", "3", "4"].map(String::from);
        let edges = vec![
            ("1".to_string(), "2".to_string()),
            ("2".to_string(), "3".to_string()),
        ];
        build_graph(universe, edges).unwrap()
    }

    fn training_pairs() -> Vec<PairRecord> {
        vec![
            PairRecord { node1: "1".into(), node2: "2".into(), label: Some(1) },
            PairRecord { node1: "2".into(), node2: "3".into(), label: Some(1) },
            PairRecord { node1: "1".into(), node2: "4".into(), label: Some(0) },
            PairRecord { node1: "3".into(), node2: "4".into(), label: Some(0) },
        ]
    }

    #[test]
    fn assembled_training_matrix_shape() {
        let graph = small_graph();
        let (matrix, labels) = assemble_training(
            &training_pairs(), &graph, DegreeOnePolicy::Skip
        ).unwrap();
        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_columns(), 6);
        assert_eq!(labels, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_label_is_a_schema_error() {
        let graph = small_graph();
        let mut pairs = training_pairs();
        pairs[2].label = None;
        let result = assemble_training(&pairs, &graph, DegreeOnePolicy::Skip);
        assert!(matches!(
            result,
            Err(PipelineError::MissingLabel { .. })
        ));
    }

    #[test]
    fn split_is_deterministic() {
        let matrix = FeatureMatrix::from_rows(
            (0..10).map(|i| vec![i as f64, 0.0]).collect(), 2
        );
        let labels: Vec<f64> = (0..10).map(|i| (i % 2) as f64).collect();

        let first = split(&matrix, &labels, 0.3, 7).unwrap();
        let second = split(&matrix, &labels, 0.3, 7).unwrap();
        assert_eq!(first, second);

        // a different seed permutes the rows differently
        let other_seed = split(&matrix, &labels, 0.3, 8).unwrap();
        let ordering = |s: &(FeatureMatrix, FeatureMatrix, Vec<f64>, Vec<f64>)| {
            s.1.rows().chain(s.0.rows()).map(|row| row[0] as i64).collect::<Vec<_>>()
        };
        assert_ne!(ordering(&first), ordering(&other_seed));
    }

    #[test]
    fn split_partitions_are_disjoint_and_exhaustive() {
        let matrix = FeatureMatrix::from_rows(
            (0..10).map(|i| vec![i as f64]).collect(), 1
        );
        let labels: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let (train, eval, train_labels, eval_labels) =
            split(&matrix, &labels, 0.2, 42).unwrap();
        assert_eq!(eval.n_rows(), 2);
        assert_eq!(train.n_rows(), 8);

        // The single column is the original row index; together the two
        // partitions must cover 0..10 exactly once.
        let mut seen: Vec<i64> = train.rows().chain(eval.rows())
            .map(|row| row[0] as i64)
            .collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(train_labels.len(), 8);
        assert_eq!(eval_labels.len(), 2);
    }

    #[test]
    fn split_rejects_out_of_range_fraction() {
        let matrix = FeatureMatrix::from_rows(
            (0..4).map(|i| vec![i as f64]).collect(), 1
        );
        let labels = vec![0.0, 1.0, 0.0, 1.0];

        for fraction in [1.5, -0.1, f64::NAN] {
            let result = split(&matrix, &labels, fraction, 42);
            assert!(matches!(
                result,
                Err(SchemaError::InvalidHoldoutFraction { .. })
            ));
        }

        // the boundaries themselves are valid
        let (train, eval, _, _) = split(&matrix, &labels, 1.0, 42).unwrap();
        assert_eq!(eval.n_rows(), 4);
        assert_eq!(train.n_rows(), 0);
        let (train, eval, _, _) = split(&matrix, &labels, 0.0, 42).unwrap();
        assert_eq!(eval.n_rows(), 0);
        assert_eq!(train.n_rows(), 4);
    }

    #[test]
    fn split_rejects_mismatched_labels() {
        let matrix = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0]], 1);
        let result = split(&matrix, &[0.0], 0.5, 1);
        assert!(matches!(result, Err(SchemaError::LabelRowMismatch { .. })));
    }
}
