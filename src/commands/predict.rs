use std::path::PathBuf;

use crate::datasets::assembly::{assemble_inference, extract_labels, split, FeatureMatrix};
use crate::datasets::records;
use crate::datasets::records::{PairRecord, PredictionRecord};
use crate::features::generate_features;
use crate::graph::{build_graph, DegreeOnePolicy};
use crate::models::SoftVotingEnsemble;
use crate::utils::metrics::BinaryClassificationMetrics;

/// End-to-end run: fit the ensemble on the training table, predict every
/// row of the inference table, write `(idx, ans)` in the input row order.
pub fn predict_links(training_file: PathBuf,
                     inference_file: PathBuf,
                     output_file: PathBuf,
                     holdout_fraction: f64,
                     seed: u64,
                     strict_adamic_adar: bool,
                     dump_features: Option<PathBuf>) -> anyhow::Result<()>
{
    let policy = if strict_adamic_adar {
        DegreeOnePolicy::Fail
    } else {
        DegreeOnePolicy::Skip
    };

    let training = records::load_training_records(training_file)?;
    let inference = records::load_inference_records(inference_file)?;
    log::info!("Loaded {} training pairs and {} inference pairs",
               training.len(), inference.len());

    let graph = build_graph(
        records::node_universe(&training, &inference),
        records::positive_edges(&training),
    )?;
    log::info!("Known-edge graph has {} nodes", graph.node_count());

    let training_pairs = training.iter().map(PairRecord::from).collect::<Vec<_>>();
    let labels = extract_labels(&training_pairs)?;
    let features = generate_features(&training_pairs, &graph, policy)?;

    if let Some(path) = dump_features {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &features)?;
    }
    let matrix = FeatureMatrix::from_features(features);

    let (train_matrix, eval_matrix, train_labels, eval_labels) =
        split(&matrix, &labels, holdout_fraction, seed)?;
    log::info!("Training on {} rows, holding out {}",
               train_matrix.n_rows(), eval_matrix.n_rows());

    let mut ensemble = SoftVotingEnsemble::with_default_members();
    ensemble.fit(&train_matrix, &train_labels)?;

    if eval_matrix.n_rows() > 0 {
        let eval_predictions = ensemble.predict(&eval_matrix)?;
        let predicted = eval_predictions.iter().map(|&p| p == 1).collect::<Vec<_>>();
        let truth = eval_labels.iter().map(|&label| label > 0.0).collect::<Vec<_>>();
        let metrics = BinaryClassificationMetrics::new(&predicted, &truth);
        log::info!("Holdout accuracy: {:.4}", metrics.accuracy());
    }

    let inference_pairs = inference.iter().map(PairRecord::from).collect::<Vec<_>>();
    let inference_matrix = assemble_inference(&inference_pairs, &graph, policy)?;
    let predictions = ensemble.predict(&inference_matrix)?;

    let output = inference.iter()
        .zip(predictions)
        .map(|(record, ans)| PredictionRecord { idx: record.idx, ans })
        .collect::<Vec<_>>();
    let n_predictions = output.len();
    records::write_prediction_records(output_file, output)?;
    log::info!("Wrote {} predictions", n_predictions);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::assembly::assemble_training;
    use crate::datasets::records::{InferenceRecord, TrainingRecord};

    fn training_record(node1: &str, node2: &str, label: u8) -> TrainingRecord {
        TrainingRecord {
            node1: node1.to_string(),
            node2: node2.to_string(),
            label: Some(label),
        }
    }

    #[test]
    fn in_memory_pipeline_end_to_end() {
        let training = vec![
            training_record("1", "2", 1),
            training_record("2", "3", 1),
            training_record("1", "4", 0),
            training_record("3", "4", 0),
        ];
        let inference = vec![
            InferenceRecord { idx: 0, node1: "1".into(), node2: "3".into() },
            InferenceRecord { idx: 1, node1: "4".into(), node2: "5".into() },
        ];

        let graph = build_graph(
            records::node_universe(&training, &inference),
            records::positive_edges(&training),
        ).unwrap();
        // node 5 only appears in the inference table, yet it must exist
        assert_eq!(graph.node_count(), 5);

        let training_pairs = training.iter().map(PairRecord::from).collect::<Vec<_>>();
        let (matrix, labels) =
            assemble_training(&training_pairs, &graph, DegreeOnePolicy::Skip).unwrap();
        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_columns(), 6);

        let mut ensemble = SoftVotingEnsemble::with_default_members();
        ensemble.fit(&matrix, &labels).unwrap();

        let inference_pairs = inference.iter().map(PairRecord::from).collect::<Vec<_>>();
        let inference_matrix =
            assemble_inference(&inference_pairs, &graph, DegreeOnePolicy::Skip).unwrap();
        let predictions = ensemble.predict(&inference_matrix).unwrap();
        assert_eq!(predictions.len(), 2);
        assert!(predictions.iter().all(|&p| p == 0 || p == 1));
    }

    #[test]
    fn dumped_features_cover_every_training_row() {
        let dir = std::env::temp_dir().join("link-predictor-dump-test");
        std::fs::create_dir_all(&dir).unwrap();
        let training_path = dir.join("train.csv");
        let inference_path = dir.join("test.csv");
        let output_path = dir.join("out.csv");
        let dump_path = dir.join("features.json");
        std::fs::write(&training_path,
                       "node1,node2,label\n1,2,1\n2,3,1\n1,4,0\n3,4,0\n").unwrap();
        std::fs::write(&inference_path, "idx,node1,node2\n0,1,3\n1,2,4\n").unwrap();

        predict_links(
            training_path,
            inference_path,
            output_path.clone(),
            0.25,
            42,
            false,
            Some(dump_path.clone()),
        ).unwrap();

        let dumped: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dump_path).unwrap()).unwrap();
        let rows = dumped.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        // first row is pair (1, 2); the only edges are (1,2) and (2,3)
        assert_eq!(rows[0]["common_neighbours"], serde_json::json!(0));
        assert_eq!(rows[0]["node1"], serde_json::json!(1.0));
        assert_eq!(rows[0]["node2"], serde_json::json!(2.0));

        let output = std::fs::read_to_string(&output_path).unwrap();
        assert_eq!(output.lines().count(), 3); // header plus one line per pair
    }
}
