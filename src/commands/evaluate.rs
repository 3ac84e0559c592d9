use std::path::PathBuf;

use prettytable::{Cell, Row, Table};

use crate::datasets::assembly::{assemble_training, split};
use crate::datasets::records;
use crate::datasets::records::PairRecord;
use crate::graph::{build_graph, DegreeOnePolicy};
use crate::models::SoftVotingEnsemble;
use crate::utils::metrics::BinaryClassificationMetrics;

/// Fit on the training partition, score the holdout partition, print the
/// scores. Uses only the training table; the graph sees no inference nodes.
/// Returns the scores, or `None` when there is nothing to score.
pub fn evaluate(training_file: PathBuf,
                holdout_fraction: f64,
                seed: u64,
                strict_adamic_adar: bool)
    -> anyhow::Result<Option<[(&'static str, f64); 9]>>
{
    let policy = if strict_adamic_adar {
        DegreeOnePolicy::Fail
    } else {
        DegreeOnePolicy::Skip
    };

    let training = records::load_training_records(training_file)?;
    if training.is_empty() {
        log::warn!("No training pairs provided!");
        return Ok(None);
    }
    let graph = build_graph(
        records::node_universe(&training, &[]),
        records::positive_edges(&training),
    )?;

    let training_pairs = training.iter().map(PairRecord::from).collect::<Vec<_>>();
    let (matrix, labels) = assemble_training(&training_pairs, &graph, policy)?;
    let (train_matrix, eval_matrix, train_labels, eval_labels) =
        split(&matrix, &labels, holdout_fraction, seed)?;
    if eval_matrix.n_rows() == 0 {
        log::warn!("Holdout partition is empty; nothing to score");
        return Ok(None);
    }
    log::info!("Evaluating on {} held-out rows (seed {seed})", eval_matrix.n_rows());

    let mut ensemble = SoftVotingEnsemble::with_default_members();
    ensemble.fit(&train_matrix, &train_labels)?;
    let predictions = ensemble.predict(&eval_matrix)?;

    let predicted = predictions.iter().map(|&p| p == 1).collect::<Vec<_>>();
    let truth = eval_labels.iter().map(|&label| label > 0.0).collect::<Vec<_>>();
    let metrics = BinaryClassificationMetrics::new(&predicted, &truth);

    let values = get_metric_values(&metrics);
    let mut table = Table::new();
    table.set_titles(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));
    for (name, value) in values {
        table.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new(format!("{value:.4}").as_str()),
        ]));
    }
    table.printstd();
    Ok(Some(values))
}

fn get_metric_values(metrics: &BinaryClassificationMetrics) -> [(&'static str, f64); 9] {
    [
        ("accuracy", metrics.accuracy()),
        ("precision", metrics.precision()),
        ("recall", metrics.recall()),
        ("f1_score", metrics.f1_score()),
        ("balanced_accuracy", metrics.balanced_accuracy()),
        ("true_positives", metrics.confusion_matrix.true_positives as f64),
        ("false_positives", metrics.confusion_matrix.false_positives as f64),
        ("true_negatives", metrics.confusion_matrix.true_negatives as f64),
        ("false_negatives", metrics.confusion_matrix.false_negatives as f64),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_training_table(dir: &std::path::Path) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("train.csv");
        std::fs::write(&path,
                       "node1,node2,label\n1,2,1\n2,3,1\n1,4,0\n3,4,0\n").unwrap();
        path
    }

    #[test]
    fn empty_holdout_is_skipped_without_scoring() {
        let dir = std::env::temp_dir().join("link-predictor-evaluate-empty");
        let training_path = write_training_table(&dir);
        let scores = evaluate(training_path, 0.0, 42, false).unwrap();
        assert!(scores.is_none());
    }

    #[test]
    fn holdout_scoring_covers_every_held_out_row() {
        let dir = std::env::temp_dir().join("link-predictor-evaluate-holdout");
        let training_path = write_training_table(&dir);
        let scores = evaluate(training_path, 0.5, 42, false).unwrap().unwrap();

        let lookup = |wanted: &str| {
            scores.iter().find(|(name, _)| *name == wanted).unwrap().1
        };
        let accuracy = lookup("accuracy");
        assert!((0.0..=1.0).contains(&accuracy));
        let total = lookup("true_positives") + lookup("false_positives")
            + lookup("true_negatives") + lookup("false_negatives");
        assert_eq!(total, 2.0);
    }
}
