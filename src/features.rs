use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::datasets::records::PairRecord;
use crate::errors::FeatureError;
use crate::graph::{DegreeOnePolicy, Graph};

/// The four structural similarity signals for one node pair, plus the raw
/// node identifiers. Column order is fixed; the models are trained on it.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct FeatureVector {
    pub common_neighbours: i32,
    pub jaccard_coefficient: f64,
    pub shortest_path_length: i64,
    pub adamic_adar: f64,
    pub node1: f64,
    pub node2: f64,
}

impl FeatureVector {
    pub const WIDTH: usize = 6;

    pub fn as_row(&self) -> [f64; Self::WIDTH] {
        [
            self.common_neighbours as f64,
            self.jaccard_coefficient,
            self.shortest_path_length as f64,
            self.adamic_adar,
            self.node1,
            self.node2,
        ]
    }
}

pub fn compute_features(pair: &PairRecord,
                        graph: &Graph<String>,
                        policy: DegreeOnePolicy) -> Result<FeatureVector, FeatureError>
{
    Ok(FeatureVector {
        common_neighbours: graph.common_neighbour_count(&pair.node1, &pair.node2),
        jaccard_coefficient: graph.jaccard_coefficient(&pair.node1, &pair.node2),
        shortest_path_length: graph.shortest_path_length(&pair.node1, &pair.node2),
        adamic_adar: graph.adamic_adar(&pair.node1, &pair.node2, policy)?,
        node1: node_feature(&pair.node1, graph),
        node2: node_feature(&pair.node2, graph),
    })
}

// Numeric identifiers pass through as-is; everything else falls back to the
// node's interned index, which is stable because the universe is sorted
// before interning.
fn node_feature(id: &str, graph: &Graph<String>) -> f64 {
    match id.parse::<f64>() {
        Ok(value) => value,
        Err(_) => graph.node_index(&id.to_string()).map(|i| i as f64).unwrap_or(-1.0),
    }
}

/// Compute the feature vector for every pair, preserving input order.
/// Pairs are independent, so rows are mapped in parallel.
pub fn generate_features(pairs: &[PairRecord],
                         graph: &Graph<String>,
                         policy: DegreeOnePolicy) -> Result<Vec<FeatureVector>, FeatureError>
{
    let progress = ProgressBar::new(pairs.len() as u64);
    let features = pairs.par_iter()
        .map(|pair| {
            let features = compute_features(pair, graph, policy);
            progress.inc(1);
            features
        })
        .collect::<Result<Vec<_>, _>>();
    progress.finish_and_clear();
    features
}
