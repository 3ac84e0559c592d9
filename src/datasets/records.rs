use std::collections::HashSet;
use std::path::PathBuf;

/// One row of the training table.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TrainingRecord {
    pub node1: String,
    pub node2: String,
    pub label: Option<u8>,
}

/// One row of the inference table.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct InferenceRecord {
    pub idx: u64,
    pub node1: String,
    pub node2: String,
}

/// One row of the output table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictionRecord {
    pub idx: u64,
    pub ans: u8,
}

/// A node pair with an optional label, decoupled from any table layout.
#[derive(Debug, Clone)]
pub struct PairRecord {
    pub node1: String,
    pub node2: String,
    pub label: Option<u8>,
}

impl From<&TrainingRecord> for PairRecord {
    fn from(record: &TrainingRecord) -> Self {
        Self {
            node1: record.node1.clone(),
            node2: record.node2.clone(),
            label: record.label,
        }
    }
}

impl From<&InferenceRecord> for PairRecord {
    fn from(record: &InferenceRecord) -> Self {
        Self {
            node1: record.node1.clone(),
            node2: record.node2.clone(),
            label: None,
        }
    }
}

/// Every node referenced by any table, so that isolated test-only nodes
/// are still present in the graph.
pub fn node_universe(training: &[TrainingRecord],
                     inference: &[InferenceRecord]) -> HashSet<String>
{
    let mut universe = HashSet::new();
    for record in training {
        universe.insert(record.node1.clone());
        universe.insert(record.node2.clone());
    }
    for record in inference {
        universe.insert(record.node1.clone());
        universe.insert(record.node2.clone());
    }
    universe
}

/// Known edges: training pairs labeled exactly 1. A label of 0, or a
/// missing label, never contributes an edge.
pub fn positive_edges(training: &[TrainingRecord]) -> Vec<(String, String)> {
    training.iter()
        .filter(|record| record.label == Some(1))
        .map(|record| (record.node1.clone(), record.node2.clone()))
        .collect()
}

pub fn load_training_records(filename: PathBuf) -> anyhow::Result<Vec<TrainingRecord>> {
    let mut reader = csv::Reader::from_path(filename)?;
    let mut results = Vec::new();
    for result in reader.deserialize() {
        let record: TrainingRecord = result?;
        results.push(record);
    }
    Ok(results)
}

pub fn load_inference_records(filename: PathBuf) -> anyhow::Result<Vec<InferenceRecord>> {
    let mut reader = csv::Reader::from_path(filename)?;
    let mut results = Vec::new();
    for result in reader.deserialize() {
        let record: InferenceRecord = result?;
        results.push(record);
    }
    Ok(results)
}

pub fn write_prediction_records(filename: PathBuf,
                                records: Vec<PredictionRecord>) -> anyhow::Result<()>
{
    let mut writer = csv::Writer::from_path(filename)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
