use error_set::error_set;

error_set! {
    PipelineError = GraphError || SchemaError || ModelError || FeatureError;
    GraphError = {
        #[display("Undefined vertex: {vertex}")]
        UndefinedVertex{vertex: String},
    };
    SchemaError = {
        #[display("Missing label on training pair ({node1}, {node2})")]
        MissingLabel{node1: String, node2: String},
        #[display("Labels and feature rows differ in length: {labels} vs {rows}")]
        LabelRowMismatch{labels: usize, rows: usize},
        #[display("Holdout fraction must lie in [0, 1], got {fraction}")]
        InvalidHoldoutFraction{fraction: f64}
    };
    ModelError = {
        #[display("Predict called on a model that has not been fitted")]
        NotFitted,
        #[display("Feature count mismatch: fitted on {expected} columns, got {actual}")]
        DimensionMismatch{expected: usize, actual: usize}
    };
    FeatureError = {
        #[display("Adamic-Adar term undefined: common neighbour {vertex} has degree 1")]
        UndefinedMetric{vertex: String},
    };
}
