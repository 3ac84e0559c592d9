//////////////////////////////////////////////////////////////////////////////////////////////////
//////////////////////////////////////////////////////////////////////////////////////////////////
// Binary Metrics
//////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Copy, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BinaryClassificationMetrics {
    pub confusion_matrix: BinaryConfusionMatrix,
}

impl BinaryClassificationMetrics {
    pub fn new(predictions: &[bool], ground_truths: &[bool]) -> Self {
        let confusion = BinaryConfusionMatrix::new(predictions, ground_truths);
        Self { confusion_matrix: confusion }
    }

    pub fn accuracy(&self) -> f64 {
        (self.confusion_matrix.correct() as f64) / (self.confusion_matrix.total() as f64)
    }

    pub fn precision(&self) -> f64 {
        (self.confusion_matrix.true_positives as f64) / (self.confusion_matrix.predicted_positive() as f64)
    }

    pub fn recall(&self) -> f64 {
        (self.confusion_matrix.true_positives as f64) / (self.confusion_matrix.actually_positive() as f64)
    }

    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        2.0 * precision * recall / (precision + recall)
    }

    pub fn specificity(&self) -> f64 {
        (self.confusion_matrix.true_negatives as f64) / (self.confusion_matrix.actually_negative() as f64)
    }

    pub fn balanced_accuracy(&self) -> f64 {
        (self.recall() + self.specificity()) / 2.0
    }
}

//////////////////////////////////////////////////////////////////////////////////////////////////
//////////////////////////////////////////////////////////////////////////////////////////////////
// Binary Confusion Matrix
//////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BinaryConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_negatives: u64,
}

impl BinaryConfusionMatrix {
    pub fn new(predictions: &[bool], ground_truths: &[bool]) -> Self {
        if predictions.len() != ground_truths.len() {
            panic!("Predictions and ground truths must have equal length!")
        }
        let mut true_positives = 0;
        let mut false_positives = 0;
        let mut false_negatives = 0;
        let mut true_negatives = 0;
        let stream = predictions.iter().copied()
            .zip(ground_truths.iter().copied());
        for (prediction, truth) in stream {
            match (prediction, truth) {
                (true, true) => { true_positives += 1; }
                (true, false) => { false_positives += 1; }
                (false, true) => { false_negatives += 1; }
                (false, false) => { true_negatives += 1; }
            }
        }
        Self { true_positives, false_positives, false_negatives, true_negatives }
    }

    pub fn total(&self) -> u64 {
        self.true_positives +
            self.false_positives +
            self.false_negatives +
            self.true_negatives
    }

    pub fn correct(&self) -> u64 {
        self.true_positives + self.true_negatives
    }

    pub fn predicted_positive(&self) -> u64 {
        self.true_positives + self.false_positives
    }

    pub fn actually_positive(&self) -> u64 {
        self.true_positives + self.false_negatives
    }

    pub fn actually_negative(&self) -> u64 {
        self.true_negatives + self.false_positives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_scores() {
        let predictions = [true, true, false, false, true];
        let truths = [true, false, false, true, true];
        let metrics = BinaryClassificationMetrics::new(&predictions, &truths);

        assert_eq!(metrics.confusion_matrix.true_positives, 2);
        assert_eq!(metrics.confusion_matrix.false_positives, 1);
        assert_eq!(metrics.confusion_matrix.false_negatives, 1);
        assert_eq!(metrics.confusion_matrix.true_negatives, 1);
        assert!((metrics.accuracy() - 0.6).abs() < 1e-12);
        assert!((metrics.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recall() - 2.0 / 3.0).abs() < 1e-12);
    }
}
