use crate::data::model::{Dataset, Record};

/// What a model reports for one test record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Anomaly score; higher means more anomalous.
    pub score: f64,
    /// Score above which the model calls a record anomalous.
    pub threshold: f64,
    /// Model reconstruction of the signal, same length as the input, if the
    /// model produces one.
    pub reconstruction: Option<Vec<f64>>,
}

impl ModelOutput {
    pub fn is_anomaly(&self) -> bool {
        self.score > self.threshold
    }
}

/// An anomaly detection model the "Model" and "Model Output" sections can
/// display. The viewer ships without one and shows a placeholder.
pub trait AnomalyModel {
    fn name(&self) -> &str;

    /// Score one test record. `train` is the training set if it has loaded.
    fn evaluate(&self, record: &Record, train: Option<&Dataset>) -> ModelOutput;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_is_strictly_above_threshold() {
        let mut out = ModelOutput {
            score: 0.5,
            threshold: 0.5,
            reconstruction: None,
        };
        assert!(!out.is_anomaly());
        out.score = 0.51;
        assert!(out.is_anomaly());
    }
}
