//! Training metrics and evaluation

use std::fmt;

/// Loss and confusion counts accumulated during training/evaluation
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Total loss
    pub total_loss: f64,
    /// Number of loss updates accumulated
    pub batch_count: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch loss
    pub fn update_loss(&mut self, loss: f32) {
        self.total_loss += loss as f64;
        self.batch_count += 1;
    }

    /// Record one prediction against its label
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total_predictions(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Get average loss
    pub fn avg_loss(&self) -> f64 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.total_loss / self.batch_count as f64
        }
    }

    /// Share of correct predictions
    pub fn accuracy(&self) -> f64 {
        let total = self.total_predictions();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    pub fn precision(&self) -> f64 {
        let predicted = self.true_positives + self.false_positives;
        if predicted == 0 {
            0.0
        } else {
            self.true_positives as f64 / predicted as f64
        }
    }

    pub fn recall(&self) -> f64 {
        let actual = self.true_positives + self.false_negatives;
        if actual == 0 {
            0.0
        } else {
            self.true_positives as f64 / actual as f64
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.4} | Acc: {:.2}% | Precision: {:.2}% | Recall: {:.2}%",
            self.avg_loss(),
            self.accuracy() * 100.0,
            self.precision() * 100.0,
            self.recall() * 100.0
        )
    }
}

/// Per-epoch loss trace for one ensemble member
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub losses: Vec<f64>,
    pub best_loss: f64,
    pub best_epoch: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            best_loss: f64::INFINITY,
            ..Default::default()
        }
    }

    /// Record metrics for an epoch
    pub fn record_epoch(&mut self, epoch: usize, metrics: &Metrics) {
        let loss = metrics.avg_loss();
        self.losses.push(loss);
        if loss < self.best_loss {
            self.best_loss = loss;
            self.best_epoch = epoch;
        }
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }
}
