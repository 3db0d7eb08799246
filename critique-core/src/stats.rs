//! Batch statistics and running statistics.
use serde::{Deserialize, Serialize};

/// Standard deviations below this value are treated as zero.
pub const STD_EPS: f32 = 1e-8;

/// Mean of the values, 0 for an empty slice.
pub fn mean(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f32>() / xs.len() as f32
    }
}

/// Population standard deviation of the values.
pub fn std(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m) * (x - m)).sum::<f32>() / xs.len() as f32).sqrt()
}

/// Maps values to `(x - mean) / std`.
///
/// When `std` is below [`STD_EPS`] the values are returned unchanged.
pub fn normalize(xs: &[f32], mean: f32, std: f32) -> Vec<f32> {
    if std < STD_EPS {
        xs.to_vec()
    } else {
        xs.iter().map(|x| (x - mean) / std).collect()
    }
}

/// Maps normalized values back to `x * std + mean`.
pub fn unnormalize(xs: &[f32], mean: f32, std: f32) -> Vec<f32> {
    xs.iter().map(|x| x * std + mean).collect()
}

/// Shifts and scales values to zero mean and unit population variance.
///
/// Values with zero variance are returned unchanged.
pub fn standardize(xs: &[f32]) -> Vec<f32> {
    normalize(xs, mean(xs), std(xs))
}

/// Exponential moving average of batch standard deviations.
///
/// Starts at 1 and is updated with `value = decay * value + (1 - decay) * std(batch)`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RunningStd {
    value: f32,
    decay: f32,
}

impl RunningStd {
    /// Creates a statistic with the given decay.
    pub fn new(decay: f32) -> Self {
        Self { value: 1.0, decay }
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Folds the standard deviation of a batch into the average.
    pub fn update(&mut self, batch: &[f32]) -> f32 {
        self.value = self.decay * self.value + (1.0 - self.decay) * std(batch);
        self.value
    }

    /// Updates the statistic with the batch and returns
    /// `(x - mean(batch)) / max(value, STD_EPS)` for each value.
    pub fn normalize(&mut self, batch: &[f32]) -> Vec<f32> {
        let scale = self.update(batch).max(STD_EPS);
        let m = mean(batch);
        batch.iter().map(|x| (x - m) / scale).collect()
    }
}
