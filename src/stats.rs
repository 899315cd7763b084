//! Summary statistics over an envelope's data points.

use std::fmt;

use serde::Serialize;

use crate::envelope::DataPoint;

/// Aggregate figures derived from a complete point sequence.
///
/// Always computed from the points themselves so the summary can never
/// drift from the data it describes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SummaryStatistics {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    /// Population standard deviation.
    pub volatility: f64,
    pub count: usize,
}

impl SummaryStatistics {
    /// Computes the summary of `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - Data points in any order
    ///
    /// # Returns
    ///
    /// All-zero statistics for an empty slice.
    pub fn from_points(points: &[DataPoint]) -> Self {
        Self::from_values(points.iter().map(|p| p.value))
    }

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mut sum = 0.0_f64;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for &v in &values {
            sum += v;
            max = max.max(v);
            min = min.min(v);
        }
        let avg = sum / n;
        let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n;

        Self {
            avg,
            max,
            min,
            volatility: variance.sqrt(),
            count: values.len(),
        }
    }
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Points:      {}", self.count)?;
        writeln!(f, "Average:     {:.2}", self.avg)?;
        writeln!(f, "Maximum:     {:.2}", self.max)?;
        writeln!(f, "Minimum:     {:.2}", self.min)?;
        write!(f, "Volatility:  {:.2}", self.volatility)
    }
}
