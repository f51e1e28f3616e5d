// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Decision, OutlierDetector};

/// Mean/standard deviation outlier model.
///
/// Uses the sample standard deviation (n - 1 denominator). A series with a
/// single value, or with no spread at all, is degenerate: nothing is ever
/// anomalous and every score is `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreModel {
    pub mean: f64,
    pub std: f64,
    pub threshold: f64,
}

impl ZScoreModel {
    /// `outputs` must not be empty; [`super::fit`] checks this.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "hourly series lengths are far below f64 mantissa precision"
    )]
    pub fn fit(outputs: &[f64], threshold: f64) -> Self {
        let n = outputs.len() as f64;
        let mean = outputs.iter().sum::<f64>() / n;
        let std = if outputs.len() < 2 {
            0.0
        } else {
            let squares: f64 = outputs.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1.0)).sqrt()
        };

        let model = Self {
            mean,
            std,
            threshold,
        };
        if model.is_degenerate() {
            debug!(mean, "Zero-variance series, no hour will be flagged");
        }
        model
    }

    /// True when the spread is zero up to rounding noise
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.std <= f64::EPSILON * self.mean.abs().max(1.0)
    }

    /// Signed z-score of `output`, `0.0` for a degenerate model
    #[must_use]
    pub fn z_score(&self, output: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (output - self.mean) / self.std
        }
    }
}

impl OutlierDetector for ZScoreModel {
    fn decide(&self, output: f64) -> Decision {
        let score = self.z_score(output);
        Decision {
            is_anomalous: !self.is_degenerate() && score.abs() > self.threshold,
            score: Some(score),
        }
    }

    fn name(&self) -> &'static str {
        "ZScore"
    }
}
