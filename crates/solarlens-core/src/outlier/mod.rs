// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Outlier models.
//!
//! Two interchangeable strategies share one interface:
//! - [`ZScoreModel`]: mean/sample standard deviation of hourly output
//! - [`IsolationForest`]: seeded isolation ensemble over the output column
//!
//! A model is fitted once per dataset and never shared between analyses.

mod isolation_forest;
mod zscore;

pub use isolation_forest::IsolationForest;
pub use zscore::ZScoreModel;

use serde::{Deserialize, Serialize};
use solarlens_types::{HourlyBucket, Strategy};
use tracing::debug;

use crate::error::ValidationError;

/// Outcome of applying a fitted model to one output value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub is_anomalous: bool,
    /// Signed deviation, only reported by the zscore strategy
    pub score: Option<f64>,
}

/// Decision function of a fitted model
pub trait OutlierDetector {
    fn decide(&self, output: f64) -> Decision;

    fn name(&self) -> &'static str;
}

/// Parameters recognized by [`fit`]. Ensemble-only fields are ignored by the
/// zscore strategy and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// zscore only
    pub threshold: f64,
    /// ensemble only
    pub contamination: f64,
    /// ensemble only
    pub random_seed: u64,
    /// ensemble only
    pub n_estimators: usize,
    /// ensemble only
    pub max_samples: usize,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            contamination: 0.05,
            random_seed: 42,
            n_estimators: 100,
            max_samples: 256,
        }
    }
}

impl FitParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: "threshold",
                reason: format!("must be a positive number, got {}", self.threshold),
            });
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ValidationError::InvalidParameter {
                name: "contamination",
                reason: format!("must be in (0, 0.5], got {}", self.contamination),
            });
        }
        if self.n_estimators == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "n_estimators",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.max_samples == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "max_samples",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// A fitted outlier model
#[derive(Debug, Clone)]
pub enum OutlierModel {
    Ensemble(IsolationForest),
    Zscore(ZScoreModel),
}

impl OutlierModel {
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Ensemble(_) => Strategy::Ensemble,
            Self::Zscore(_) => Strategy::Zscore,
        }
    }

    #[must_use]
    pub fn decide_bucket(&self, bucket: &HourlyBucket) -> Decision {
        self.decide(bucket.output)
    }
}

impl OutlierDetector for OutlierModel {
    fn decide(&self, output: f64) -> Decision {
        match self {
            Self::Ensemble(model) => model.decide(output),
            Self::Zscore(model) => model.decide(output),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Ensemble(model) => model.name(),
            Self::Zscore(model) => model.name(),
        }
    }
}

/// Fit an outlier model on the hourly output column.
///
/// Fails with [`ValidationError::EmptySeries`] when `buckets` is empty.
pub fn fit(
    buckets: &[HourlyBucket],
    strategy: Strategy,
    params: &FitParams,
) -> Result<OutlierModel, ValidationError> {
    if buckets.is_empty() {
        return Err(ValidationError::EmptySeries);
    }
    params.validate()?;

    let outputs: Vec<f64> = buckets.iter().map(|b| b.output).collect();
    let model = match strategy {
        Strategy::Zscore => OutlierModel::Zscore(ZScoreModel::fit(&outputs, params.threshold)),
        Strategy::Ensemble => OutlierModel::Ensemble(IsolationForest::fit(&outputs, params)),
    };

    debug!(
        strategy = %strategy,
        samples = outputs.len(),
        model = model.name(),
        "Fitted outlier model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use solarlens_types::Covariates;

    fn buckets(outputs: &[f64]) -> Vec<HourlyBucket> {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        outputs
            .iter()
            .enumerate()
            .map(|(i, &output)| HourlyBucket {
                hour_start: day.and_hms_opt(0, 0, 0).unwrap() + chrono::TimeDelta::hours(i as i64),
                output,
                covariates: Covariates::default(),
                reading_count: 1,
            })
            .collect()
    }

    #[test]
    fn test_fit_empty_is_validation_error() {
        for strategy in [Strategy::Zscore, Strategy::Ensemble] {
            let err = fit(&[], strategy, &FitParams::default()).unwrap_err();
            assert_eq!(err, ValidationError::EmptySeries);
        }
    }

    #[test]
    fn test_fit_dispatches_on_strategy() {
        let data = buckets(&[1.0, 2.0, 3.0]);
        let z = fit(&data, Strategy::Zscore, &FitParams::default()).unwrap();
        assert_eq!(z.strategy(), Strategy::Zscore);
        let e = fit(&data, Strategy::Ensemble, &FitParams::default()).unwrap();
        assert_eq!(e.strategy(), Strategy::Ensemble);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let data = buckets(&[1.0, 2.0]);
        let bad_threshold = FitParams {
            threshold: 0.0,
            ..FitParams::default()
        };
        assert!(matches!(
            fit(&data, Strategy::Zscore, &bad_threshold),
            Err(ValidationError::InvalidParameter {
                name: "threshold",
                ..
            })
        ));

        let bad_contamination = FitParams {
            contamination: 0.7,
            ..FitParams::default()
        };
        assert!(matches!(
            fit(&data, Strategy::Ensemble, &bad_contamination),
            Err(ValidationError::InvalidParameter {
                name: "contamination",
                ..
            })
        ));
    }
}
