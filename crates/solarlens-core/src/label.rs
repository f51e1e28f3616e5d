// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

//! Anomaly labeling: applies a fitted model to every bucket independently.

use solarlens_types::{HourlyBucket, LabeledBucket};

use crate::outlier::OutlierModel;

/// One label per bucket, in input order.
#[must_use]
pub fn label(model: &OutlierModel, buckets: &[HourlyBucket]) -> Vec<LabeledBucket> {
    buckets
        .iter()
        .map(|bucket| {
            let decision = model.decide_bucket(bucket);
            LabeledBucket {
                bucket: bucket.clone(),
                is_anomalous: decision.is_anomalous,
                score: decision.score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlier::{FitParams, ZScoreModel, fit};
    use chrono::{NaiveDate, TimeDelta};
    use solarlens_types::{Covariates, Strategy};

    fn series(outputs: &[f64]) -> Vec<HourlyBucket> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        outputs
            .iter()
            .zip(0_i64..)
            .map(|(&output, i)| HourlyBucket {
                hour_start: start + TimeDelta::hours(i),
                output,
                covariates: Covariates::default(),
                reading_count: 4,
            })
            .collect()
    }

    #[test]
    fn test_label_preserves_length_and_order() {
        let buckets = series(&[10.0, 11.0, 9.0, 10.5, 60.0]);
        for strategy in [Strategy::Zscore, Strategy::Ensemble] {
            let model = fit(&buckets, strategy, &FitParams::default()).unwrap();
            let labeled = label(&model, &buckets);
            assert_eq!(labeled.len(), buckets.len());
            for (l, b) in labeled.iter().zip(&buckets) {
                assert_eq!(&l.bucket, b);
            }
        }
    }

    #[test]
    fn test_zscore_labels_carry_signed_score() {
        let buckets = series(&[90.0, 110.0, 140.0]);
        let model = OutlierModel::Zscore(ZScoreModel {
            mean: 100.0,
            std: 10.0,
            threshold: 3.0,
        });
        let labeled = label(&model, &buckets);
        assert_eq!(labeled[0].score, Some(-1.0));
        assert!(!labeled[0].is_anomalous);
        assert_eq!(labeled[2].score, Some(4.0));
        assert!(labeled[2].is_anomalous);
    }

    #[test]
    fn test_ensemble_labels_have_no_score() {
        let buckets = series(&[5.0, 5.5, 6.0, 5.2, 50.0]);
        let model = fit(&buckets, Strategy::Ensemble, &FitParams::default()).unwrap();
        assert!(label(&model, &buckets).iter().all(|l| l.score.is_none()));
    }

    #[test]
    fn test_label_empty() {
        let model = OutlierModel::Zscore(ZScoreModel {
            mean: 0.0,
            std: 1.0,
            threshold: 3.0,
        });
        assert!(label(&model, &[]).is_empty());
    }
}
