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

//! Summary statistics and the narrative digest.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use solarlens_types::{LabeledBucket, OutputStats, Summary};

pub const NO_DATA_NARRATIVE: &str = "No hourly data available.";
pub const NONE_DETECTED: &str = "None detected";

/// max/min/mean/sum/count over every bucket's output, anomalies included
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "bucket counts are far below f64 mantissa precision"
)]
pub fn output_stats(labeled: &[LabeledBucket]) -> OutputStats {
    if labeled.is_empty() {
        return OutputStats::default();
    }
    let outputs = labeled.iter().map(|l| l.bucket.output);
    let sum: f64 = outputs.clone().sum();
    OutputStats {
        max: outputs.clone().fold(f64::NEG_INFINITY, f64::max),
        min: outputs.fold(f64::INFINITY, f64::min),
        mean: sum / labeled.len() as f64,
        sum,
        count: labeled.len(),
    }
}

/// Distinct calendar dates with at least one anomalous hour, ascending
#[must_use]
pub fn anomalous_dates(labeled: &[LabeledBucket]) -> Vec<NaiveDate> {
    labeled
        .iter()
        .filter(|l| l.is_anomalous)
        .map(|l| l.bucket.date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Comma-separated dates, at most `max_dates_shown`, with a count of the rest
#[must_use]
pub fn format_dates(dates: &[NaiveDate], max_dates_shown: usize) -> String {
    if dates.is_empty() {
        return NONE_DETECTED.to_owned();
    }
    let mut shown = dates
        .iter()
        .take(max_dates_shown)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let remaining = dates.len().saturating_sub(max_dates_shown);
    if remaining > 0 {
        shown.push_str(&format!("... ({remaining} more)"));
    }
    shown
}

/// Build stats and narrative for a labeled series.
///
/// Deterministic: the same input always yields the same string.
#[must_use]
pub fn summarize(labeled: &[LabeledBucket], max_dates_shown: usize) -> Summary {
    let stats = output_stats(labeled);
    if stats.count == 0 {
        return Summary {
            stats,
            narrative: NO_DATA_NARRATIVE.to_owned(),
        };
    }

    let dates = format_dates(&anomalous_dates(labeled), max_dates_shown);
    let narrative = format!(
        "Avg output: {:.2} kWh. Anomalies detected on: {dates}. Peak output: {:?} kWh.",
        stats.mean, stats.max
    );
    Summary { stats, narrative }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarlens_types::{Covariates, HourlyBucket};

    fn labeled(day: u32, hour: u32, output: f64, is_anomalous: bool) -> LabeledBucket {
        LabeledBucket {
            bucket: HourlyBucket {
                hour_start: NaiveDate::from_ymd_opt(2023, 1, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
                output,
                covariates: Covariates::default(),
                reading_count: 4,
            },
            is_anomalous,
            score: None,
        }
    }

    #[test]
    fn test_stats_include_anomalies() {
        let series = vec![
            labeled(1, 0, 10.0, false),
            labeled(1, 1, 20.0, false),
            labeled(1, 2, 90.0, true),
        ];
        let stats = output_stats(&series);
        assert_eq!(stats.max, 90.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.sum, 120.0);
        assert_eq!(stats.mean, 40.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_narrative_without_anomalies() {
        let series = vec![labeled(1, 0, 150.0, false), labeled(1, 1, 151.0, false)];
        let summary = summarize(&series, 5);
        assert_eq!(
            summary.narrative,
            "Avg output: 150.50 kWh. Anomalies detected on: None detected. Peak output: 151.0 kWh."
        );
    }

    #[test]
    fn test_dates_are_deduplicated_and_sorted() {
        let series = vec![
            labeled(2, 3, 1.0, true),
            labeled(2, 9, 1.0, true),
            labeled(1, 5, 1.0, true),
            labeled(3, 5, 1.0, false),
        ];
        let dates = anomalous_dates(&series);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            ]
        );
        let summary = summarize(&series, 5);
        assert!(
            summary
                .narrative
                .contains("Anomalies detected on: 2023-01-01, 2023-01-02.")
        );
    }

    #[test]
    fn test_truncation_reports_remaining() {
        let series: Vec<_> = (1..=7).map(|d| labeled(d, 12, 5.0, true)).collect();
        let summary = summarize(&series, 5);
        assert!(summary.narrative.contains(
            "2023-01-01, 2023-01-02, 2023-01-03, 2023-01-04, 2023-01-05... (2 more)"
        ));
        assert!(!summary.narrative.contains("2023-01-06"));
        assert_eq!(format_dates(&anomalous_dates(&series), 7).matches(", ").count(), 6);
    }

    #[test]
    fn test_peak_native_precision_and_avg_rounding() {
        let series = vec![labeled(1, 0, 1.234_567, false), labeled(1, 1, 2.0, false)];
        let summary = summarize(&series, 5);
        assert!(summary.narrative.starts_with("Avg output: 1.62 kWh."));
        assert!(summary.narrative.ends_with("Peak output: 2.0 kWh."));

        let series = vec![labeled(1, 0, 1.234_567, false)];
        assert!(
            summarize(&series, 5)
                .narrative
                .ends_with("Peak output: 1.234567 kWh.")
        );
    }

    #[test]
    fn test_empty_series() {
        let summary = summarize(&[], 5);
        assert_eq!(summary.stats, OutputStats::default());
        assert_eq!(summary.narrative, NO_DATA_NARRATIVE);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let series: Vec<_> = (0..24)
            .map(|h| labeled(4, h, 100.0 + f64::from(h), h == 13))
            .collect();
        assert_eq!(summarize(&series, 5), summarize(&series, 5));
    }
}
