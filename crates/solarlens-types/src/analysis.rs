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

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::reading::HourlyBucket;

/// Outlier detection strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Isolation-based ensemble fitted on the hourly output column
    Ensemble,
    /// Mean/standard deviation model with a configurable threshold
    #[default]
    Zscore,
}

impl Strategy {
    /// Parse a strategy name, case-insensitively. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ensemble" | "isolation_forest" => Some(Self::Ensemble),
            "zscore" | "z_score" => Some(Self::Zscore),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ensemble => "ensemble",
            Self::Zscore => "zscore",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An hourly bucket together with its outlier decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledBucket {
    pub bucket: HourlyBucket,
    pub is_anomalous: bool,
    /// Signed z-score for the zscore strategy, `None` for the ensemble
    pub score: Option<f64>,
}

/// Aggregate statistics over hourly output, anomalies included.
///
/// For an empty series every value is `0.0` and `count` is `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputStats {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub sum: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub stats: OutputStats,
    pub narrative: String,
}

/// Row of the anomaly table shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: NaiveDateTime,
    pub output: f64,
    pub score: Option<f64>,
}

/// Terminal artifact of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub strategy: Strategy,
    /// Labeled buckets in ascending `hour_start` order
    pub buckets: Vec<LabeledBucket>,
    pub summary: Summary,
    /// Source rows discarded for a missing or unusable timestamp/output
    pub dropped_rows: usize,
    /// Source rows that contributed to a bucket
    pub retained_rows: usize,
}

impl AnalysisResult {
    #[must_use]
    pub fn stats(&self) -> &OutputStats {
        &self.summary.stats
    }

    #[must_use]
    pub fn narrative(&self) -> &str {
        &self.summary.narrative
    }

    #[must_use]
    pub fn anomaly_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_anomalous).count()
    }

    /// Anomalous hours only, in chronological order
    #[must_use]
    pub fn anomalies(&self) -> Vec<AnomalyRecord> {
        self.buckets
            .iter()
            .filter(|b| b.is_anomalous)
            .map(|b| AnomalyRecord {
                timestamp: b.bucket.hour_start,
                output: b.bucket.output,
                score: b.score,
            })
            .collect()
    }
}
