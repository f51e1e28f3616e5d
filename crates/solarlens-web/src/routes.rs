// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

//! Dashboard and upload page models.

use askama::Template;
use solarlens_types::AnalysisResult;
use tracing::warn;

use crate::chart::{self, RenderedChart};

pub const PLACEHOLDER: &str = "Upload your data to see real-time analytics and anomaly detection!";

/// Anomaly table row, formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyRow {
    pub timestamp: String,
    pub output: String,
    /// `|z|` in standard deviations, `-` when the strategy gives no score
    pub deviation: String,
}

/// Everything the dashboard shows for one analyzed upload
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub strategy: String,
    pub max_output: String,
    pub min_output: String,
    pub avg_output: String,
    pub total_output: String,
    pub data_points: usize,
    pub narrative: String,
    pub dropped_rows: usize,
    pub anomalies: Vec<AnomalyRow>,
    pub charts: Vec<RenderedChart>,
}

impl DashboardView {
    /// Chart failures are logged and leave the chart list empty; the stats
    /// and narrative are still shown.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let stats = result.stats();

        let charts = chart::dashboard_charts(result).unwrap_or_else(|e| {
            warn!("Chart rendering failed: {}", e);
            Vec::new()
        });

        let anomalies = result
            .anomalies()
            .into_iter()
            .map(|record| AnomalyRow {
                timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                output: format!("{:.2}", record.output),
                deviation: record
                    .score
                    .map_or_else(|| "-".to_owned(), |z| format!("{:.2}σ", z.abs())),
            })
            .collect();

        Self {
            strategy: result.strategy.to_string(),
            max_output: format!("{:.2}", stats.max),
            min_output: format!("{:.2}", stats.min),
            avg_output: format!("{:.2}", stats.mean),
            total_output: format!("{:.2}", stats.sum),
            data_points: stats.count,
            narrative: result.narrative().to_owned(),
            dropped_rows: result.dropped_rows,
            anomalies,
            charts,
        }
    }
}

#[derive(Debug, Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub view: Option<DashboardView>,
    pub placeholder: &'static str,
}

impl DashboardTemplate {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            view: None,
            placeholder: PLACEHOLDER,
        }
    }

    #[must_use]
    pub fn with_view(view: DashboardView) -> Self {
        Self {
            view: Some(view),
            placeholder: PLACEHOLDER,
        }
    }
}

#[derive(Debug, Default, Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub error: Option<String>,
}
