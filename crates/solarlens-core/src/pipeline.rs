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

//! End-to-end orchestration: align → fit → label → summarize.

use std::io;
use std::path::Path;

use solarlens_types::{AnalysisResult, RawReading, Strategy};
use tracing::info;

use crate::align::align;
use crate::config::AnalysisConfig;
use crate::error::{Result, ValidationError};
use crate::ingest;
use crate::label::label;
use crate::outlier::{FitParams, fit};
use crate::summary::summarize;

/// Runs the analysis pipeline with a validated configuration.
///
/// Holds no model state: every [`Analyzer::run`] fits its own model, so one
/// analyzer can serve concurrent uploads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    strategy: Strategy,
    params: FitParams,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> std::result::Result<Self, ValidationError> {
        config.validate()?;
        let (strategy, params) = config.detection.resolve()?;
        Ok(Self {
            config,
            strategy,
            params,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn run(&self, readings: &[RawReading]) -> Result<AnalysisResult> {
        let aligned = align(readings);
        let model = fit(&aligned.buckets, self.strategy, &self.params)?;
        let labeled = label(&model, &aligned.buckets);
        let summary = summarize(&labeled, self.config.summary.max_dates_shown);

        let result = AnalysisResult {
            strategy: self.strategy,
            buckets: labeled,
            summary,
            dropped_rows: aligned.dropped_rows,
            retained_rows: aligned.retained_rows,
        };

        info!(
            strategy = %self.strategy,
            rows = readings.len(),
            dropped = result.dropped_rows,
            buckets = result.buckets.len(),
            anomalies = result.anomaly_count(),
            "Analysis complete"
        );
        Ok(result)
    }

    pub fn run_csv<R: io::Read>(&self, reader: R) -> Result<AnalysisResult> {
        let readings = ingest::read_csv(reader, &self.config.columns)?;
        self.run(&readings)
    }

    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisResult> {
        let readings = ingest::read_csv_path(path, &self.config.columns)?;
        self.run(&readings)
    }
}
