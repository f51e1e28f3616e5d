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

//! Analysis configuration.
//!
//! Every field has a serde default so a partial TOML file (or none at all)
//! yields a working configuration.

use serde::{Deserialize, Serialize};
use solarlens_types::{Covariate, Strategy};

use crate::error::ValidationError;
use crate::outlier::FitParams;

fn default_timestamp_column() -> String {
    "Timestamp".to_owned()
}

fn default_output_column() -> String {
    "SolarGeneration".to_owned()
}

fn default_air_temperature_column() -> Option<String> {
    Some("AirTemperature".to_owned())
}

fn default_relative_humidity_column() -> Option<String> {
    Some("RelativeHumidity".to_owned())
}

fn default_wind_speed_column() -> Option<String> {
    Some("WindSpeed".to_owned())
}

fn default_strategy() -> String {
    Strategy::Zscore.as_str().to_owned()
}

fn default_threshold() -> f64 {
    3.0
}

fn default_contamination() -> f64 {
    0.05
}

fn default_random_seed() -> u64 {
    42
}

fn default_n_estimators() -> usize {
    100
}

fn default_max_samples() -> usize {
    256
}

fn default_max_dates_shown() -> usize {
    5
}

/// Maps source column names onto the fields the pipeline understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_timestamp_column")]
    pub timestamp: String,
    #[serde(default = "default_output_column")]
    pub output: String,
    #[serde(default = "default_air_temperature_column")]
    pub air_temperature: Option<String>,
    #[serde(default = "default_relative_humidity_column")]
    pub relative_humidity: Option<String>,
    #[serde(default = "default_wind_speed_column")]
    pub wind_speed: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: default_timestamp_column(),
            output: default_output_column(),
            air_temperature: default_air_temperature_column(),
            relative_humidity: default_relative_humidity_column(),
            wind_speed: default_wind_speed_column(),
        }
    }
}

impl ColumnMapping {
    #[must_use]
    pub fn covariate(&self, covariate: Covariate) -> Option<&str> {
        match covariate {
            Covariate::AirTemperature => self.air_temperature.as_deref(),
            Covariate::RelativeHumidity => self.relative_humidity.as_deref(),
            Covariate::WindSpeed => self.wind_speed.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// "zscore" or "ensemble"
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Z-score magnitude above which an hour is anomalous
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Expected share of anomalous hours for the ensemble
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// Subsample size per isolation tree
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            threshold: default_threshold(),
            contamination: default_contamination(),
            random_seed: default_random_seed(),
            n_estimators: default_n_estimators(),
            max_samples: default_max_samples(),
        }
    }
}

impl DetectionConfig {
    pub fn strategy(&self) -> Result<Strategy, ValidationError> {
        Strategy::parse(&self.strategy)
            .ok_or_else(|| ValidationError::UnsupportedStrategy(self.strategy.clone()))
    }

    /// Resolve the strategy and its validated fit parameters
    pub fn resolve(&self) -> Result<(Strategy, FitParams), ValidationError> {
        let strategy = self.strategy()?;
        let params = FitParams {
            threshold: self.threshold,
            contamination: self.contamination,
            random_seed: self.random_seed,
            n_estimators: self.n_estimators,
            max_samples: self.max_samples,
        };
        params.validate()?;
        Ok((strategy, params))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_max_dates_shown")]
    pub max_dates_shown: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_dates_shown: default_max_dates_shown(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.columns.timestamp.trim().is_empty() {
            return Err(ValidationError::InvalidParameter {
                name: "columns.timestamp",
                reason: "column name must not be empty".to_owned(),
            });
        }
        if self.columns.output.trim().is_empty() {
            return Err(ValidationError::InvalidParameter {
                name: "columns.output",
                reason: "column name must not be empty".to_owned(),
            });
        }
        if self.summary.max_dates_shown == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "summary.max_dates_shown",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.detection.resolve().map(|_| ())
    }
}
