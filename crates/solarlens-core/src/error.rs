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

//! Error types for the analysis pipeline

use thiserror::Error;

/// Fatal precondition failures surfaced to the caller before or during fitting.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required columns in CSV: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("cannot fit an outlier model on an empty hourly series")]
    EmptySeries,

    #[error("unsupported strategy: {0} (expected \"zscore\" or \"ensemble\")")]
    UnsupportedStrategy(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    /// The validation failure, if this error is one
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Io(_) | Self::Csv(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
