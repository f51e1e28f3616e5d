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

//! SolarLens analysis core
//!
//! Turns raw solar generation readings into a labeled hourly series,
//! aggregate statistics and a short narrative.
//!
//! ## Pipeline
//!
//! - **Align**: drop unusable rows, sort, average per calendar hour
//! - **Fit**: z-score or isolation forest over hourly output
//! - **Label**: one anomaly decision per hour
//! - **Summarize**: stats plus a bounded narrative of anomalous dates

pub mod align;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod label;
pub mod outlier;
pub mod pipeline;
pub mod summary;

pub use align::{AlignedSeries, align};
pub use config::{AnalysisConfig, ColumnMapping, DetectionConfig, SummaryConfig};
pub use error::{AnalysisError, Result, ValidationError};
pub use label::label;
pub use outlier::{FitParams, OutlierDetector, OutlierModel, fit};
pub use pipeline::Analyzer;
pub use summary::summarize;

pub use solarlens_types as types;
