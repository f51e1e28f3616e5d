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

//! Shared data model for the SolarLens analysis pipeline.
//!
//! Values flow strictly forward: [`RawReading`] → [`HourlyBucket`] →
//! [`LabeledBucket`] → [`AnalysisResult`]. None of these types is mutated
//! after it leaves the stage that produced it.

pub mod analysis;
pub mod reading;

pub use analysis::{AnalysisResult, AnomalyRecord, LabeledBucket, OutputStats, Strategy, Summary};
pub use reading::{Covariate, Covariates, HourlyBucket, RawReading};
