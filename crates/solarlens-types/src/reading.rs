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

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Optional weather covariates recorded next to the energy output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Covariates {
    /// Air temperature (°C)
    pub air_temperature: Option<f64>,
    /// Relative humidity (%)
    pub relative_humidity: Option<f64>,
    /// Wind speed (m/s)
    pub wind_speed: Option<f64>,
}

impl Covariates {
    #[must_use]
    pub fn get(&self, covariate: Covariate) -> Option<f64> {
        match covariate {
            Covariate::AirTemperature => self.air_temperature,
            Covariate::RelativeHumidity => self.relative_humidity,
            Covariate::WindSpeed => self.wind_speed,
        }
    }
}

/// Covariate selector, used by chart rendering and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    AirTemperature,
    RelativeHumidity,
    WindSpeed,
}

impl Covariate {
    pub const ALL: [Self; 3] = [Self::AirTemperature, Self::RelativeHumidity, Self::WindSpeed];

    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            Self::AirTemperature => "air_temperature",
            Self::RelativeHumidity => "relative_humidity",
            Self::WindSpeed => "wind_speed",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AirTemperature => "Air Temperature (°C)",
            Self::RelativeHumidity => "Relative Humidity (%)",
            Self::WindSpeed => "Wind Speed (m/s)",
        }
    }
}

/// A single raw observation as read from the source table.
///
/// `timestamp` and `output` are `None` when the source cell was empty or
/// could not be parsed. Such rows are dropped during alignment, never
/// coerced to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: Option<NaiveDateTime>,
    /// Energy output (kWh)
    pub output: Option<f64>,
    #[serde(default)]
    pub covariates: Covariates,
}

impl RawReading {
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, output: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            output: Some(output),
            covariates: Covariates::default(),
        }
    }

    #[must_use]
    pub fn with_covariates(mut self, covariates: Covariates) -> Self {
        self.covariates = covariates;
        self
    }

    /// Returns the timestamp and output when the reading is usable.
    ///
    /// A usable reading has both fields present and a finite, non-negative
    /// output.
    #[must_use]
    pub fn valid_parts(&self) -> Option<(NaiveDateTime, f64)> {
        let timestamp = self.timestamp?;
        let output = self.output?;
        (output.is_finite() && output >= 0.0).then_some((timestamp, output))
    }
}

/// Readings aggregated to one calendar hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    /// Start of the hour (minutes and seconds truncated)
    pub hour_start: NaiveDateTime,
    /// Mean output of all readings in `[hour_start, hour_start + 1h)` (kWh)
    pub output: f64,
    /// Per-covariate mean over the readings that carried a value
    pub covariates: Covariates,
    /// Number of readings that contributed to this bucket
    pub reading_count: usize,
}

impl HourlyBucket {
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.hour_start.date()
    }
}
