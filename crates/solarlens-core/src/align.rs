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

//! Time alignment and cleaning.
//!
//! Drops unusable readings, sorts the rest chronologically (stable) and
//! averages them into calendar-hour buckets. Hours without readings produce
//! no bucket.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use solarlens_types::{Covariates, HourlyBucket, RawReading};
use tracing::{debug, warn};

/// Result of [`align`]: the hourly series plus row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub buckets: Vec<HourlyBucket>,
    /// Readings discarded for a missing or unusable timestamp/output
    pub dropped_rows: usize,
    /// Readings that contributed to a bucket
    pub retained_rows: usize,
}

/// Truncate a timestamp to the start of its hour
#[must_use]
pub fn hour_start(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.date().and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(timestamp.hour()))
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "reading counts per hour are far below f64 mantissa precision"
    )]
    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Copy)]
struct HourAccumulator {
    hour_start: NaiveDateTime,
    output: Mean,
    air_temperature: Mean,
    relative_humidity: Mean,
    wind_speed: Mean,
}

impl HourAccumulator {
    fn new(hour_start: NaiveDateTime) -> Self {
        Self {
            hour_start,
            output: Mean::default(),
            air_temperature: Mean::default(),
            relative_humidity: Mean::default(),
            wind_speed: Mean::default(),
        }
    }

    fn push(&mut self, output: f64, covariates: &Covariates) {
        self.output.push(Some(output));
        self.air_temperature.push(covariates.air_temperature);
        self.relative_humidity.push(covariates.relative_humidity);
        self.wind_speed.push(covariates.wind_speed);
    }

    fn finish(self) -> HourlyBucket {
        HourlyBucket {
            hour_start: self.hour_start,
            // at least one output was pushed when the accumulator was opened
            output: self.output.value().unwrap_or_default(),
            covariates: Covariates {
                air_temperature: self.air_temperature.value(),
                relative_humidity: self.relative_humidity.value(),
                wind_speed: self.wind_speed.value(),
            },
            reading_count: self.output.count,
        }
    }
}

/// Clean, sort and aggregate raw readings into an hourly series.
#[must_use]
pub fn align(readings: &[RawReading]) -> AlignedSeries {
    let mut valid: Vec<(NaiveDateTime, f64, &Covariates)> = readings
        .iter()
        .filter_map(|r| {
            r.valid_parts()
                .map(|(timestamp, output)| (timestamp, output, &r.covariates))
        })
        .collect();

    let retained_rows = valid.len();
    let dropped_rows = readings.len() - retained_rows;
    if dropped_rows > 0 {
        warn!(
            dropped = dropped_rows,
            retained = retained_rows,
            "Dropped readings with missing or invalid timestamp/output"
        );
    }

    // stable: equal timestamps keep their input order
    valid.sort_by_key(|(timestamp, _, _)| *timestamp);

    let mut buckets = Vec::new();
    let mut current: Option<HourAccumulator> = None;

    for (timestamp, output, covariates) in valid {
        let hour = hour_start(timestamp);
        match current.as_mut() {
            Some(acc) if acc.hour_start == hour => acc.push(output, covariates),
            _ => {
                if let Some(done) = current.take() {
                    buckets.push(done.finish());
                }
                let mut acc = HourAccumulator::new(hour);
                acc.push(output, covariates);
                current = Some(acc);
            }
        }
    }
    if let Some(done) = current {
        buckets.push(done.finish());
    }

    debug!(
        readings = retained_rows,
        buckets = buckets.len(),
        "Aligned readings to hourly buckets"
    );

    AlignedSeries {
        buckets,
        dropped_rows,
        retained_rows,
    }
}
