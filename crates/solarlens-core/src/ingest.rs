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

//! CSV ingest.
//!
//! Turns a tabular source into [`RawReading`]s using a [`ColumnMapping`].
//! Unparsable cells become `None` so that alignment decides what to drop;
//! only a missing required column is fatal here.

use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use solarlens_types::{Covariate, Covariates, RawReading};
use tracing::debug;

use crate::config::ColumnMapping;
use crate::error::{Result, ValidationError};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    timestamp: usize,
    output: usize,
    air_temperature: Option<usize>,
    relative_humidity: Option<usize>,
    wind_speed: Option<usize>,
}

impl ColumnIndices {
    fn resolve(headers: &[String], columns: &ColumnMapping) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name.trim());

        let timestamp = find(columns.timestamp.as_str());
        let output = find(columns.output.as_str());

        let (Some(timestamp), Some(output)) = (timestamp, output) else {
            let mut missing = Vec::new();
            if timestamp.is_none() {
                missing.push(columns.timestamp.clone());
            }
            if output.is_none() {
                missing.push(columns.output.clone());
            }
            return Err(ValidationError::MissingColumns { missing }.into());
        };

        // An empty mapping disables the covariate
        let optional = |covariate: Covariate| {
            columns
                .covariate(covariate)
                .filter(|name| !name.trim().is_empty())
                .and_then(find)
        };

        Ok(Self {
            timestamp,
            output,
            air_temperature: optional(Covariate::AirTemperature),
            relative_humidity: optional(Covariate::RelativeHumidity),
            wind_speed: optional(Covariate::WindSpeed),
        })
    }
}

/// Parse a timestamp cell, trying ISO layouts first.
///
/// A bare date is read as midnight. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim().trim_end_matches('.');
    if value.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an energy output cell. Negative values are not valid output.
#[must_use]
pub fn parse_output(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|v| *v >= 0.0)
}

/// Read readings from any CSV source with a header row.
pub fn read_csv<R: io::Read>(reader: R, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let indices = ColumnIndices::resolve(&headers, columns)?;

    let mut readings = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        // Undecodable cells read as empty so alignment drops the row
        let cell = |idx: usize| {
            record
                .get(idx)
                .and_then(|raw| std::str::from_utf8(raw).ok())
                .unwrap_or("")
        };
        let covariate = |idx: Option<usize>| idx.and_then(|i| parse_number(cell(i)));

        readings.push(RawReading {
            timestamp: parse_timestamp(cell(indices.timestamp)),
            output: parse_output(cell(indices.output)),
            covariates: Covariates {
                air_temperature: covariate(indices.air_temperature),
                relative_humidity: covariate(indices.relative_humidity),
                wind_speed: covariate(indices.wind_speed),
            },
        });
    }

    debug!(rows = readings.len(), "Parsed CSV rows");
    Ok(readings)
}

pub fn read_csv_path<P: AsRef<Path>>(path: P, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv(io::BufReader::new(file), columns)
}
