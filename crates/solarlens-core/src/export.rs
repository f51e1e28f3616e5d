// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

//! Tabular dump of a finished analysis: one row per hour plus the narrative.

use std::io;
use std::path::{Path, PathBuf};

use solarlens_types::{AnalysisResult, Covariate};
use tracing::info;

use crate::error::Result;

pub const SUMMARY_FILE: &str = "weekly_summary.txt";
pub const LABELED_CSV_FILE: &str = "final_output_with_summary.csv";

const HEADER: [&str; 8] = [
    "hour_start",
    "output_kwh",
    "air_temperature",
    "relative_humidity",
    "wind_speed",
    "is_anomalous",
    "score",
    "summary",
];

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the labeled hourly series as CSV. Absent values are empty cells.
pub fn write_labeled_csv<W: io::Write>(result: &AnalysisResult, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for labeled in &result.buckets {
        let bucket = &labeled.bucket;
        csv.write_record([
            bucket.hour_start.format("%Y-%m-%d %H:%M:%S").to_string(),
            bucket.output.to_string(),
            optional_cell(bucket.covariates.get(Covariate::AirTemperature)),
            optional_cell(bucket.covariates.get(Covariate::RelativeHumidity)),
            optional_cell(bucket.covariates.get(Covariate::WindSpeed)),
            labeled.is_anomalous.to_string(),
            optional_cell(labeled.score),
            result.narrative().to_owned(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Paths written by [`write_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub summary: PathBuf,
    pub labeled_csv: PathBuf,
}

/// Write the narrative and the labeled CSV into `out_dir`, creating it if needed.
pub fn write_outputs<P: AsRef<Path>>(result: &AnalysisResult, out_dir: P) -> Result<OutputPaths> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let summary = out_dir.join(SUMMARY_FILE);
    std::fs::write(&summary, result.narrative())?;

    let labeled_csv = out_dir.join(LABELED_CSV_FILE);
    let file = std::fs::File::create(&labeled_csv)?;
    write_labeled_csv(result, io::BufWriter::new(file))?;

    info!(
        summary = %summary.display(),
        csv = %labeled_csv.display(),
        "Wrote analysis outputs"
    );
    Ok(OutputPaths {
        summary,
        labeled_csv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use solarlens_types::{Covariates, HourlyBucket, LabeledBucket, OutputStats, Strategy, Summary};

    fn sample_result() -> AnalysisResult {
        let hour = |h: u32| {
            NaiveDate::from_ymd_opt(2023, 1, 6)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        AnalysisResult {
            strategy: Strategy::Zscore,
            buckets: vec![
                LabeledBucket {
                    bucket: HourlyBucket {
                        hour_start: hour(13),
                        output: 150.0,
                        covariates: Covariates {
                            air_temperature: Some(21.5),
                            relative_humidity: None,
                            wind_speed: None,
                        },
                        reading_count: 4,
                    },
                    is_anomalous: false,
                    score: Some(-0.25),
                },
                LabeledBucket {
                    bucket: HourlyBucket {
                        hour_start: hour(14),
                        output: 300.0,
                        covariates: Covariates::default(),
                        reading_count: 5,
                    },
                    is_anomalous: true,
                    score: Some(4.5),
                },
            ],
            summary: Summary {
                stats: OutputStats::default(),
                narrative: "Avg output: 225.00 kWh.".to_owned(),
            },
            dropped_rows: 0,
            retained_rows: 9,
        }
    }

    #[test]
    fn test_write_labeled_csv_rows() {
        let mut buf = Vec::new();
        write_labeled_csv(&sample_result(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "hour_start,output_kwh,air_temperature,relative_humidity,wind_speed,is_anomalous,score,summary"
        );
        assert_eq!(
            lines[1],
            "2023-01-06 13:00:00,150,21.5,,,false,-0.25,Avg output: 225.00 kWh."
        );
        assert_eq!(
            lines[2],
            "2023-01-06 14:00:00,300,,,,true,4.5,Avg output: 225.00 kWh."
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_outputs_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = write_outputs(&sample_result(), &out).unwrap();

        assert_eq!(
            std::fs::read_to_string(&paths.summary).unwrap(),
            "Avg output: 225.00 kWh."
        );
        let csv = std::fs::read_to_string(&paths.labeled_csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert_eq!(paths.labeled_csv.file_name().unwrap(), LABELED_CSV_FILE);
    }
}
