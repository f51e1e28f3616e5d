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

//! SVG charts over a labeled hourly series.

use chrono::{DateTime, TimeDelta, Utc};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use solarlens_types::{AnalysisResult, Covariate, LabeledBucket};
use std::ops::Range;
use thiserror::Error;

const BACKGROUND: RGBColor = RGBColor(26, 26, 26);
const LABEL_COLOR: RGBColor = RGBColor(153, 153, 153);
const AXIS_COLOR: RGBColor = RGBColor(58, 58, 58);
const OUTPUT_COLOR: RGBColor = RGBColor(33, 150, 243); // Blue
const COVARIATE_COLOR: RGBColor = RGBColor(255, 152, 0); // Orange
const HUMIDITY_COLOR: RGBColor = RGBColor(76, 175, 80); // Green
const ANOMALY_COLOR: RGBColor = RGBColor(229, 57, 53); // Red

const OUTPUT_LABEL: &str = "Solar Generation (kWh)";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no hourly data to plot")]
    NoData,

    #[error("chart drawing failed: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Draw(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Output over time, anomalous hours marked in red
    Line,
    /// Covariate on x, output on y
    Scatter { x: Covariate },
    /// Output on the left axis, a covariate on the right one
    DualAxis { secondary: Covariate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    #[must_use]
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            width: 1000,
            height: 450,
        }
    }
}

/// Titled SVG document ready to embed into a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub title: String,
    pub svg: String,
}

/// Render one chart over the labeled hourly series as an SVG document.
///
/// # Errors
/// [`ChartError::NoData`] when there is nothing to plot for the requested
/// kind, [`ChartError::Draw`] when the backend fails.
pub fn render_chart(buckets: &[LabeledBucket], spec: &ChartSpec) -> Result<String, ChartError> {
    if buckets.is_empty() {
        return Err(ChartError::NoData);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (spec.width, spec.height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        match spec.kind {
            ChartKind::Line => draw_time_series(&root, buckets, &spec.title)?,
            ChartKind::Scatter { x } => draw_scatter(&root, buckets, x, &spec.title)?,
            ChartKind::DualAxis { secondary } => {
                draw_dual_axis(&root, buckets, secondary, &spec.title)?;
            }
        }

        root.present()?;
    } // root is dropped here, releasing the borrow on svg

    Ok(svg)
}

/// Time series plus one chart per covariate present in the data
///
/// # Errors
/// Fails like [`render_chart`] for any of the charts.
pub fn dashboard_charts(result: &AnalysisResult) -> Result<Vec<RenderedChart>, ChartError> {
    let buckets = &result.buckets;
    let mut specs = vec![ChartSpec::new(
        ChartKind::Line,
        "Solar Energy Generation Over Time",
    )];

    for covariate in Covariate::ALL {
        if !buckets
            .iter()
            .any(|b| b.bucket.covariates.get(covariate).is_some())
        {
            continue;
        }
        specs.push(match covariate {
            Covariate::AirTemperature => ChartSpec::new(
                ChartKind::Scatter { x: covariate },
                "Solar Generation vs Air Temperature",
            ),
            Covariate::RelativeHumidity => ChartSpec::new(
                ChartKind::Scatter { x: covariate },
                "Solar Generation vs Relative Humidity",
            ),
            Covariate::WindSpeed => ChartSpec::new(
                ChartKind::DualAxis {
                    secondary: covariate,
                },
                "Solar Generation vs Wind Speed Over Time",
            ),
        });
    }

    specs
        .into_iter()
        .map(|spec| {
            let svg = render_chart(buckets, &spec)?;
            Ok(RenderedChart {
                title: spec.title,
                svg,
            })
        })
        .collect()
}

fn time_range(buckets: &[LabeledBucket]) -> Result<Range<DateTime<Utc>>, ChartError> {
    let (Some(first), Some(last)) = (buckets.first(), buckets.last()) else {
        return Err(ChartError::NoData);
    };
    // Extend by one hour so a single bucket still spans a range
    Ok(first.bucket.hour_start.and_utc()..last.bucket.hour_start.and_utc() + TimeDelta::hours(1))
}

/// Value range with 10% padding on both sides
fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values.into_iter().fold(None, |acc: Option<(f64, f64)>, v| {
        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
    })?;

    let pad = if max > min {
        (max - min) * 0.1
    } else {
        (max.abs() * 0.1).max(1.0)
    };
    Some((min - pad)..(max + pad))
}

fn draw_time_series(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    buckets: &[LabeledBucket],
    title: &str,
) -> Result<(), ChartError> {
    let x_range = time_range(buckets)?;
    let y_range = padded_range(buckets.iter().map(|b| b.bucket.output)).ok_or(ChartError::NoData)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20, &WHITE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc(OUTPUT_LABEL)
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|dt| dt.format("%m-%d %H:%M").to_string())
        .label_style(("sans-serif", 12, &LABEL_COLOR))
        .axis_style(AXIS_COLOR)
        .draw()?;

    chart.draw_series(LineSeries::new(
        buckets
            .iter()
            .map(|b| (b.bucket.hour_start.and_utc(), b.bucket.output)),
        OUTPUT_COLOR.stroke_width(2),
    ))?;

    chart.draw_series(buckets.iter().filter(|b| b.is_anomalous).map(|b| {
        Circle::new(
            (b.bucket.hour_start.and_utc(), b.bucket.output),
            5,
            ANOMALY_COLOR.filled(),
        )
    }))?;

    Ok(())
}

fn draw_scatter(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    buckets: &[LabeledBucket],
    x: Covariate,
    title: &str,
) -> Result<(), ChartError> {
    // Hours without the covariate are skipped
    let points: Vec<(f64, f64, bool)> = buckets
        .iter()
        .filter_map(|b| {
            b.bucket
                .covariates
                .get(x)
                .map(|value| (value, b.bucket.output, b.is_anomalous))
        })
        .collect();

    let x_range = padded_range(points.iter().map(|p| p.0)).ok_or(ChartError::NoData)?;
    let y_range = padded_range(points.iter().map(|p| p.1)).ok_or(ChartError::NoData)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20, &WHITE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x.label())
        .y_desc(OUTPUT_LABEL)
        .label_style(("sans-serif", 12, &LABEL_COLOR))
        .axis_style(AXIS_COLOR)
        .draw()?;

    let base_color = match x {
        Covariate::RelativeHumidity => HUMIDITY_COLOR,
        Covariate::AirTemperature | Covariate::WindSpeed => COVARIATE_COLOR,
    };
    chart.draw_series(points.iter().map(|&(cx, cy, anomalous)| {
        let color = if anomalous { ANOMALY_COLOR } else { base_color };
        Circle::new((cx, cy), 4, color.filled())
    }))?;

    Ok(())
}

fn draw_dual_axis(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    buckets: &[LabeledBucket],
    secondary: Covariate,
    title: &str,
) -> Result<(), ChartError> {
    let x_range = time_range(buckets)?;
    let y_range = padded_range(buckets.iter().map(|b| b.bucket.output)).ok_or(ChartError::NoData)?;

    let secondary_points: Vec<(DateTime<Utc>, f64)> = buckets
        .iter()
        .filter_map(|b| {
            b.bucket
                .covariates
                .get(secondary)
                .map(|value| (b.bucket.hour_start.and_utc(), value))
        })
        .collect();
    let secondary_range =
        padded_range(secondary_points.iter().map(|&(_, v)| v)).ok_or(ChartError::NoData)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20, &WHITE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)?
        .set_secondary_coord(x_range, secondary_range);

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc(OUTPUT_LABEL)
        .x_labels(8)
        .x_label_formatter(&|dt| dt.format("%m-%d %H:%M").to_string())
        .label_style(("sans-serif", 12, &LABEL_COLOR))
        .axis_style(AXIS_COLOR)
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc(secondary.label())
        .label_style(("sans-serif", 12, &LABEL_COLOR))
        .axis_style(AXIS_COLOR)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            buckets
                .iter()
                .map(|b| (b.bucket.hour_start.and_utc(), b.bucket.output)),
            OUTPUT_COLOR.stroke_width(2),
        ))?
        .label(OUTPUT_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], OUTPUT_COLOR));

    chart
        .draw_secondary_series(LineSeries::new(
            secondary_points,
            COVARIATE_COLOR.stroke_width(2),
        ))?
        .label(secondary.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COVARIATE_COLOR));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BACKGROUND)
        .border_style(AXIS_COLOR)
        .label_font(("sans-serif", 12, &LABEL_COLOR))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use solarlens_types::{Covariates, HourlyBucket, OutputStats, Strategy, Summary};

    fn bucket(hour: u32, output: f64, covariates: Covariates, is_anomalous: bool) -> LabeledBucket {
        LabeledBucket {
            bucket: HourlyBucket {
                hour_start: NaiveDate::from_ymd_opt(2023, 1, 1)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
                output,
                covariates,
                reading_count: 1,
            },
            is_anomalous,
            score: None,
        }
    }

    fn series(covariates: Covariates) -> Vec<LabeledBucket> {
        (0..6)
            .map(|h| bucket(h, 100.0 + f64::from(h), covariates, h == 3))
            .collect()
    }

    fn result(buckets: Vec<LabeledBucket>) -> AnalysisResult {
        AnalysisResult {
            strategy: Strategy::Zscore,
            buckets,
            summary: Summary {
                stats: OutputStats::default(),
                narrative: String::new(),
            },
            dropped_rows: 0,
            retained_rows: 6,
        }
    }

    #[test]
    fn test_line_chart_marks_anomalies() {
        let spec = ChartSpec::new(ChartKind::Line, "Output");
        let svg = render_chart(&series(Covariates::default()), &spec).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_single_bucket_renders() {
        let spec = ChartSpec::new(ChartKind::Line, "Output");
        let svg = render_chart(&[bucket(0, 5.0, Covariates::default(), false)], &spec).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_empty_input_has_no_data() {
        let spec = ChartSpec::new(ChartKind::Line, "Output");
        assert!(matches!(render_chart(&[], &spec), Err(ChartError::NoData)));
    }

    #[test]
    fn test_scatter_without_covariate_has_no_data() {
        let spec = ChartSpec::new(
            ChartKind::Scatter {
                x: Covariate::AirTemperature,
            },
            "Temperature",
        );
        assert!(matches!(
            render_chart(&series(Covariates::default()), &spec),
            Err(ChartError::NoData)
        ));
    }

    #[test]
    fn test_dual_axis_renders() {
        let covariates = Covariates {
            wind_speed: Some(3.5),
            ..Covariates::default()
        };
        let spec = ChartSpec::new(
            ChartKind::DualAxis {
                secondary: Covariate::WindSpeed,
            },
            "Wind",
        );
        let svg = render_chart(&series(covariates), &spec).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_dashboard_charts_follow_present_covariates() {
        let charts = dashboard_charts(&result(series(Covariates::default()))).unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].title, "Solar Energy Generation Over Time");

        let covariates = Covariates {
            air_temperature: Some(12.0),
            relative_humidity: Some(60.0),
            wind_speed: Some(2.0),
        };
        let charts = dashboard_charts(&result(series(covariates))).unwrap();
        let titles: Vec<_> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Solar Energy Generation Over Time",
                "Solar Generation vs Air Temperature",
                "Solar Generation vs Relative Humidity",
                "Solar Generation vs Wind Speed Over Time",
            ]
        );
        assert!(charts.iter().all(|c| c.svg.contains("<svg")));
    }
}
