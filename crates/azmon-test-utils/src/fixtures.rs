//! Canned data for discovery and sampling tests

use azmon_common::{DataPoint, DimensionName, DimensionValue, TimeSeries};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Region/Status combinations: east/ok, west/ok, west/fail.
///
/// `Status` depends on `Region`: `fail` only exists in `west`.
pub fn region_status_rows() -> Vec<Vec<(&'static str, &'static str)>> {
    vec![
        vec![("Region", "east"), ("Status", "ok")],
        vec![("Region", "west"), ("Status", "ok")],
        vec![("Region", "west"), ("Status", "fail")],
    ]
}

/// Full cross product of the given per-dimension values.
///
/// # Example
///
/// ```
/// use azmon_test_utils::fixtures::cross_product;
///
/// let rows = cross_product(vec![("A", vec!["1", "2"]), ("B", vec!["x", "y", "z"])]);
/// assert_eq!(rows.len(), 6);
/// ```
pub fn cross_product(
    axes: Vec<(&'static str, Vec<&'static str>)>,
) -> Vec<Vec<(&'static str, &'static str)>> {
    axes.into_iter()
        .fold(vec![Vec::new()], |rows, (name, values)| {
            rows.iter()
                .flat_map(|row| {
                    values.iter().map(move |value| {
                        let mut next = row.clone();
                        next.push((name, *value));
                        next
                    })
                })
                .collect()
        })
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A data point carrying only an average
pub fn point(average: f64) -> DataPoint {
    DataPoint {
        average: Some(average),
        ..Default::default()
    }
}

/// A series with hourly timestamps assigned to `points` in order
pub fn series(points: Vec<DataPoint>) -> TimeSeries {
    let start = base_time();
    let points = points
        .into_iter()
        .enumerate()
        .map(|(i, p)| DataPoint {
            timestamp: Some(start + Duration::hours(i as i64)),
            ..p
        })
        .collect();
    TimeSeries {
        metadata: Vec::new(),
        points,
    }
}

/// A series tagged with dimension metadata
pub fn labelled_series(metadata: &[(&str, &str)], points: Vec<DataPoint>) -> TimeSeries {
    TimeSeries {
        metadata: metadata
            .iter()
            .map(|(n, v)| (DimensionName::from(*n), DimensionValue::from(*v)))
            .collect(),
        ..series(points)
    }
}
