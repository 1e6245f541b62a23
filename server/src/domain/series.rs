//! Price series aggregation
//!
//! Pure, single-pass bucketing of raw price observations into daily or
//! hourly averages. Rows with a missing price or an unparseable timestamp
//! are excluded entirely; they contribute to no bucket.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::constants::DEFAULT_SERIES_WINDOW_DAYS;
use crate::data::types::PriceObservationRow;

/// Bucketing granularity (unknown strings fall back to `Daily`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Hourly,
}

impl FromStr for Granularity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Granularity::Daily),
            "hourly" => Ok(Granularity::Hourly),
            _ => Err(()),
        }
    }
}

/// Inclusive time window over observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Window {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Default window: the trailing 30 days ending now
    pub fn default_trailing() -> Self {
        let to = Utc::now();
        let from = to - chrono::Duration::days(DEFAULT_SERIES_WINDOW_DAYS);
        Self { from, to }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.from && ts <= self.to
    }
}

/// One aggregated bucket of the price series
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AggregatedPricePoint {
    /// Bucket key: `YYYY-MM-DD` (daily) or `YYYY-MM-DDTHH` (hourly), UTC
    pub bucket: String,
    pub average_price: f64,
    pub sample_count: u32,
}

/// Parse an observation timestamp.
///
/// Accepts RFC 3339 (with offset) and bare `YYYY-MM-DDTHH:MM:SS[.f]`
/// strings, which are taken as UTC. Anything else is rejected.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

fn bucket_key(ts: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => ts.format("%Y-%m-%d").to_string(),
        Granularity::Hourly => ts.format("%Y-%m-%dT%H").to_string(),
    }
}

/// Aggregate observations into bucketed price averages.
///
/// Single pass over the input; output is ascending by bucket key. The
/// average is the arithmetic mean of `your_price` over the rows that
/// landed in the bucket. Idempotent and side-effect free.
pub fn aggregate(
    observations: &[PriceObservationRow],
    window: &Window,
    granularity: Granularity,
) -> Vec<AggregatedPricePoint> {
    let mut buckets: BTreeMap<String, (f64, u32)> = BTreeMap::new();

    for obs in observations {
        let Some(price) = obs.your_price else {
            continue;
        };
        if !price.is_finite() {
            continue;
        }
        let Some(ts) = parse_timestamp(&obs.timestamp) else {
            continue;
        };
        if !window.contains(ts) {
            continue;
        }

        let entry = buckets.entry(bucket_key(ts, granularity)).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(bucket, (sum, count))| AggregatedPricePoint {
            bucket,
            average_price: sum / count as f64,
            sample_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs(price: Option<f64>, ts: &str) -> PriceObservationRow {
        PriceObservationRow {
            product_id: "SKU-1".to_string(),
            name: "Widget".to_string(),
            your_price: price,
            competitor: None,
            competitor_price: None,
            change_pct: None,
            timestamp: ts.to_string(),
        }
    }

    fn wide_window() -> Window {
        Window::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn test_daily_mean_of_two_observations() {
        let rows = vec![
            obs(Some(10.0), "2025-06-01T08:00:00Z"),
            obs(Some(20.0), "2025-06-01T20:00:00Z"),
        ];
        let points = aggregate(&rows, &wide_window(), Granularity::Daily);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bucket, "2025-06-01");
        assert_eq!(points[0].average_price, 15.0);
        assert_eq!(points[0].sample_count, 2);
    }

    #[test]
    fn test_hourly_buckets() {
        let rows = vec![
            obs(Some(10.0), "2025-06-01T08:15:00Z"),
            obs(Some(20.0), "2025-06-01T08:45:00Z"),
            obs(Some(30.0), "2025-06-01T09:05:00Z"),
        ];
        let points = aggregate(&rows, &wide_window(), Granularity::Hourly);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket, "2025-06-01T08");
        assert_eq!(points[0].average_price, 15.0);
        assert_eq!(points[1].bucket, "2025-06-01T09");
        assert_eq!(points[1].sample_count, 1);
    }

    #[test]
    fn test_sample_count_conservation() {
        // Every valid in-window row lands in exactly one bucket
        let rows: Vec<_> = (0..=23)
            .map(|h| obs(Some(10.0), &format!("2025-06-01T{h:02}:00:00Z")))
            .collect();
        let points = aggregate(&rows, &wide_window(), Granularity::Hourly);
        let total: u32 = points.iter().map(|p| p.sample_count).sum();
        assert_eq!(total as usize, rows.len());
    }

    #[test]
    fn test_excludes_missing_price_and_bad_timestamp() {
        let rows = vec![
            obs(Some(10.0), "2025-06-01T08:00:00Z"),
            obs(None, "2025-06-01T09:00:00Z"),
            obs(Some(f64::NAN), "2025-06-01T10:00:00Z"),
            obs(Some(20.0), "not-a-timestamp"),
        ];
        let points = aggregate(&rows, &wide_window(), Granularity::Daily);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].sample_count, 1);
        assert_eq!(points[0].average_price, 10.0);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let window = Window::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
        );
        let rows = vec![
            obs(Some(10.0), "2025-06-01T00:00:00Z"),
            obs(Some(20.0), "2025-06-02T00:00:00Z"),
            obs(Some(30.0), "2025-06-02T00:00:01Z"),
        ];
        let points = aggregate(&rows, &window, Granularity::Daily);
        let total: u32 = points.iter().map(|p| p.sample_count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_empty_input() {
        let points = aggregate(&[], &wide_window(), Granularity::Daily);
        assert!(points.is_empty());
    }

    #[test]
    fn test_output_ascending_and_idempotent() {
        let rows = vec![
            obs(Some(30.0), "2025-06-03T00:00:00Z"),
            obs(Some(10.0), "2025-06-01T00:00:00Z"),
            obs(Some(20.0), "2025-06-02T00:00:00Z"),
        ];
        let first = aggregate(&rows, &wide_window(), Granularity::Daily);
        let second = aggregate(&rows, &wide_window(), Granularity::Daily);
        assert_eq!(first, second);

        let keys: Vec<&str> = first.iter().map(|p| p.bucket.as_str()).collect();
        assert_eq!(keys, vec!["2025-06-01", "2025-06-02", "2025-06-03"]);
    }

    #[test]
    fn test_offset_timestamps_normalized_to_utc() {
        // 23:30 at +02:00 is 21:30 UTC, so it stays on the same UTC day
        let rows = vec![obs(Some(10.0), "2025-06-01T23:30:00+02:00")];
        let points = aggregate(&rows, &wide_window(), Granularity::Daily);
        assert_eq!(points[0].bucket, "2025-06-01");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-06-01T08:00:00Z").is_some());
        assert!(parse_timestamp("2025-06-01T08:00:00+02:00").is_some());
        assert!(parse_timestamp("2025-06-01T08:00:00").is_some());
        assert!(parse_timestamp("2025-06-01T08:00:00.123").is_some());
        assert!(parse_timestamp("june first").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("daily".parse::<Granularity>(), Ok(Granularity::Daily));
        assert_eq!("hourly".parse::<Granularity>(), Ok(Granularity::Hourly));
        assert!("weekly".parse::<Granularity>().is_err());
    }
}
