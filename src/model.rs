use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CrossingError, Result};

/// Source timestamps look like `2024-11-23 07:41:12 UTC`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, serde::Deserialize)]
//1.	IMO			IMO number of the vessel
//2.	NAME			Name of the vessel
//3.	TIMESTAMP		Position timestamp, format: 2024-11-23 07:41:12 UTC
//4.	LATITUDE		Latitude of the position report (e.g. 66.512345)
//5.	LONGITUDE		Longitude of the position report (e.g. 12.954321)
//6.	SPEED			Speed over ground in knots
// example: 9107796,POLARLYS,2024-11-23 07:41:12 UTC,66.51234,12.95432,15.1
pub struct RawReport {
    #[serde(rename = "IMO")]
    pub imo: u32,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "TIMESTAMP")]
    pub timestamp: String,
    #[serde(rename = "LATITUDE")]
    pub latitude: f64,
    #[serde(rename = "LONGITUDE")]
    pub longitude: f64,
    #[serde(rename = "SPEED")]
    pub speed: f64,
}

impl RawReport {
    /// Parse the timestamp and range-check the numeric fields. `row`
    /// identifies the record in diagnostics.
    pub fn into_report(self, row: usize) -> Result<Report> {
        let timestamp = parse_timestamp(&self.timestamp, row)?;
        check_field(row, "latitude", self.latitude, -90.0..=90.0)?;
        check_field(row, "longitude", self.longitude, -180.0..=180.0)?;
        check_field(row, "speed", self.speed, 0.0..=f64::MAX)?;
        Ok(Report {
            imo: self.imo,
            name: self.name,
            timestamp,
            latitude: self.latitude,
            longitude: self.longitude,
            speed: self.speed,
        })
    }
}

// NaN and infinities fail the range test too
fn check_field(
    row: usize,
    field: &'static str,
    value: f64,
    range: std::ops::RangeInclusive<f64>,
) -> Result<()> {
    if !range.contains(&value) {
        return Err(CrossingError::InvalidReport { row, field, value });
    }
    Ok(())
}

pub fn parse_timestamp(value: &str, row: usize) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|source| CrossingError::MalformedTimestamp {
            row,
            value: value.to_string(),
            source,
        })
}

/// One position report for one vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub imo: u32,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// degrees, -90..=90
    pub latitude: f64,
    /// degrees, -180..=180
    pub longitude: f64,
    /// knots
    pub speed: f64,
}

/// A report that passed the window filter, keyed by its local time.
#[derive(Debug, Clone)]
pub struct WindowedReport<'a> {
    pub local: DateTime<Tz>,
    pub report: &'a Report,
}

/// First pass over a window: distance travelled so far.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedRecord {
    pub local: DateTime<Tz>,
    pub report: Report,
    pub cumulative_nm: f64,
    /// `None` for the first record and when no time elapsed since the previous one.
    pub speed_by_distance: Option<f64>,
}

/// Fully annotated window record.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub local: DateTime<Tz>,
    pub report: Report,
    pub cumulative_nm: f64,
    pub speed_by_distance: Option<f64>,
    pub remaining_nm: f64,
    /// Distance still to go to the crossing: positive before it, negative
    /// after. `None` when the window holds no crossing.
    pub circle_nm: Option<f64>,
}

/// Where and when a vessel crossed the reference latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingEstimate {
    pub imo: u32,
    pub south: Report,
    pub north: Report,
    /// Position of the reference latitude between south and north, 0..=1.
    pub fraction: f64,
    pub longitude: f64,
    pub time_by_latitude: DateTime<Utc>,
    pub time_by_speed: DateTime<Utc>,
    /// Only set when estimated over accumulated records.
    pub cumulative_nm: Option<f64>,
}
