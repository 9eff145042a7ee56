//! Per-vessel, deduplicated, time-windowed view over the report sequence.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use log::debug;

use crate::error::{CrossingError, Result};
use crate::model::{Report, WindowedReport};

/// Window bounds are written as `2024-11-23 06:05:00` in the window's zone.
pub const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_zone(zone: &str) -> Result<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| CrossingError::UnknownTimeZone(zone.to_string()))
}

/// Inclusive local-time window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub zone: Tz,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    pub fn new(zone: Tz, start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        Ok(Self {
            zone,
            start: localize(zone, start)?,
            end: localize(zone, end)?,
        })
    }

    /// Parse a zone identifier and two local instants.
    pub fn parse(zone: &str, start: &str, end: &str) -> Result<Self> {
        let zone = parse_zone(zone)?;
        Self::new(zone, parse_local(start)?, parse_local(end)?)
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

fn parse_local(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), WINDOW_FORMAT).map_err(|e| {
        CrossingError::InvalidWindow {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Attach a zone to a wall-clock instant. A repeated hour resolves to its
/// earlier occurrence; a skipped hour is rejected.
fn localize(zone: Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(CrossingError::InvalidWindow {
            value: naive.format(WINDOW_FORMAT).to_string(),
            reason: format!("does not exist in {}", zone.name()),
        }),
    }
}

/// Reports for `vessel` inside `window`, in source order.
///
/// A report whose timestamp equals the previous report for the same vessel
/// is dropped. The comparison is against the previous report of the vessel
/// in the source, whether or not that one fell inside the window.
///
/// The input must already be in ascending time order.
pub fn record_stream<'a>(
    reports: &'a [Report],
    vessel: u32,
    window: &TimeWindow,
) -> Vec<WindowedReport<'a>> {
    let mut previous: Option<&Report> = None;
    let mut out = Vec::new();

    for report in reports.iter().filter(|r| r.imo == vessel) {
        let duplicate = previous.map_or(false, |p| p.timestamp == report.timestamp);
        previous = Some(report);
        if duplicate {
            debug!("{}: dropping duplicate report at {}", vessel, report.timestamp);
            continue;
        }

        let local = report.timestamp.with_timezone(&window.zone);
        if !window.contains(&local) {
            continue;
        }

        out.push(WindowedReport { local, report });
    }

    debug_assert!(
        out.windows(2).all(|w| w[0].report.timestamp <= w[1].report.timestamp),
        "reports for vessel {} are not in time order",
        vessel
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const VESSEL: u32 = 9107796;

    fn report(imo: u32, utc: &str, lat: f64) -> Report {
        Report {
            imo,
            name: "POLARLYS".to_string(),
            timestamp: Utc
                .from_utc_datetime(&NaiveDateTime::parse_from_str(utc, WINDOW_FORMAT).unwrap()),
            latitude: lat,
            longitude: 12.0,
            speed: 15.0,
        }
    }

    fn oslo_window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse("Europe/Oslo", start, end).unwrap()
    }

    #[test]
    fn test_window_endpoints_are_inclusive() {
        // Oslo is UTC+1 in November
        let reports = vec![
            report(VESSEL, "2024-11-23 04:59:00", 66.0),
            report(VESSEL, "2024-11-23 05:00:00", 66.1),
            report(VESSEL, "2024-11-23 07:00:00", 66.2),
            report(VESSEL, "2024-11-23 09:10:00", 66.3),
            report(VESSEL, "2024-11-23 09:11:00", 66.4),
        ];
        let window = oslo_window("2024-11-23 06:00:00", "2024-11-23 10:10:00");

        let stream = record_stream(&reports, VESSEL, &window);

        let lats: Vec<f64> = stream.iter().map(|w| w.report.latitude).collect();
        assert_eq!(lats, vec![66.1, 66.2, 66.3]);
        assert_eq!(stream[0].local.to_rfc3339(), "2024-11-23T06:00:00+01:00");
    }

    #[test]
    fn test_duplicate_timestamps_are_dropped() {
        let reports = vec![
            report(VESSEL, "2024-11-23 06:00:00", 66.1),
            report(VESSEL, "2024-11-23 06:00:00", 66.2),
            report(VESSEL, "2024-11-23 06:01:00", 66.3),
        ];
        let window = oslo_window("2024-11-23 00:00:00", "2024-11-23 23:59:59");

        let stream = record_stream(&reports, VESSEL, &window);

        let lats: Vec<f64> = stream.iter().map(|w| w.report.latitude).collect();
        assert_eq!(lats, vec![66.1, 66.3]);
    }

    #[test]
    fn test_runs_of_duplicates_keep_the_first() {
        let reports = vec![
            report(VESSEL, "2024-11-23 06:00:00", 66.0),
            report(VESSEL, "2024-11-23 06:00:00", 66.1),
            report(VESSEL, "2024-11-23 06:00:00", 66.2),
            report(VESSEL, "2024-11-23 06:05:00", 66.3),
        ];
        let window = oslo_window("2024-11-23 00:00:00", "2024-11-23 23:59:59");

        let stream = record_stream(&reports, VESSEL, &window);

        let lats: Vec<f64> = stream.iter().map(|w| w.report.latitude).collect();
        assert_eq!(lats, vec![66.0, 66.3]);
    }

    #[test]
    fn test_other_vessels_do_not_break_dedup() {
        let reports = vec![
            report(VESSEL, "2024-11-23 06:00:00", 66.1),
            report(1234567, "2024-11-23 06:00:00", 60.0),
            report(VESSEL, "2024-11-23 06:00:00", 66.2),
        ];
        let window = oslo_window("2024-11-23 00:00:00", "2024-11-23 23:59:59");

        let stream = record_stream(&reports, VESSEL, &window);

        assert_eq!(stream.len(), 1);
        assert_eq!(stream[0].report.imo, VESSEL);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let reports = vec![report(VESSEL, "2024-11-23 06:00:00", 66.1)];
        let window = oslo_window("2024-11-23 10:00:00", "2024-11-23 06:00:00");
        assert!(record_stream(&reports, VESSEL, &window).is_empty());
    }

    #[test]
    fn test_unknown_vessel_is_empty() {
        let reports = vec![report(VESSEL, "2024-11-23 06:00:00", 66.1)];
        let window = oslo_window("2024-11-23 00:00:00", "2024-11-23 23:59:59");
        assert!(record_stream(&reports, 1, &window).is_empty());
    }

    #[test]
    fn test_bad_zone_and_instant() {
        assert!(matches!(
            TimeWindow::parse("Europe/Atlantis", "2024-11-23 00:00:00", "2024-11-23 01:00:00"),
            Err(CrossingError::UnknownTimeZone(_))
        ));
        assert!(matches!(
            TimeWindow::parse("Europe/Oslo", "yesterday", "2024-11-23 01:00:00"),
            Err(CrossingError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_skipped_local_hour_is_rejected() {
        // clocks jump from 02:00 to 03:00 on 2024-03-31 in Oslo
        assert!(TimeWindow::parse("Europe/Oslo", "2024-03-31 02:30:00", "2024-03-31 04:00:00").is_err());
    }

    #[test]
    fn test_repeated_local_hour_takes_earlier() {
        let window =
            TimeWindow::parse("Europe/Oslo", "2024-10-27 02:30:00", "2024-10-27 04:00:00").unwrap();
        assert_eq!(window.start.to_rfc3339(), "2024-10-27T02:30:00+02:00");
    }
}
