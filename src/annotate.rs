//! Remaining and circle distances for every record of a window.

use crate::accumulate::Accumulated;
use crate::model::AnnotatedRecord;

/// Distance left to the end of the window for each record.
pub fn annotate_remaining(accumulated: &Accumulated) -> Vec<AnnotatedRecord> {
    accumulated
        .records
        .iter()
        .map(|record| AnnotatedRecord {
            local: record.local,
            report: record.report.clone(),
            cumulative_nm: record.cumulative_nm,
            speed_by_distance: record.speed_by_distance,
            remaining_nm: accumulated.total_nm - record.cumulative_nm,
            circle_nm: None,
        })
        .collect()
}

/// Signed distance from each record to the crossing, given the cumulative
/// distance at which the crossing happened.
pub fn annotate_circle(records: &[AnnotatedRecord], crossing_nm: f64) -> Vec<AnnotatedRecord> {
    records
        .iter()
        .map(|record| AnnotatedRecord {
            circle_nm: Some(crossing_nm - record.cumulative_nm),
            ..record.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccumulatedRecord, Report};
    use chrono::{Duration, TimeZone, Utc};

    fn accumulated(cumulative: &[f64]) -> Accumulated {
        let t0 = Utc.with_ymd_and_hms(2024, 11, 23, 6, 0, 0).unwrap();
        let records = cumulative
            .iter()
            .enumerate()
            .map(|(i, &nm)| {
                let timestamp = t0 + Duration::minutes(i as i64);
                AccumulatedRecord {
                    local: timestamp.with_timezone(&chrono_tz::Europe::Oslo),
                    report: Report {
                        imo: 9107796,
                        name: "POLARLYS".to_string(),
                        timestamp,
                        latitude: 66.5,
                        longitude: 12.0,
                        speed: 15.0,
                    },
                    cumulative_nm: nm,
                    speed_by_distance: None,
                }
            })
            .collect();
        Accumulated {
            records,
            total_nm: *cumulative.last().unwrap_or(&0.0),
        }
    }

    #[test]
    fn test_remaining_complements_cumulative() {
        let acc = accumulated(&[0.0, 0.25, 1.7, 3.125]);
        let records = annotate_remaining(&acc);

        for record in &records {
            assert!((record.remaining_nm + record.cumulative_nm - acc.total_nm).abs() < 1e-6);
            assert_eq!(record.circle_nm, None);
        }
        assert_eq!(records.last().unwrap().remaining_nm, 0.0);
    }

    #[test]
    fn test_circle_changes_sign_at_crossing() {
        let records = annotate_remaining(&accumulated(&[0.0, 1.0, 2.0, 3.0]));
        let circled = annotate_circle(&records, 1.5);

        let circle: Vec<f64> = circled.iter().map(|r| r.circle_nm.unwrap()).collect();
        assert_eq!(circle, vec![1.5, 0.5, -0.5, -1.5]);
        // earlier pass is left untouched
        assert!(records.iter().all(|r| r.circle_nm.is_none()));
        assert_eq!(circled[2].remaining_nm, records[2].remaining_nm);
    }
}
