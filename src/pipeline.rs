//! Whole-run operations over a materialized report sequence.

use chrono::Duration;
use chrono_tz::Tz;
use log::{info, warn};

use crate::accumulate::accumulate;
use crate::annotate::{annotate_circle, annotate_remaining};
use crate::crossing::{default_step, detect, Estimator};
use crate::error::Result;
use crate::latitude::ReferenceLatitude;
use crate::model::{AnnotatedRecord, CrossingEstimate, Report};
use crate::window::{record_stream, TimeWindow};

/// Settings for scanning every vessel for crossings.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingConfig {
    pub reference: ReferenceLatitude,
    /// Zone used when printing crossing times.
    pub display_zone: Tz,
    pub step: Duration,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceLatitude::default(),
            display_zone: chrono_tz::UTC,
            step: default_step(),
        }
    }
}

/// Settings for annotating one vessel's window.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    pub vessel: u32,
    pub window: TimeWindow,
    pub reference: ReferenceLatitude,
    pub step: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vessel {
    pub imo: u32,
    pub name: String,
}

/// Every vessel in the sequence, in order of first appearance.
pub fn vessels(reports: &[Report]) -> Vec<Vessel> {
    let mut found: Vec<Vessel> = Vec::new();
    for report in reports {
        if !found.iter().any(|v| v.imo == report.imo) {
            found.push(Vessel {
                imo: report.imo,
                name: report.name.clone(),
            });
        }
    }
    found
}

#[derive(Debug, Clone, PartialEq)]
pub struct VesselCrossings {
    pub vessel: Vessel,
    pub crossings: Vec<CrossingEstimate>,
}

/// Find and time every crossing of every vessel over the raw reports.
pub fn extract_crossings(reports: &[Report], config: &CrossingConfig) -> Result<Vec<VesselCrossings>> {
    let estimator = Estimator::new(config.reference).with_step(config.step)?;
    let vessels = vessels(reports);
    info!("found {} vessels", vessels.len());

    vessels
        .into_iter()
        .map(|vessel| -> Result<VesselCrossings> {
            let track = reports.iter().filter(|r| r.imo == vessel.imo);
            let crossings = detect(track, &config.reference)
                .map(|bracket| estimator.estimate(&bracket))
                .collect::<Result<Vec<_>>>()?;
            if crossings.is_empty() {
                warn!("{} ({}): no crossing of {}", vessel.imo, vessel.name, config.reference);
            } else {
                info!("{} ({}): {} crossing(s)", vessel.imo, vessel.name, crossings.len());
            }
            Ok(VesselCrossings { vessel, crossings })
        })
        .collect()
}

/// One vessel's window, fully annotated.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselExtract {
    pub records: Vec<AnnotatedRecord>,
    pub total_nm: f64,
    /// First crossing inside the window, if any.
    pub crossing: Option<CrossingEstimate>,
}

/// Window one vessel, accumulate distance, locate the first crossing and
/// annotate every record with remaining and circle distance.
pub fn extract_vessel(reports: &[Report], config: &ExtractConfig) -> Result<VesselExtract> {
    let estimator = Estimator::new(config.reference).with_step(config.step)?;

    let stream = record_stream(reports, config.vessel, &config.window);
    let accumulated = accumulate(&stream);
    let total_nm = accumulated.total_nm;
    info!(
        "{}: {} records in window, total distance travelled {:.1} NM",
        config.vessel,
        accumulated.records.len(),
        total_nm
    );

    let remaining = annotate_remaining(&accumulated);

    let crossing = detect(&accumulated.records, &config.reference)
        .next()
        .map(|bracket| estimator.estimate(&bracket))
        .transpose()?;

    let records = match crossing.as_ref().and_then(|c| c.cumulative_nm) {
        Some(crossing_nm) => annotate_circle(&remaining, crossing_nm),
        None => {
            warn!("{}: window holds no crossing of {}", config.vessel, config.reference);
            remaining
        }
    };

    Ok(VesselExtract {
        records,
        total_nm,
        crossing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 23, 6, 0, 0).unwrap()
    }

    fn report(imo: u32, secs: i64, lat: f64, lon: f64) -> Report {
        Report {
            imo,
            name: format!("VESSEL {}", imo),
            timestamp: t0() + Duration::seconds(secs),
            latitude: lat,
            longitude: lon,
            speed: 15.0,
        }
    }

    fn arctic() -> ReferenceLatitude {
        ReferenceLatitude::from_decimal(66.55).unwrap()
    }

    #[test]
    fn test_vessels_in_first_seen_order() {
        let reports = vec![report(2, 0, 66.0, 12.0), report(1, 0, 66.0, 12.0), report(2, 60, 66.0, 12.0)];
        let imos: Vec<u32> = vessels(&reports).iter().map(|v| v.imo).collect();
        assert_eq!(imos, vec![2, 1]);
    }

    #[test]
    fn test_crossings_per_vessel() {
        let reports = vec![
            report(1, 0, 66.50, 12.0),
            report(2, 0, 67.00, 14.0),
            report(1, 600, 66.60, 12.0),
            report(2, 600, 67.10, 14.0),
        ];
        let config = CrossingConfig {
            reference: arctic(),
            ..CrossingConfig::default()
        };

        let found = extract_crossings(&reports, &config).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].vessel.imo, 1);
        assert_eq!(found[0].crossings.len(), 1);
        assert!(found[1].crossings.is_empty());
    }

    #[test]
    fn test_extract_vessel_annotates_window() {
        let reports = vec![
            report(1, 0, 66.40, 12.0),
            report(1, 600, 66.50, 12.0),
            report(1, 1200, 66.60, 12.0),
            report(1, 1800, 66.70, 12.0),
        ];
        let config = ExtractConfig {
            vessel: 1,
            window: TimeWindow::parse("UTC", "2024-11-23 06:00:00", "2024-11-23 07:00:00").unwrap(),
            reference: arctic(),
            step: default_step(),
        };

        let extract = extract_vessel(&reports, &config).unwrap();

        assert_eq!(extract.records.len(), 4);
        let crossing = extract.crossing.unwrap();
        let crossing_nm = crossing.cumulative_nm.unwrap();
        // halfway along the second leg
        assert!((crossing_nm - extract.total_nm / 2.0).abs() < 1e-6);
        for record in &extract.records {
            assert!((record.remaining_nm + record.cumulative_nm - extract.total_nm).abs() < 1e-6);
            assert!((record.circle_nm.unwrap() - (crossing_nm - record.cumulative_nm)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_extract_without_crossing_leaves_circle_unset() {
        let reports = vec![report(1, 0, 66.40, 12.0), report(1, 600, 66.45, 12.0)];
        let config = ExtractConfig {
            vessel: 1,
            window: TimeWindow::parse("UTC", "2024-11-23 06:00:00", "2024-11-23 07:00:00").unwrap(),
            reference: arctic(),
            step: default_step(),
        };

        let extract = extract_vessel(&reports, &config).unwrap();

        assert!(extract.crossing.is_none());
        assert!(extract.records.iter().all(|r| r.circle_nm.is_none()));
    }
}
