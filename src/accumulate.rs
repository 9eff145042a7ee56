//! Running distance along a windowed track.

use log::debug;

use crate::geodesic::distance_nm;
use crate::model::{AccumulatedRecord, WindowedReport};

/// Output of one accumulation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Accumulated {
    pub records: Vec<AccumulatedRecord>,
    /// Distance from the first to the last record, nautical miles.
    pub total_nm: f64,
}

/// Fold the stream into cumulative distance and speed-by-distance.
///
/// Each segment is measured from the previous retained record. Speed is
/// derived from the UTC timestamps and is `None` when no time elapsed.
pub fn accumulate(stream: &[WindowedReport<'_>]) -> Accumulated {
    let mut records = Vec::with_capacity(stream.len());
    let mut cumulative_nm = 0.0;
    let mut previous: Option<&WindowedReport<'_>> = None;

    for entry in stream {
        let speed_by_distance = match previous {
            None => None,
            Some(prev) => {
                let segment = distance_nm(
                    prev.report.latitude,
                    prev.report.longitude,
                    entry.report.latitude,
                    entry.report.longitude,
                );
                cumulative_nm += segment;

                let interval = (entry.report.timestamp - prev.report.timestamp).num_seconds();
                if interval > 0 {
                    Some(3600.0 * segment / interval as f64)
                } else {
                    debug!(
                        "{}: no time elapsed before {}, speed by distance unknown",
                        entry.report.imo, entry.report.timestamp
                    );
                    None
                }
            }
        };

        records.push(AccumulatedRecord {
            local: entry.local,
            report: entry.report.clone(),
            cumulative_nm,
            speed_by_distance,
        });
        previous = Some(entry);
    }

    Accumulated {
        records,
        total_nm: cumulative_nm,
    }
}
