//! Human-readable crossing reports.

use std::fmt;

use chrono_tz::Tz;

use crate::latitude::{Dms, ReferenceLatitude};
use crate::model::CrossingEstimate;
use crate::pipeline::Vessel;

pub const RULE: &str = "-----------------------------------------------------------------";

/// One crossing, with times shown in `zone`.
pub struct CrossingReport<'a> {
    pub estimate: &'a CrossingEstimate,
    pub reference: &'a ReferenceLatitude,
    pub zone: Tz,
}

impl fmt::Display for CrossingReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.estimate;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Vessel                    : {}", e.imo)?;
        writeln!(f, "Reference latitude        : {:.5}", self.reference.degrees())?;
        writeln!(
            f,
            "Latitude (South)          : {:.5} at {}",
            e.south.latitude,
            e.south.timestamp.to_rfc3339()
        )?;
        writeln!(
            f,
            "Latitude (North)          : {:.5} at {}",
            e.north.latitude,
            e.north.timestamp.to_rfc3339()
        )?;
        writeln!(
            f,
            "Longitude of crossing     : {:.5} ({})",
            e.longitude,
            Dms::from_decimal(e.longitude)
        )?;
        writeln!(
            f,
            "Crossing time by Latitude : {}",
            e.time_by_latitude.with_timezone(&self.zone).to_rfc3339()
        )?;
        write!(
            f,
            "Crossing time by speed    : {}",
            e.time_by_speed.with_timezone(&self.zone).to_rfc3339()
        )
    }
}

/// `IMO : NAME` listing.
pub fn vessel_list(vessels: &[Vessel]) -> String {
    vessels
        .iter()
        .map(|v| format!("{} : {}", v.imo, v.name))
        .collect::<Vec<_>>()
        .join("\n")
}
