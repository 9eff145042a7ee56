//! CSV in, CSV out.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use crate::model::{AnnotatedRecord, RawReport, Report};

/// Read one file of reports. Any malformed row aborts the read.
pub fn read_reports<R: io::Read>(reader: R) -> crate::error::Result<Vec<Report>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    rdr.deserialize()
        .enumerate()
        .map(|(i, result)| {
            let raw: RawReport = result?;
            // header is line 1
            raw.into_report(i + 2)
        })
        .collect()
}

/// Parse every file in parallel and concatenate them in the order given.
/// The caller is responsible for the files being in time order.
pub fn load_files(paths: &[String]) -> Result<Vec<Report>> {
    let per_file = paths
        .par_iter()
        .map(|path| -> Result<Vec<Report>> {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open file {}", path))?;
            let reports =
                read_reports(file).with_context(|| format!("failed to parse {}", path))?;
            info!("{} has {} records.", path, reports.len());
            Ok(reports)
        })
        .collect::<Result<Vec<Vec<Report>>>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

#[derive(Debug, serde::Serialize)]
struct AnnotatedRow<'a> {
    #[serde(rename = "LOCAL_TIME")]
    local_time: String,
    #[serde(rename = "IMO")]
    imo: u32,
    #[serde(rename = "NAME")]
    name: &'a str,
    #[serde(rename = "TIMESTAMP")]
    timestamp: String,
    #[serde(rename = "LATITUDE")]
    latitude: f64,
    #[serde(rename = "LONGITUDE")]
    longitude: f64,
    #[serde(rename = "SPEED")]
    speed: f64,
    #[serde(rename = "CUMULATIVE_NM")]
    cumulative_nm: f64,
    #[serde(rename = "SPEED_BY_DISTANCE")]
    speed_by_distance: Option<f64>,
    #[serde(rename = "REMAINING_NM")]
    remaining_nm: f64,
    #[serde(rename = "CIRCLE_NM")]
    circle_nm: Option<f64>,
}

impl<'a> From<&'a AnnotatedRecord> for AnnotatedRow<'a> {
    fn from(record: &'a AnnotatedRecord) -> Self {
        Self {
            local_time: record.local.to_rfc3339(),
            imo: record.report.imo,
            name: &record.report.name,
            timestamp: record
                .report
                .timestamp
                .format(crate::model::TIMESTAMP_FORMAT)
                .to_string(),
            latitude: record.report.latitude,
            longitude: record.report.longitude,
            speed: record.report.speed,
            cumulative_nm: record.cumulative_nm,
            speed_by_distance: record.speed_by_distance,
            remaining_nm: record.remaining_nm,
            circle_nm: record.circle_nm,
        }
    }
}

/// Write annotated records in chronological order. Unknown values are left empty.
pub fn write_annotated<W: io::Write>(writer: W, records: &[AnnotatedRecord]) -> crate::error::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(AnnotatedRow::from(record))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_annotated_file(path: &Path, records: &[AnnotatedRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_annotated(file, records).with_context(|| format!("failed to write {}", path.display()))
}
