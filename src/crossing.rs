//! Detecting and timing crossings of the reference latitude.
//!
//! A crossing is bracketed by a *south* record, the highest latitude seen at
//! or below the reference since the last crossing, and a *north* record, the
//! first one after it strictly above the reference. The estimator then
//! interpolates the crossing longitude and time by latitude fraction, and
//! times it a second way by integrating speed forward from the south record.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CrossingError, Result};
use crate::geodesic::distance_nm;
use crate::latitude::ReferenceLatitude;
use crate::model::{AccumulatedRecord, CrossingEstimate, Report};

/// Anything the detector can scan.
pub trait TrackPoint {
    fn report(&self) -> &Report;

    /// Distance travelled up to this point, when known.
    fn cumulative_nm(&self) -> Option<f64> {
        None
    }
}

impl TrackPoint for Report {
    fn report(&self) -> &Report {
        self
    }
}

impl TrackPoint for AccumulatedRecord {
    fn report(&self) -> &Report {
        &self.report
    }

    fn cumulative_nm(&self) -> Option<f64> {
        Some(self.cumulative_nm)
    }
}

/// Records either side of one crossing.
#[derive(Debug)]
pub struct Bracket<'a, T> {
    pub south: &'a T,
    pub north: &'a T,
}

// manual impls: derive would require `T: Clone`
impl<T> Clone for Bracket<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Bracket<'_, T> {}

#[derive(Debug)]
enum DetectorState<'a, T> {
    Seeking,
    SouthFound(&'a T),
}

impl<T> Clone for DetectorState<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DetectorState<'_, T> {}

impl<'a, T: TrackPoint> DetectorState<'a, T> {
    /// Feed one record. Returns the next state and a bracket when this
    /// record completes a crossing.
    fn step(self, record: &'a T, reference: f64) -> (Self, Option<Bracket<'a, T>>) {
        let latitude = record.report().latitude;

        let state = match self {
            _ if latitude > reference => self,
            DetectorState::Seeking => DetectorState::SouthFound(record),
            DetectorState::SouthFound(south) if latitude >= south.report().latitude => {
                DetectorState::SouthFound(record)
            }
            DetectorState::SouthFound(_) => self,
        };

        match state {
            DetectorState::SouthFound(south) if latitude > reference => (
                DetectorState::Seeking,
                Some(Bracket {
                    south,
                    north: record,
                }),
            ),
            _ => (state, None),
        }
    }
}

/// Lazy scan over one vessel's time-ordered records.
pub struct Crossings<'a, T, I> {
    records: I,
    reference: f64,
    state: DetectorState<'a, T>,
}

impl<'a, T, I> Iterator for Crossings<'a, T, I>
where
    T: TrackPoint + 'a,
    I: Iterator<Item = &'a T>,
{
    type Item = Bracket<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            let (state, bracket) = self.state.step(record, self.reference);
            self.state = state;
            if bracket.is_some() {
                return bracket;
            }
        }
        None
    }
}

/// Every crossing of `reference` in `records`, in order. The records must
/// all belong to one vessel.
pub fn detect<'a, T, I>(records: I, reference: &ReferenceLatitude) -> Crossings<'a, T, I::IntoIter>
where
    T: TrackPoint + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Crossings {
        records: records.into_iter(),
        reference: reference.degrees(),
        state: DetectorState::Seeking,
    }
}

/// Speed integration gives up once it has simulated this many bracket intervals.
const RUNAWAY_FACTOR: i64 = 10;

/// Step used by speed integration unless configured otherwise.
pub fn default_step() -> Duration {
    Duration::seconds(1)
}

/// Times and places a bracketed crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimator {
    reference: ReferenceLatitude,
    step: Duration,
}

impl Estimator {
    pub fn new(reference: ReferenceLatitude) -> Self {
        Self {
            reference,
            step: default_step(),
        }
    }

    /// Use a coarser or finer integration step. Must be at least one second.
    pub fn with_step(mut self, step: Duration) -> Result<Self> {
        if step < Duration::seconds(1) {
            return Err(CrossingError::InvalidStep(step.num_seconds()));
        }
        self.step = step;
        Ok(self)
    }

    pub fn reference(&self) -> &ReferenceLatitude {
        &self.reference
    }

    pub fn estimate<T: TrackPoint>(&self, bracket: &Bracket<'_, T>) -> Result<CrossingEstimate> {
        let south = bracket.south.report();
        let north = bracket.north.report();

        let fraction = self.fraction(south, north);
        let longitude = south.longitude + fraction * (north.longitude - south.longitude);
        let segment_nm = distance_nm(south.latitude, south.longitude, north.latitude, north.longitude);

        Ok(CrossingEstimate {
            imo: south.imo,
            south: south.clone(),
            north: north.clone(),
            fraction,
            longitude,
            time_by_latitude: time_by_latitude(south, north, fraction),
            time_by_speed: self.time_by_speed(south, north, fraction * segment_nm)?,
            cumulative_nm: bracket
                .south
                .cumulative_nm()
                .map(|nm| nm + fraction * segment_nm),
        })
    }

    fn fraction(&self, south: &Report, north: &Report) -> f64 {
        debug_assert!(
            north.latitude > south.latitude,
            "north record must lie above the south record"
        );
        let fraction =
            (self.reference.degrees() - south.latitude) / (north.latitude - south.latitude);
        debug_assert!((0.0..=1.0).contains(&fraction));
        fraction
    }

    /// Integrate a linearly changing speed from the south record until the
    /// distance covered reaches `target_nm`.
    fn time_by_speed(&self, south: &Report, north: &Report, target_nm: f64) -> Result<DateTime<Utc>> {
        let elapsed = (north.timestamp - south.timestamp).num_seconds();
        if elapsed <= 0 {
            return Ok(south.timestamp);
        }

        let limit_secs = elapsed.saturating_mul(RUNAWAY_FACTOR);
        let step_secs = self.step.num_seconds() as f64;
        let delta_speed = (north.speed - south.speed) / elapsed as f64 * step_secs;

        let mut travelled = 0.0;
        let mut speed = south.speed;
        let mut time = south.timestamp;

        while travelled < target_nm {
            let simulated_secs = (time - south.timestamp).num_seconds();
            if simulated_secs > limit_secs {
                return Err(CrossingError::IntegrationRunaway {
                    imo: south.imo,
                    elapsed_secs: simulated_secs,
                    interval_secs: elapsed,
                });
            }
            if speed < 0.0 {
                return Err(CrossingError::NegativeSpeed {
                    imo: south.imo,
                    speed,
                    elapsed_secs: simulated_secs,
                });
            }
            if speed == 0.0 && delta_speed <= 0.0 {
                return Err(CrossingError::StalledIntegration {
                    imo: south.imo,
                    elapsed_secs: simulated_secs,
                });
            }
            // knots -> nautical miles per step
            travelled += speed * step_secs / 3600.0;
            time = time
                .checked_add_signed(self.step)
                .ok_or(CrossingError::TimeOverflow { imo: south.imo })?;
            speed += delta_speed;
        }

        Ok(time)
    }
}

/// Crossing time assuming latitude changes linearly between the records.
fn time_by_latitude(south: &Report, north: &Report, fraction: f64) -> DateTime<Utc> {
    let span_ms = (north.timestamp - south.timestamp).num_milliseconds() as f64;
    south.timestamp + Duration::milliseconds((span_ms * fraction).round() as i64)
}
