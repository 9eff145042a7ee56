//! Reference latitude in decimal degrees or degrees/minutes/seconds.

use std::fmt;
use std::str::FromStr;

use crate::error::{CrossingError, Result};

/// Historical Arctic Circle value: 66° 33'.
pub const ARCTIC_CIRCLE_DMS: Dms = Dms {
    degrees: 66.0,
    minutes: 33.0,
    seconds: 0.0,
};

/// Degrees, minutes and seconds of one angle.
///
/// All three components carry the sign of the angle, so -66° 33' is
/// `{ degrees: -66, minutes: -33, seconds: -0 }` and the decimal value is
/// always `degrees + minutes / 60 + seconds / 3600`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    /// Build from a triple as a person writes it. A negative sign on any
    /// component makes the whole angle negative.
    pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        let sign = if degrees.is_sign_negative()
            || minutes.is_sign_negative()
            || seconds.is_sign_negative()
        {
            -1.0
        } else {
            1.0
        };
        Self {
            degrees: sign * degrees.abs(),
            minutes: sign * minutes.abs(),
            seconds: sign * seconds.abs(),
        }
    }

    pub fn from_decimal(decimal: f64) -> Self {
        let sign = if decimal < 0.0 { -1.0 } else { 1.0 };
        let total_seconds = decimal.abs() * 3600.0;
        let minutes = (total_seconds / 60.0).floor();
        let seconds = total_seconds - minutes * 60.0;
        let degrees = (minutes / 60.0).floor();
        let minutes = minutes - degrees * 60.0;
        Self {
            degrees: sign * degrees,
            minutes: sign * minutes,
            seconds: sign * seconds,
        }
    }

    pub fn to_decimal(&self) -> f64 {
        self.degrees + self.minutes / 60.0 + self.seconds / 3600.0
    }

    fn is_negative(&self) -> bool {
        self.degrees.is_sign_negative()
            || self.minutes.is_sign_negative()
            || self.seconds.is_sign_negative()
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        // round to the displayed tenth first so 59.96" shows as the next minute
        let mut seconds = (self.seconds.abs() * 10.0).round() / 10.0;
        let mut minutes = self.minutes.abs();
        let mut degrees = self.degrees.abs();
        if seconds >= 60.0 {
            seconds -= 60.0;
            minutes += 1.0;
        }
        if minutes >= 60.0 {
            minutes -= 60.0;
            degrees += 1.0;
        }
        write!(
            f,
            "{}{:02.0}° {:02.0}' {:04.1}\"",
            sign, degrees, minutes, seconds
        )
    }
}

/// Parses `DEG,MIN,SEC`.
impl FromStr for Dms {
    type Err = CrossingError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| CrossingError::InvalidDms(s.to_string()))?;
        match parts.as_slice() {
            [d, m, sec] => Ok(Dms::new(*d, *m, *sec)),
            _ => Err(CrossingError::InvalidDms(s.to_string())),
        }
    }
}

/// The parallel whose crossing is detected. Both representations are kept
/// and agree with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLatitude {
    decimal: f64,
    dms: Dms,
}

impl ReferenceLatitude {
    pub fn from_decimal(decimal: f64) -> Result<Self> {
        check_range(decimal)?;
        Ok(Self {
            decimal,
            dms: Dms::from_decimal(decimal),
        })
    }

    pub fn from_dms(dms: Dms) -> Result<Self> {
        let decimal = dms.to_decimal();
        check_range(decimal)?;
        Ok(Self { decimal, dms })
    }

    pub fn degrees(&self) -> f64 {
        self.decimal
    }

    pub fn dms(&self) -> Dms {
        self.dms
    }
}

impl Default for ReferenceLatitude {
    fn default() -> Self {
        Self {
            decimal: ARCTIC_CIRCLE_DMS.to_decimal(),
            dms: ARCTIC_CIRCLE_DMS,
        }
    }
}

impl fmt::Display for ReferenceLatitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5} ({})", self.decimal, self.dms)
    }
}

fn check_range(decimal: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&decimal) {
        return Err(CrossingError::LatitudeOutOfRange(decimal));
    }
    Ok(())
}
