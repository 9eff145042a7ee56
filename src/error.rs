//! Error types for crossing extraction.

use thiserror::Error;

/// Result type alias for crossing operations.
pub type Result<T> = std::result::Result<T, CrossingError>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum CrossingError {
    /// A report carried a timestamp that does not parse.
    #[error("record {row}: malformed timestamp {value:?}: {source}")]
    MalformedTimestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// A window bound is not a valid local instant.
    #[error("invalid window instant {value:?}: {reason}")]
    InvalidWindow { value: String, reason: String },

    #[error("reference latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),

    #[error("invalid DMS triple {0:?}, expected DEG,MIN,SEC")]
    InvalidDms(String),

    /// Speed integration went below zero before reaching the crossing.
    #[error("vessel {imo}: speed went negative ({speed:.3} kn) {elapsed_secs} s after the south record")]
    NegativeSpeed { imo: u32, speed: f64, elapsed_secs: i64 },

    /// Speed integration can never reach the crossing.
    #[error("vessel {imo}: speed integration stalled at zero speed {elapsed_secs} s after the south record")]
    StalledIntegration { imo: u32, elapsed_secs: i64 },

    /// Integration ran far past the bracket interval without covering the distance.
    #[error("vessel {imo}: speed integration ran {elapsed_secs} s past the south record, bracket spans {interval_secs} s")]
    IntegrationRunaway {
        imo: u32,
        elapsed_secs: i64,
        interval_secs: i64,
    },

    #[error("vessel {imo}: crossing time is beyond the representable range")]
    TimeOverflow { imo: u32 },

    /// A numeric report field is NaN, infinite or out of range.
    #[error("record {row}: {field} {value} is out of range")]
    InvalidReport {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("integration step must be a positive number of seconds within the duration range, got {0}")]
    InvalidStep(i64),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
