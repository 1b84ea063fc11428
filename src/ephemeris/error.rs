use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0} is outside the supported ephemeris span (years 1800-2200)")]
    OutOfRange(DateTime<Utc>),
    #[error("no usable position for {target} at {timestamp}")]
    Degenerate {
        target: String,
        timestamp: DateTime<Utc>,
    },
}
