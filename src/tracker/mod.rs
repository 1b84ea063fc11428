mod doppler;
mod error;
mod limits;
mod pass_monitor;
mod tracker;

pub use doppler::FrequencyPlan;
pub use limits::{BelowHorizon, LimitError, RotorLimits};
pub use pass_monitor::{PassMonitor, DEFAULT_AOS_ELEVATION_DEG};
pub use tracker::{Clock, RadioChannel, RotorChannel, Tracker, TrackerConfig};
