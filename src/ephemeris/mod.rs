mod bodies;
mod error;
mod frames;
mod rise_set;
mod source;
mod types;

pub use bodies::{Body, Target};
pub use error::LookupError;
pub use frames::wrap_azimuth;
pub use rise_set::{find_rise_set, RiseSet};
pub use source::{Ephemeris, PositionSource};
pub use types::{ObserverLocation, PositionSample};
