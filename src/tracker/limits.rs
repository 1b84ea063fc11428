use serde::Deserialize;
use strum_macros::Display;
use thiserror::Error;

use crate::ephemeris::wrap_azimuth;

pub const DEFAULT_ELEVATION_MAX_DEG: f64 = 90.0;
const AZIMUTH_LIMIT_MIN: f64 = -360.0;
const AZIMUTH_LIMIT_MAX: f64 = 720.0;
const MAX_TRAVEL_DEG: f64 = 720.0;

#[derive(Debug, Error, PartialEq)]
pub enum LimitError {
    #[error("if one azimuth limit is provided, both left and right must be set")]
    Partial,
    #[error("azimuth limit {0} is outside -360..720 degrees")]
    AzimuthOutOfRange(f64),
    #[error("azimuth travel of {0:.1} degrees exceeds two revolutions")]
    TravelTooWide(f64),
    #[error("elevation limit {0} must be above 0 and at most 180 degrees")]
    Elevation(f64),
}

/// What to do with the rotor while the target is below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BelowHorizon {
    /// Keep following in azimuth with elevation held at 0.
    #[default]
    Clamp,
    /// Send nothing until the target rises.
    Skip,
}

/// Permitted azimuth travel on the continuous (unwrapped) axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthRange {
    left_deg: f64,
    right_deg: f64,
}

impl AzimuthRange {
    pub fn left_deg(&self) -> f64 {
        self.left_deg
    }

    pub fn right_deg(&self) -> f64 {
        self.right_deg
    }

    fn contains(&self, azimuth: f64) -> bool {
        azimuth >= self.left_deg && azimuth <= self.right_deg
    }

    /// The lowest `raw + 360k` inside the range, if any.
    fn representation_within(&self, raw: f64) -> Option<f64> {
        let turns = ((self.left_deg - raw) / 360.0).ceil();
        let candidate = raw + 360.0 * turns;
        self.contains(candidate).then_some(candidate)
    }

    /// The in-range `raw + 360k` closest to `previous`, if any.
    fn representation_nearest(&self, raw: f64, previous: f64) -> Option<f64> {
        let lowest = self.representation_within(raw)?;
        (0..3)
            .map(|turns| lowest + 360.0 * f64::from(turns))
            .take_while(|candidate| self.contains(*candidate))
            .min_by(|a, b| (a - previous).abs().total_cmp(&(b - previous).abs()))
    }

    /// Pull an accumulator that wandered a full turn or more outside back by whole turns.
    fn reseat(&self, mut azimuth: f64) -> f64 {
        while azimuth >= self.right_deg + 360.0 {
            azimuth -= 360.0;
        }
        while azimuth <= self.left_deg - 360.0 {
            azimuth += 360.0;
        }
        azimuth
    }
}

/// Mechanical limits of the rotor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorLimits {
    azimuth: Option<AzimuthRange>,
    elevation_max_deg: f64,
}

impl Default for RotorLimits {
    fn default() -> Self {
        Self {
            azimuth: None,
            elevation_max_deg: DEFAULT_ELEVATION_MAX_DEG,
        }
    }
}

impl RotorLimits {
    /// Validate user limits. A left limit greater than the right one describes
    /// travel through north (e.g. 330 → 30) and is stored as 330 → 390.
    pub fn new(
        left_deg: Option<f64>,
        right_deg: Option<f64>,
        elevation_max_deg: Option<f64>,
    ) -> Result<Self, LimitError> {
        let elevation_max_deg = elevation_max_deg.unwrap_or(DEFAULT_ELEVATION_MAX_DEG);
        if !(elevation_max_deg > 0.0 && elevation_max_deg <= 180.0) {
            return Err(LimitError::Elevation(elevation_max_deg));
        }

        let azimuth = match (left_deg, right_deg) {
            (None, None) => None,
            (Some(left), Some(right)) => {
                for limit in [left, right] {
                    if !(AZIMUTH_LIMIT_MIN..=AZIMUTH_LIMIT_MAX).contains(&limit) {
                        return Err(LimitError::AzimuthOutOfRange(limit));
                    }
                }
                let right = if right < left { right + 360.0 } else { right };
                if right - left > MAX_TRAVEL_DEG {
                    return Err(LimitError::TravelTooWide(right - left));
                }
                Some(AzimuthRange {
                    left_deg: left,
                    right_deg: right,
                })
            }
            _ => return Err(LimitError::Partial),
        };

        Ok(Self {
            azimuth,
            elevation_max_deg,
        })
    }

    pub fn azimuth(&self) -> Option<AzimuthRange> {
        self.azimuth
    }

    pub fn elevation_max_deg(&self) -> f64 {
        self.elevation_max_deg
    }
}

/// Continuous azimuth carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnwrapState {
    continuous_deg: Option<f64>,
    reacquire: bool,
}

impl UnwrapState {
    pub fn continuous_deg(&self) -> Option<f64> {
        self.continuous_deg
    }

    /// Allow the next clamp to leave a parked limit for any reachable
    /// representation, choosing the one closest to the current accumulator.
    pub fn reacquire(self) -> Self {
        Self {
            reacquire: true,
            ..self
        }
    }
}

/// Rotor command after limits have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointingCommand {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

/// `raw + 360k` closest to `previous`.
fn nearest_turn(raw: f64, previous: f64) -> f64 {
    raw + 360.0 * ((previous - raw) / 360.0).round()
}

/// Turn a raw look angle into a command the rotor can physically follow.
///
/// Elevation is held inside `[0, elevation_max]`. Without azimuth limits the
/// azimuth is reduced to `[0, 360)`. With limits the raw azimuth is unwrapped
/// against `prior` so crossing north inside the travel range never causes a
/// full-circle slew. When that turn falls outside the range while the rotor was
/// still inside it, the rotor unwinds to the in-range representation nearest
/// its position. With none reachable the command is clamped along the
/// continuous axis, and a parked accumulator stays on that axis until it comes
/// back into range, is re-seated, or is released with
/// [`UnwrapState::reacquire`].
pub fn clamp(
    raw_azimuth_deg: f64,
    raw_elevation_deg: f64,
    limits: &RotorLimits,
    prior: UnwrapState,
) -> (PointingCommand, UnwrapState) {
    let elevation_deg = raw_elevation_deg.clamp(0.0, limits.elevation_max_deg);
    let raw = wrap_azimuth(raw_azimuth_deg);

    let Some(range) = limits.azimuth else {
        return (
            PointingCommand {
                azimuth_deg: raw,
                elevation_deg,
            },
            UnwrapState {
                continuous_deg: Some(raw),
                reacquire: false,
            },
        );
    };

    let continuous = match prior.continuous_deg {
        None => range.representation_within(raw).unwrap_or(raw),
        Some(previous) => {
            let candidate = nearest_turn(raw, previous);
            if range.contains(candidate) {
                candidate
            } else if prior.reacquire || range.contains(previous) {
                range
                    .representation_nearest(raw, previous)
                    .unwrap_or(candidate)
            } else {
                candidate
            }
        }
    };
    let continuous = range.reseat(continuous);

    (
        PointingCommand {
            azimuth_deg: continuous.clamp(range.left_deg, range.right_deg),
            elevation_deg,
        },
        UnwrapState {
            continuous_deg: Some(continuous),
            reacquire: false,
        },
    )
}
