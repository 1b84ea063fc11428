use chrono::{DateTime, Duration, Utc};

use super::bodies::Target;
use super::error::LookupError;
use super::source::PositionSource;
use super::types::ObserverLocation;

const COARSE_STEP_SECONDS: i64 = 600; // 10 minutes for initial scan
const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement
/// Standard altitude of a rising body: refraction plus solar semi-diameter.
const HORIZON_ELEVATION: f64 = -0.8333;

/// First rise and first set found inside a search window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiseSet {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
}

/// Scan `[start, start + window]` for horizon crossings of `target`.
pub fn find_rise_set<S: PositionSource>(
    source: &S,
    observer: &ObserverLocation,
    target: &Target,
    start: DateTime<Utc>,
    window: Duration,
) -> Result<RiseSet, LookupError> {
    let end = start + window;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);
    let mut result = RiseSet::default();

    let mut prev_up = is_up(source, observer, target, start)?;
    let mut cursor = start;

    while cursor < end && (result.rise.is_none() || result.set.is_none()) {
        let next = (cursor + coarse_step).min(end);
        let up = is_up(source, observer, target, next)?;

        if up != prev_up {
            let crossing = refine_crossing(source, observer, target, cursor, next, up)?;
            if up {
                result.rise.get_or_insert(crossing);
            } else {
                result.set.get_or_insert(crossing);
            }
        }

        prev_up = up;
        cursor = next;
    }

    Ok(result)
}

fn is_up<S: PositionSource>(
    source: &S,
    observer: &ObserverLocation,
    target: &Target,
    timestamp: DateTime<Utc>,
) -> Result<bool, LookupError> {
    Ok(source.sample(observer, target, timestamp)?.elevation_deg >= HORIZON_ELEVATION)
}

/// Binary search to find exact horizon crossing time
fn refine_crossing<S: PositionSource>(
    source: &S,
    observer: &ObserverLocation,
    target: &Target,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    rising: bool,
) -> Result<DateTime<Utc>, LookupError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = is_up(source, observer, target, mid)?;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(high)
}
