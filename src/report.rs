use std::fmt;

use chrono::{DateTime, Duration, Local, Utc};

use crate::ephemeris::{
    find_rise_set, LookupError, ObserverLocation, PositionSample, PositionSource, RiseSet, Target,
};
use crate::tracker::FrequencyPlan;

const KM_PER_MILE: f64 = 1.609_344;
const RISE_SET_WINDOW_HOURS: i64 = 24;

/// Where a target is at one instant, and when it next crosses the horizon.
#[derive(Debug, Clone)]
pub struct Report {
    pub target: Target,
    pub sample: PositionSample,
    pub plan: Option<FrequencyPlan>,
    pub illuminated_fraction: Option<f64>,
    pub rise_set: RiseSet,
}

impl Report {
    pub fn compute<S: PositionSource>(
        source: &S,
        observer: &ObserverLocation,
        target: &Target,
        plan: Option<FrequencyPlan>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LookupError> {
        let sample = source.sample(observer, target, timestamp)?;
        let illuminated_fraction = source.illuminated_fraction(target, timestamp)?;
        let rise_set = find_rise_set(
            source,
            observer,
            target,
            timestamp,
            Duration::hours(RISE_SET_WINDOW_HOURS),
        )?;
        Ok(Self {
            target: *target,
            sample,
            plan,
            illuminated_fraction,
            rise_set,
        })
    }
}

fn both_zones(timestamp: DateTime<Utc>) -> String {
    format!(
        "{} ({})",
        timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
    )
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sample = &self.sample;
        writeln!(
            f,
            "Local time:      {}",
            sample.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
        )?;
        writeln!(
            f,
            "UTC time:        {}",
            sample.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "Target:          {}", self.target)?;
        writeln!(f, "Azimuth:         {:.2}°", sample.azimuth_deg)?;
        writeln!(f, "Elevation:       {:.2}°", sample.elevation_deg)?;
        writeln!(
            f,
            "Distance:        {:.0} km ({:.0} mi)",
            sample.range_km,
            sample.range_km / KM_PER_MILE
        )?;
        if let Some(fraction) = self.illuminated_fraction {
            writeln!(f, "Illuminated:     {:.2}%", fraction * 100.0)?;
        }
        writeln!(
            f,
            "Radial velocity: {:+.3} km/s",
            sample.radial_velocity_m_s / 1000.0
        )?;

        if let Some(plan) = &self.plan {
            let shifted = plan.target_hz(sample.radial_velocity_m_s);
            writeln!(f, "Frequency:       {:.2} Hz", plan.rest_hz)?;
            if plan.doppler {
                writeln!(f, "Doppler freq:    {:.2} Hz", shifted)?;
                writeln!(f, "Doppler shift:   {:+.2} Hz", shifted - plan.rest_hz)?;
            }
        }

        match self.rise_set.rise {
            Some(rise) => writeln!(f, "Rises:           {}", both_zones(rise))?,
            None => writeln!(f, "Rises:           not in the next {} h", RISE_SET_WINDOW_HOURS)?,
        }
        match self.rise_set.set {
            Some(set) => write!(f, "Sets:            {}", both_zones(set)),
            None => write!(f, "Sets:            not in the next {} h", RISE_SET_WINDOW_HOURS),
        }
    }
}
