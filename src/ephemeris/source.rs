use chrono::{DateTime, Datelike, Duration, Utc};

use super::bodies::{Body, EclipticPosition, Target};
use super::error::LookupError;
use super::frames::{
    add, day_number, dot, ecef_to_enu, ecliptic_to_equatorial, gmst_rad, inertial_to_ecef,
    julian_date, norm, obliquity_rad, scale, sub, wrap_azimuth, AU_KM, EARTH_RADIUS_KM,
};
use super::types::{ObserverLocation, PositionSample};

const MIN_YEAR: i32 = 1800;
const MAX_YEAR: i32 = 2200;
/// Fixed equatorial targets sit far enough away that observer parallax vanishes.
const FIXED_TARGET_DISTANCE_KM: f64 = 1.0e10;

/// Anything able to place a target in the observer's sky.
pub trait PositionSource {
    fn sample(
        &self,
        observer: &ObserverLocation,
        target: &Target,
        timestamp: DateTime<Utc>,
    ) -> Result<PositionSample, LookupError>;

    /// Sunlit fraction of the disc as seen from Earth, for bodies that have one.
    fn illuminated_fraction(
        &self,
        _target: &Target,
        _timestamp: DateTime<Utc>,
    ) -> Result<Option<f64>, LookupError> {
        Ok(None)
    }
}

/// Low-precision analytic ephemeris built on mean orbital elements.
///
/// Good to a few arc-minutes for the Sun and planets and to roughly a tenth
/// of a degree for the Moon, which is finer than typical antenna beamwidths.
#[derive(Debug, Clone, Copy)]
pub struct Ephemeris {
    velocity_step: Duration,
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self {
            velocity_step: Duration::seconds(10),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LookAngles {
    azimuth_deg: f64,
    elevation_deg: f64,
    range_km: f64,
}

fn check_span(timestamp: DateTime<Utc>) -> Result<(), LookupError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&timestamp.year()) {
        Ok(())
    } else {
        Err(LookupError::OutOfRange(timestamp))
    }
}

impl Ephemeris {
    fn look_angles(
        &self,
        observer: &ObserverLocation,
        target: &Target,
        timestamp: DateTime<Utc>,
    ) -> Result<LookAngles, LookupError> {
        check_span(timestamp)?;

        let jd = julian_date(timestamp);
        let geocentric = geocentric_equatorial_km(target, day_number(jd));
        let body_ecef = inertial_to_ecef(geocentric, gmst_rad(jd));
        let dr = sub(body_ecef, observer.position_ecef_km());
        let range_km = norm(dr);
        if !range_km.is_finite() || range_km <= 0.0 {
            return Err(LookupError::Degenerate {
                target: target.to_string(),
                timestamp,
            });
        }

        let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
        Ok(LookAngles {
            azimuth_deg: wrap_azimuth(east.atan2(north).to_degrees()),
            elevation_deg: (up / range_km).clamp(-1.0, 1.0).asin().to_degrees(),
            range_km,
        })
    }
}

impl PositionSource for Ephemeris {
    fn sample(
        &self,
        observer: &ObserverLocation,
        target: &Target,
        timestamp: DateTime<Utc>,
    ) -> Result<PositionSample, LookupError> {
        let now = self.look_angles(observer, target, timestamp)?;
        let later = self.look_angles(observer, target, timestamp + self.velocity_step)?;
        let step_s = self.velocity_step.num_milliseconds() as f64 / 1000.0;

        Ok(PositionSample {
            timestamp,
            azimuth_deg: now.azimuth_deg,
            elevation_deg: now.elevation_deg,
            range_km: now.range_km,
            radial_velocity_m_s: (later.range_km - now.range_km) * 1000.0 / step_s,
        })
    }

    /// From the phase angle at the body between the Sun and the Earth.
    /// The Sun and fixed equatorial targets have no phase.
    fn illuminated_fraction(
        &self,
        target: &Target,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<f64>, LookupError> {
        check_span(timestamp)?;
        let body = match target {
            Target::Body(Body::Sun) | Target::Equatorial { .. } => return Ok(None),
            Target::Body(body) => *body,
        };

        let d = day_number(julian_date(timestamp));
        let earth_ward = scale(geocentric_ecliptic_km(body, d), -1.0);
        let sun_ward = add(geocentric_ecliptic_km(Body::Sun, d), earth_ward);
        let cos_phase = dot(earth_ward, sun_ward) / (norm(earth_ward) * norm(sun_ward));
        Ok(Some((1.0 + cos_phase.clamp(-1.0, 1.0)) / 2.0))
    }
}

/// Geocentric position in the mean equator and equinox of date, in km.
fn geocentric_equatorial_km(target: &Target, d: f64) -> [f64; 3] {
    match target {
        Target::Body(body) => {
            ecliptic_to_equatorial(geocentric_ecliptic_km(*body, d), obliquity_rad(d))
        }
        Target::Equatorial { ra_deg, dec_deg } => {
            let ra = ra_deg.to_radians();
            let dec = dec_deg.to_radians();
            scale(
                [dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()],
                FIXED_TARGET_DISTANCE_KM,
            )
        }
    }
}

fn geocentric_ecliptic_km(body: Body, d: f64) -> [f64; 3] {
    let sun = Body::Sun.elements(d).position();
    match body {
        Body::Sun => scale(sun.rectangular(), AU_KM),
        Body::Moon => scale(moon_position(d).rectangular(), EARTH_RADIUS_KM),
        planet => {
            let heliocentric = perturbed(planet, planet.elements(d).position(), d);
            scale(add(heliocentric.rectangular(), sun.rectangular()), AU_KM)
        }
    }
}

fn moon_position(d: f64) -> EclipticPosition {
    let sun = Body::Sun.elements(d);
    let moon = Body::Moon.elements(d);
    let mut position = moon.position();

    let ms = sun.mean_anomaly_deg.to_radians();
    let mm = moon.mean_anomaly_deg.to_radians();
    let ls = (sun.mean_anomaly_deg + sun.perihelion_deg).to_radians();
    let lm = (moon.mean_anomaly_deg + moon.perihelion_deg + moon.node_deg).to_radians();
    let dd = lm - ls;
    let f = lm - moon.node_deg.to_radians();

    position.lon_deg += -1.274 * (mm - 2.0 * dd).sin()
        + 0.658 * (2.0 * dd).sin()
        - 0.186 * ms.sin()
        - 0.059 * (2.0 * mm - 2.0 * dd).sin()
        - 0.057 * (mm - 2.0 * dd + ms).sin()
        + 0.053 * (mm + 2.0 * dd).sin()
        + 0.046 * (2.0 * dd - ms).sin()
        + 0.041 * (mm - ms).sin()
        - 0.035 * dd.sin()
        - 0.031 * (mm + ms).sin()
        - 0.015 * (2.0 * f - 2.0 * dd).sin()
        + 0.011 * (mm - 4.0 * dd).sin();
    position.lat_deg += -0.173 * (f - 2.0 * dd).sin()
        - 0.055 * (mm - f - 2.0 * dd).sin()
        - 0.046 * (mm + f - 2.0 * dd).sin()
        + 0.033 * (f + 2.0 * dd).sin()
        + 0.017 * (2.0 * mm + f).sin();
    position.distance += -0.58 * (mm - 2.0 * dd).cos() - 0.46 * (2.0 * dd).cos();
    position
}

/// Leading Jupiter/Saturn mutual perturbations; other planets pass through.
fn perturbed(body: Body, mut position: EclipticPosition, d: f64) -> EclipticPosition {
    let mj = Body::Jupiter.elements(d).mean_anomaly_deg;
    let msat = Body::Saturn.elements(d).mean_anomaly_deg;
    let sin = |deg: f64| deg.to_radians().sin();
    let cos = |deg: f64| deg.to_radians().cos();

    match body {
        Body::Jupiter => {
            position.lon_deg += -0.332 * sin(2.0 * mj - 5.0 * msat - 67.6)
                - 0.056 * sin(2.0 * mj - 2.0 * msat + 21.0)
                + 0.042 * sin(3.0 * mj - 5.0 * msat + 21.0)
                - 0.036 * sin(mj - 2.0 * msat)
                + 0.022 * cos(mj - msat)
                + 0.023 * sin(2.0 * mj - 3.0 * msat + 52.0)
                - 0.016 * sin(mj - 5.0 * msat - 69.0);
        }
        Body::Saturn => {
            position.lon_deg += 0.812 * sin(2.0 * mj - 5.0 * msat - 67.6)
                - 0.229 * cos(2.0 * mj - 4.0 * msat - 2.0)
                + 0.119 * sin(mj - 2.0 * msat - 3.0)
                + 0.046 * sin(2.0 * mj - 6.0 * msat - 69.0)
                + 0.014 * sin(mj - 3.0 * msat + 32.0);
            position.lat_deg += -0.020 * cos(2.0 * mj - 4.0 * msat - 2.0)
                + 0.018 * sin(2.0 * mj - 6.0 * msat - 49.0);
        }
        _ => {}
    }
    position
}
