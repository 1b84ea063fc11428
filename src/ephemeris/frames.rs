use chrono::{DateTime, Utc};

pub const AU_KM: f64 = 149_597_870.7;
pub const EARTH_RADIUS_KM: f64 = 6378.14;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;
/// 2000 Jan 0.0 UT, the epoch of the mean orbital elements.
const ELEMENTS_EPOCH_JD: f64 = 2_451_543.5;

pub fn julian_date(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Days since the orbital-element epoch.
pub fn day_number(jd: f64) -> f64 {
    jd - ELEMENTS_EPOCH_JD
}

pub fn obliquity_rad(d: f64) -> f64 {
    (23.4393 - 3.563e-7 * d).to_radians()
}

/// Greenwich mean sidereal time (IAU 1982) in radians.
pub fn gmst_rad(jd: f64) -> f64 {
    let t = (jd - J2000_JD) / 36525.0;
    let degrees = 280.460_618_37 + 360.985_647_366_29 * (jd - J2000_JD) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

pub fn ecliptic_to_equatorial(v: [f64; 3], obliquity: f64) -> [f64; 3] {
    let (sin_e, cos_e) = obliquity.sin_cos();
    [v[0], v[1] * cos_e - v[2] * sin_e, v[1] * sin_e + v[2] * cos_e]
}

/// Rotate an equatorial-of-date vector into the Earth-fixed frame.
pub fn inertial_to_ecef(v: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        v[0] * cos_g + v[1] * sin_g,
        -v[0] * sin_g + v[1] * cos_g,
        v[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: [f64; 3], factor: f64) -> [f64; 3] {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

/// Reduce an angle to `[0, 360)`. `rem_euclid` can round a tiny negative
/// angle up to exactly 360, which maps to 0 here.
pub fn wrap_azimuth(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
