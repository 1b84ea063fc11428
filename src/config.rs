use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::endpoint::radio::DEFAULT_RADIO_PORT;
use crate::endpoint::{AddressError, NetworkAddress, RadioProtocol, RotorEndpoint};
use crate::ephemeris::{Body, ObserverLocation, Target};
use crate::tracker::{
    BelowHorizon, FrequencyPlan, LimitError, RotorLimits, DEFAULT_AOS_ELEVATION_DEG,
};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// Longest accepted delay or timeout.
const MAX_DURATION: Duration = Duration::from_secs(86_400);
/// hamlib model number of a rotctld network rotor.
pub const DEFAULT_ROTOR_MODEL: u32 = 2;
pub const DEFAULT_ROTOR_BAUD: u32 = 9600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("unknown body '{0}', use --list-bodies to see the options")]
    UnknownBody(String),
    #[error("track either a body or an RA/Dec position, not both")]
    ConflictingTarget,
    #[error("RA and Dec must be given together")]
    PartialEquatorial,
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
    #[error("--radio and --sdrsharp cannot be used together")]
    ConflictingRadio,
    #[error("a frequency must be provided in radio mode")]
    MissingFrequency,
    #[error("rotor limits: {0}")]
    Limits(#[from] LimitError),
    #[error("endpoint: {0}")]
    Endpoint(#[from] AddressError),
}

/// A YAML value that may be written as a number or as text (`9h48m`, `1m 30s`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Raw settings as read from a YAML file or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub body: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub altitude: Option<f64>,
    pub ra: Option<Scalar>,
    pub dec: Option<Scalar>,
    pub freq: Option<f64>,
    pub no_doppler: Option<bool>,
    pub radio: Option<String>,
    pub sdrsharp: Option<String>,
    pub send_aos_los: Option<bool>,
    pub aos_elevation: Option<f64>,
    pub delay: Option<Scalar>,
    pub rotor: Option<String>,
    pub rotortype: Option<u32>,
    pub rotorbaud: Option<u32>,
    pub rotorleftlimit: Option<f64>,
    pub rotorrightlimit: Option<f64>,
    pub rotorelevationlimit: Option<f64>,
    pub azcorrect: Option<f64>,
    pub below_horizon: Option<BelowHorizon>,
    pub timeout: Option<Scalar>,
    pub utcdate: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioEndpoint {
    pub protocol: RadioProtocol,
    pub address: NetworkAddress,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub observer: ObserverLocation,
    pub target: Target,
    pub plan: Option<FrequencyPlan>,
    pub radio: Option<RadioEndpoint>,
    /// AOS/LOS boundary, present when pass announcements are enabled.
    pub aos_elevation_deg: Option<f64>,
    pub rotor: Option<RotorEndpoint>,
    pub limits: RotorLimits,
    pub below_horizon: BelowHorizon,
    pub azimuth_offset_deg: f64,
    pub delay: Duration,
    pub timeout: Duration,
    /// Replaces the wall clock when set.
    pub start: Option<DateTime<Utc>>,
}

impl Settings {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            body: other.body.or(self.body),
            lat: other.lat.or(self.lat),
            long: other.long.or(self.long),
            altitude: other.altitude.or(self.altitude),
            ra: other.ra.or(self.ra),
            dec: other.dec.or(self.dec),
            freq: other.freq.or(self.freq),
            no_doppler: other.no_doppler.or(self.no_doppler),
            radio: other.radio.or(self.radio),
            sdrsharp: other.sdrsharp.or(self.sdrsharp),
            send_aos_los: other.send_aos_los.or(self.send_aos_los),
            aos_elevation: other.aos_elevation.or(self.aos_elevation),
            delay: other.delay.or(self.delay),
            rotor: other.rotor.or(self.rotor),
            rotortype: other.rotortype.or(self.rotortype),
            rotorbaud: other.rotorbaud.or(self.rotorbaud),
            rotorleftlimit: other.rotorleftlimit.or(self.rotorleftlimit),
            rotorrightlimit: other.rotorrightlimit.or(self.rotorrightlimit),
            rotorelevationlimit: other.rotorelevationlimit.or(self.rotorelevationlimit),
            azcorrect: other.azcorrect.or(self.azcorrect),
            below_horizon: other.below_horizon.or(self.below_horizon),
            timeout: other.timeout.or(self.timeout),
            utcdate: other.utcdate.or(self.utcdate),
        }
    }

    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let latitude = self.lat.ok_or(ConfigError::Missing("latitude"))?;
        let longitude = self.long.ok_or(ConfigError::Missing("longitude"))?;
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        let altitude = self.altitude.unwrap_or(0.0);
        if !altitude.is_finite() {
            return Err(invalid("altitude", altitude));
        }
        let observer = ObserverLocation::new(latitude, longitude, altitude);

        let target = resolve_target(self.body.as_deref(), self.ra.as_ref(), self.dec.as_ref())?;

        let plan = match self.freq {
            None => None,
            Some(hz) if hz.is_finite() && hz > 0.0 => Some(FrequencyPlan {
                rest_hz: hz,
                doppler: !self.no_doppler.unwrap_or(false),
            }),
            Some(hz) => return Err(invalid("frequency", hz)),
        };

        let radio = match (non_empty(self.radio), non_empty(self.sdrsharp)) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingRadio),
            (Some(address), None) => Some((RadioProtocol::Gqrx, address)),
            (None, Some(address)) => Some((RadioProtocol::NetRemote, address)),
            (None, None) => None,
        };
        let radio = match radio {
            Some((protocol, address)) => {
                if plan.is_none() {
                    return Err(ConfigError::MissingFrequency);
                }
                Some(RadioEndpoint {
                    protocol,
                    address: NetworkAddress::parse(&address, DEFAULT_RADIO_PORT)?,
                })
            }
            None => None,
        };

        let aos_elevation_deg = if self.send_aos_los.unwrap_or(false) {
            let threshold = self.aos_elevation.unwrap_or(DEFAULT_AOS_ELEVATION_DEG);
            check_range("AOS elevation", threshold, -90.0, 90.0)?;
            Some(threshold)
        } else {
            None
        };

        let rotor = match non_empty(self.rotor) {
            Some(value) => Some(RotorEndpoint::parse(
                &value,
                self.rotortype.unwrap_or(DEFAULT_ROTOR_MODEL),
                self.rotorbaud.unwrap_or(DEFAULT_ROTOR_BAUD),
            )?),
            None => None,
        };
        let limits = RotorLimits::new(
            self.rotorleftlimit,
            self.rotorrightlimit,
            self.rotorelevationlimit,
        )?;

        let azimuth_offset_deg = self.azcorrect.unwrap_or(0.0);
        if !azimuth_offset_deg.is_finite() {
            return Err(invalid("azimuth correction", azimuth_offset_deg));
        }

        let delay = match &self.delay {
            Some(value) => parse_duration("delay", value)?,
            None => DEFAULT_DELAY,
        };
        let timeout = match &self.timeout {
            Some(value) => parse_duration("timeout", value)?,
            None => DEFAULT_TIMEOUT,
        };
        let start = match non_empty(self.utcdate) {
            Some(value) => Some(parse_utc_date(&value)?),
            None => None,
        };

        Ok(RunConfig {
            observer,
            target,
            plan,
            radio,
            aos_elevation_deg,
            rotor,
            limits,
            below_horizon: self.below_horizon.unwrap_or_default(),
            azimuth_offset_deg,
            delay,
            timeout,
            start,
        })
    }
}

fn invalid(field: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.to_string(),
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_target(
    body: Option<&str>,
    ra: Option<&Scalar>,
    dec: Option<&Scalar>,
) -> Result<Target, ConfigError> {
    let body = body.map(str::trim).filter(|name| !name.is_empty());
    match (body, ra, dec) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::ConflictingTarget),
        (Some(name), None, None) => Body::resolve(name)
            .map(Target::Body)
            .ok_or_else(|| ConfigError::UnknownBody(name.to_string())),
        (None, Some(ra), Some(dec)) => Ok(Target::Equatorial {
            ra_deg: parse_right_ascension(ra)?,
            dec_deg: parse_declination(dec)?,
        }),
        (None, Some(_), None) | (None, None, Some(_)) => Err(ConfigError::PartialEquatorial),
        (None, None, None) => Err(ConfigError::Missing("body (or RA/Dec)")),
    }
}

const HOUR_MARKS: [&[char]; 3] = [&['h'], &['m', '\''], &['s', '"']];
const DEGREE_MARKS: [&[char]; 3] = [&['d', '°'], &['m', '\''], &['s', '"']];

/// Plain degrees, or hours such as `9h48m58.5s`.
fn parse_right_ascension(value: &Scalar) -> Result<f64, ConfigError> {
    let degrees = match value {
        Scalar::Number(degrees) => Some(*degrees),
        Scalar::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .or_else(|| parse_sexagesimal(text, &HOUR_MARKS).map(|hours| hours * 15.0)),
    };
    match degrees {
        Some(degrees) if (0.0..360.0).contains(&degrees) => Ok(degrees),
        _ => Err(invalid("right ascension", scalar_text(value))),
    }
}

/// Plain degrees, or `-10d53m17s`.
fn parse_declination(value: &Scalar) -> Result<f64, ConfigError> {
    let degrees = match value {
        Scalar::Number(degrees) => Some(*degrees),
        Scalar::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .or_else(|| parse_sexagesimal(text, &DEGREE_MARKS)),
    };
    match degrees {
        Some(degrees) if (-90.0..=90.0).contains(&degrees) => Ok(degrees),
        _ => Err(invalid("declination", scalar_text(value))),
    }
}

fn scalar_text(value: &Scalar) -> String {
    match value {
        Scalar::Number(number) => number.to_string(),
        Scalar::Text(text) => text.clone(),
    }
}

/// Parse `<a>X<b>Y<c>Z` where X, Y, Z come from `marks` in order. Any trailing
/// components may be left out; the last one may omit its mark.
fn parse_sexagesimal(text: &str, marks: &[&[char]; 3]) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut parts = [0.0_f64; 3];
    let mut next = 0;
    let mut number = String::new();
    let mut marked = false;
    for c in body.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let lower = c.to_ascii_lowercase();
            let slot = marks.iter().position(|mark| mark.contains(&lower))?;
            if slot < next || number.is_empty() {
                return None;
            }
            parts[slot] = number.parse().ok()?;
            number.clear();
            next = slot + 1;
            marked = true;
        }
    }
    if !number.is_empty() {
        if next >= parts.len() {
            return None;
        }
        parts[next] = number.parse().ok()?;
    }
    if !marked || parts[1] >= 60.0 || parts[2] >= 60.0 {
        return None;
    }

    let magnitude = parts[0] + parts[1] / 60.0 + parts[2] / 3600.0;
    Some(if negative { -magnitude } else { magnitude })
}

/// Plain seconds (`30`, `2.5`) or a humantime duration (`1m 30s`, `500ms`),
/// above zero and at most one day.
fn parse_duration(field: &'static str, value: &Scalar) -> Result<Duration, ConfigError> {
    let duration = match value {
        Scalar::Number(seconds) => Duration::try_from_secs_f64(*seconds).ok(),
        Scalar::Text(text) => match text.trim().parse::<f64>() {
            Ok(seconds) => Duration::try_from_secs_f64(seconds).ok(),
            Err(_) => humantime::parse_duration(text.trim()).ok(),
        },
    };
    match duration {
        Some(duration) if !duration.is_zero() && duration <= MAX_DURATION => Ok(duration),
        _ => Err(invalid(field, scalar_text(value))),
    }
}

/// `YYYY/MM/DD hh:mm:ss` (UTC) or RFC 3339.
fn parse_utc_date(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
    for format in ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| invalid("UTC date", value))
}
