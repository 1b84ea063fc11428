use std::fmt;

use strum_macros::Display;

/// Solar-system bodies known to the ephemeris.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// Alternative catalog names accepted for this body.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Body::Sun => &["sol"],
            Body::Moon => &["luna"],
            Body::Mercury => &["mercury barycenter"],
            Body::Venus => &["venus barycenter"],
            Body::Mars => &["mars barycenter"],
            Body::Jupiter => &["jupiter barycenter"],
            Body::Saturn => &["saturn barycenter"],
            Body::Uranus => &["uranus barycenter"],
            Body::Neptune => &["neptune barycenter"],
        }
    }

    /// Resolve a user-supplied name, ignoring case and surrounding whitespace.
    pub fn resolve(name: &str) -> Option<Body> {
        let wanted = name.trim().to_lowercase();
        let wanted = wanted.split_whitespace().collect::<Vec<_>>().join(" ");
        if wanted.is_empty() {
            return None;
        }
        Body::ALL.into_iter().find(|body| {
            body.to_string() == wanted || body.aliases().iter().any(|alias| *alias == wanted)
        })
    }

    /// Sorted catalog listing, one entry per accepted name.
    pub fn catalog_names() -> Vec<String> {
        let mut names: Vec<String> = Body::ALL
            .iter()
            .flat_map(|body| {
                std::iter::once(body.to_string())
                    .chain(body.aliases().iter().map(|alias| alias.to_string()))
            })
            .collect();
        names.sort();
        names
    }

    /// Mean orbital elements at `d` days after 2000 Jan 0.0 UT.
    ///
    /// The Sun's elements describe the Earth-Sun geocentric orbit and the
    /// Moon's semi-major axis is in Earth radii; everything else is
    /// heliocentric in AU.
    pub(super) fn elements(self, d: f64) -> OrbitalElements {
        match self {
            Body::Sun => OrbitalElements {
                node_deg: 0.0,
                inclination_deg: 0.0,
                perihelion_deg: 282.9404 + 4.70935e-5 * d,
                semi_major_axis: 1.0,
                eccentricity: 0.016709 - 1.151e-9 * d,
                mean_anomaly_deg: 356.0470 + 0.985_600_258_5 * d,
            },
            Body::Moon => OrbitalElements {
                node_deg: 125.1228 - 0.052_953_808_3 * d,
                inclination_deg: 5.1454,
                perihelion_deg: 318.0634 + 0.164_357_322_3 * d,
                semi_major_axis: 60.2666,
                eccentricity: 0.054900,
                mean_anomaly_deg: 115.3654 + 13.064_992_950_9 * d,
            },
            Body::Mercury => OrbitalElements {
                node_deg: 48.3313 + 3.24587e-5 * d,
                inclination_deg: 7.0047 + 5.00e-8 * d,
                perihelion_deg: 29.1241 + 1.01444e-5 * d,
                semi_major_axis: 0.387098,
                eccentricity: 0.205635 + 5.59e-10 * d,
                mean_anomaly_deg: 168.6562 + 4.092_334_436_8 * d,
            },
            Body::Venus => OrbitalElements {
                node_deg: 76.6799 + 2.46590e-5 * d,
                inclination_deg: 3.3946 + 2.75e-8 * d,
                perihelion_deg: 54.8910 + 1.38374e-5 * d,
                semi_major_axis: 0.723330,
                eccentricity: 0.006773 - 1.302e-9 * d,
                mean_anomaly_deg: 48.0052 + 1.602_130_224_4 * d,
            },
            Body::Mars => OrbitalElements {
                node_deg: 49.5574 + 2.11081e-5 * d,
                inclination_deg: 1.8497 - 1.78e-8 * d,
                perihelion_deg: 286.5016 + 2.92961e-5 * d,
                semi_major_axis: 1.523688,
                eccentricity: 0.093405 + 2.516e-9 * d,
                mean_anomaly_deg: 18.6021 + 0.524_020_776_6 * d,
            },
            Body::Jupiter => OrbitalElements {
                node_deg: 100.4542 + 2.76854e-5 * d,
                inclination_deg: 1.3030 - 1.557e-7 * d,
                perihelion_deg: 273.8777 + 1.64505e-5 * d,
                semi_major_axis: 5.20256,
                eccentricity: 0.048498 + 4.469e-9 * d,
                mean_anomaly_deg: 19.8950 + 0.083_085_300_1 * d,
            },
            Body::Saturn => OrbitalElements {
                node_deg: 113.6634 + 2.38980e-5 * d,
                inclination_deg: 2.4886 - 1.081e-7 * d,
                perihelion_deg: 339.3939 + 2.97661e-5 * d,
                semi_major_axis: 9.55475,
                eccentricity: 0.055546 - 9.499e-9 * d,
                mean_anomaly_deg: 316.9670 + 0.033_444_228_2 * d,
            },
            Body::Uranus => OrbitalElements {
                node_deg: 74.0005 + 1.3978e-5 * d,
                inclination_deg: 0.7733 + 1.9e-8 * d,
                perihelion_deg: 96.6612 + 3.0565e-5 * d,
                semi_major_axis: 19.18171 - 1.55e-8 * d,
                eccentricity: 0.047318 + 7.45e-9 * d,
                mean_anomaly_deg: 142.5905 + 0.011_725_806 * d,
            },
            Body::Neptune => OrbitalElements {
                node_deg: 131.7806 + 3.0173e-5 * d,
                inclination_deg: 1.7700 - 2.55e-7 * d,
                perihelion_deg: 272.8461 - 6.027e-6 * d,
                semi_major_axis: 30.05826 + 3.313e-8 * d,
                eccentricity: 0.008606 + 2.15e-9 * d,
                mean_anomaly_deg: 260.2471 + 0.005_995_147 * d,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct OrbitalElements {
    pub node_deg: f64,
    pub inclination_deg: f64,
    pub perihelion_deg: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub mean_anomaly_deg: f64,
}

/// Ecliptic longitude/latitude in degrees and distance in the orbit's units.
#[derive(Debug, Clone, Copy)]
pub(super) struct EclipticPosition {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub distance: f64,
}

impl EclipticPosition {
    pub fn rectangular(&self) -> [f64; 3] {
        let lon = self.lon_deg.to_radians();
        let lat = self.lat_deg.to_radians();
        [
            self.distance * lon.cos() * lat.cos(),
            self.distance * lon.sin() * lat.cos(),
            self.distance * lat.sin(),
        ]
    }
}

impl OrbitalElements {
    pub fn position(&self) -> EclipticPosition {
        let e = self.eccentricity;
        let m = self.mean_anomaly_deg.rem_euclid(360.0).to_radians();
        let ecc_anomaly = solve_kepler(m, e);

        let xv = self.semi_major_axis * (ecc_anomaly.cos() - e);
        let yv = self.semi_major_axis * (1.0 - e * e).sqrt() * ecc_anomaly.sin();
        let true_anomaly = yv.atan2(xv);
        let r = xv.hypot(yv);

        let node = self.node_deg.to_radians();
        let incl = self.inclination_deg.to_radians();
        let arg = true_anomaly + self.perihelion_deg.to_radians();

        let xh = r * (node.cos() * arg.cos() - node.sin() * arg.sin() * incl.cos());
        let yh = r * (node.sin() * arg.cos() + node.cos() * arg.sin() * incl.cos());
        let zh = r * arg.sin() * incl.sin();

        EclipticPosition {
            lon_deg: yh.atan2(xh).to_degrees(),
            lat_deg: zh.atan2(xh.hypot(yh)).to_degrees(),
            distance: r,
        }
    }
}

fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc_anomaly =
        mean_anomaly + e * mean_anomaly.sin() * (1.0 + e * mean_anomaly.cos());
    for _ in 0..16 {
        let delta = (ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly)
            / (1.0 - e * ecc_anomaly.cos());
        ecc_anomaly -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc_anomaly
}

/// What the antenna should follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Body(Body),
    /// Fixed equatorial coordinates, treated as coordinates of date.
    Equatorial { ra_deg: f64, dec_deg: f64 },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Body(body) => write!(f, "{}", body),
            Target::Equatorial { ra_deg, dec_deg } => {
                write!(f, "RA {:.4}° Dec {:+.4}°", ra_deg, dec_deg)
            }
        }
    }
}
