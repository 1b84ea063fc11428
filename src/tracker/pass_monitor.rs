use crate::endpoint::radio::PassEvent;

pub const DEFAULT_AOS_ELEVATION_DEG: f64 = 10.0;

/// Detects the target crossing the AOS/LOS elevation boundary.
///
/// Before the first sample the target counts as below the boundary.
#[derive(Debug, Clone, Copy)]
pub struct PassMonitor {
    threshold_deg: f64,
    above: bool,
}

impl PassMonitor {
    pub fn new(threshold_deg: f64) -> Self {
        Self {
            threshold_deg,
            above: false,
        }
    }

    pub fn update(&mut self, elevation_deg: f64) -> Option<PassEvent> {
        let above = elevation_deg >= self.threshold_deg;
        let event = match (self.above, above) {
            (false, true) => Some(PassEvent::Aos),
            (true, false) => Some(PassEvent::Los),
            _ => None,
        };
        self.above = above;
        event
    }
}
