pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Received frequency of a `rest_hz` emitter moving at `radial_velocity_m_s`
/// along the line of sight (positive = receding).
pub fn corrected_frequency(rest_hz: f64, radial_velocity_m_s: f64) -> f64 {
    rest_hz * (1.0 - radial_velocity_m_s / SPEED_OF_LIGHT_M_S)
}

/// What the receiver should be tuned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPlan {
    pub rest_hz: f64,
    pub doppler: bool,
}

impl FrequencyPlan {
    pub fn target_hz(&self, radial_velocity_m_s: f64) -> f64 {
        if self.doppler {
            corrected_frequency(self.rest_hz, radial_velocity_m_s)
        } else {
            self.rest_hz
        }
    }
}
