//! Device tilt (front-to-back `beta` angle) to crossfade position.

use super::crossfade::MixPosition;

/// Linear window of `±range` degrees around a `neutral` tilt angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltMapping {
    pub neutral: f64,
    pub range: f64,
}

impl TiltMapping {
    pub fn new(neutral: f64, range: f64) -> Self {
        TiltMapping { neutral, range }
    }

    /// `neutral` maps to 0.5, `neutral - range` and below to 0,
    /// `neutral + range` and above to 1.
    pub fn normalize(&self, beta: f64) -> MixPosition {
        let offset = beta - self.neutral;
        MixPosition::new((offset + self.range) / (2.0 * self.range))
    }

    /// Debug indicator offset in percent of its own width, from the raw
    /// angle clamped to `±range`.
    pub fn indicator_percent(&self, beta: f64) -> f64 {
        let clamped = beta.clamp(-self.range, self.range);
        clamped / self.range * 100.0
    }
}

impl Default for TiltMapping {
    fn default() -> Self {
        TiltMapping::new(35.0, 45.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_point_is_equal_mix() {
        let m = TiltMapping::default();
        assert!((m.normalize(35.0).value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_window() {
        let m = TiltMapping::default();
        assert_eq!(m.normalize(80.0).value(), 1.0);
        assert_eq!(m.normalize(170.0).value(), 1.0);
        assert_eq!(m.normalize(-10.0).value(), 0.0);
        assert_eq!(m.normalize(-90.0).value(), 0.0);
    }

    #[test]
    fn linear_inside_window() {
        let m = TiltMapping::default();
        assert!((m.normalize(57.5).value() - 0.75).abs() < 1e-12);
        assert!((m.normalize(12.5).value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn indicator_tracks_raw_angle() {
        let m = TiltMapping::default();
        assert_eq!(m.indicator_percent(0.0), 0.0);
        assert_eq!(m.indicator_percent(22.5), 50.0);
        assert_eq!(m.indicator_percent(-100.0), -100.0);
        assert_eq!(m.indicator_percent(90.0), 100.0);
    }
}
