//! Crossfade between two stereo sources carried on one 4-channel stream.

/// Normalized crossfade position: 0 is pure source A, 1 is pure source B.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MixPosition(f64);

impl MixPosition {
    pub const CENTER: MixPosition = MixPosition(0.5);

    /// Clamp into [0, 1]. NaN collapses to the center.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return MixPosition::CENTER;
        }
        MixPosition(value.clamp(0.0, 1.0))
    }

    /// Map a range-input value (0..=100) onto a position.
    pub fn from_slider(value: f64) -> Self {
        MixPosition::new(value / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for MixPosition {
    fn default() -> Self {
        MixPosition::CENTER
    }
}

/// Gains for the four channel gain stages plus the two artwork opacities.
///
/// Channels 0/1 are the left/right of source A, channels 2/3 the left/right
/// of source B. Each pair always carries the same gain and the pairs sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixLevels {
    pub source_a: f64,
    pub source_b: f64,
}

impl MixLevels {
    pub fn from_position(position: MixPosition) -> Self {
        let n = position.value();
        MixLevels {
            source_a: 1.0 - n,
            source_b: n,
        }
    }

    /// Per-channel gains in splitter output order.
    pub fn channel_gains(&self) -> [f64; 4] {
        [self.source_a, self.source_a, self.source_b, self.source_b]
    }

    /// Opacity of the artwork for source A (fades out as B comes in).
    pub fn image_a_opacity(&self) -> f64 {
        self.source_a
    }

    pub fn image_b_opacity(&self) -> f64 {
        self.source_b
    }
}

impl Default for MixLevels {
    fn default() -> Self {
        MixLevels::from_position(MixPosition::CENTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_always_sum_to_one() {
        for i in 0..=100 {
            let levels = MixLevels::from_position(MixPosition::new(i as f64 / 100.0));
            let gains = levels.channel_gains();
            assert!((gains[0] + gains[2] - 1.0).abs() < 1e-12);
            assert!((gains[1] + gains[3] - 1.0).abs() < 1e-12);
            assert_eq!(gains[0], gains[1]);
            assert_eq!(gains[2], gains[3]);
            assert!((levels.image_a_opacity() + levels.image_b_opacity() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn endpoints_and_center() {
        let a = MixLevels::from_position(MixPosition::new(0.0));
        assert_eq!(a.channel_gains(), [1.0, 1.0, 0.0, 0.0]);

        let b = MixLevels::from_position(MixPosition::new(1.0));
        assert_eq!(b.channel_gains(), [0.0, 0.0, 1.0, 1.0]);

        let mid = MixLevels::from_position(MixPosition::new(0.5));
        assert_eq!(mid.source_a, mid.source_b);
        assert_eq!(MixLevels::default(), mid);
    }

    #[test]
    fn slider_maps_percent() {
        assert_eq!(MixPosition::from_slider(0.0).value(), 0.0);
        assert_eq!(MixPosition::from_slider(25.0).value(), 0.25);
        assert_eq!(MixPosition::from_slider(100.0).value(), 1.0);
        assert_eq!(MixPosition::from_slider(140.0).value(), 1.0);
    }

    #[test]
    fn position_is_clamped() {
        assert_eq!(MixPosition::new(-0.3).value(), 0.0);
        assert_eq!(MixPosition::new(7.0).value(), 1.0);
        assert_eq!(MixPosition::new(f64::NAN), MixPosition::CENTER);
    }
}
