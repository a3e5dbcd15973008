//! Progress math and time formatting.

/// Playback position relative to the track, as shown by the progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Seconds into the track.
    pub elapsed: f64,
    /// Track length in seconds (0 when unknown).
    pub duration: f64,
}

impl Progress {
    /// Derive progress from the audio clock and the session's start reference.
    pub fn at(now: f64, start_time: f64, duration: f64) -> Self {
        Progress {
            elapsed: (now - start_time).max(0.0),
            duration,
        }
    }

    /// Whether there is anything to render yet.
    pub fn is_known(&self) -> bool {
        self.duration > 0.0
    }

    /// Bar width in percent, capped at 100 for the last tick before `ended`.
    pub fn percent(&self) -> f64 {
        if !self.is_known() {
            return 0.0;
        }
        (self.elapsed / self.duration * 100.0).min(100.0)
    }

    /// `"M:SS / M:SS"` readout.
    pub fn label(&self) -> String {
        format!("{} / {}", format_time(self.elapsed), format_time(self.duration))
    }
}

/// Format seconds as `M:SS`, truncating fractional seconds.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(599.0), "9:59");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn negative_and_nan_format_as_zero() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn ten_seconds_into_a_minute() {
        let p = Progress::at(110.0, 100.0, 60.0);
        assert!((p.percent() - 100.0 / 6.0).abs() < 1e-9);
        assert_eq!(p.label(), "0:10 / 1:00");
    }

    #[test]
    fn unknown_duration_renders_nothing() {
        let p = Progress::at(5.0, 0.0, 0.0);
        assert!(!p.is_known());
        assert_eq!(p.percent(), 0.0);
    }

    #[test]
    fn percent_is_capped() {
        let p = Progress::at(61.0, 0.0, 60.0);
        assert_eq!(p.percent(), 100.0);
    }
}
