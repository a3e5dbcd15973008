use super::progress::Progress;

/// One run of a source node, from play/seek until stop, seek or end.
///
/// Owns the progress ticker; dropping the session cancels it.
pub struct PlaybackSession<S, T> {
    pub(crate) source: S,
    pub(crate) generation: u64,
    /// Audio-clock time at which the track's position 0 would have played.
    pub(crate) start_time: f64,
    pub(crate) duration: f64,
    pub(crate) ticker: T,
}

impl<S, T> PlaybackSession<S, T> {
    pub fn new(source: S, generation: u64, start_time: f64, duration: f64, ticker: T) -> Self {
        PlaybackSession {
            source,
            generation,
            start_time,
            duration,
            ticker,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn progress(&self, now: f64) -> Progress {
        Progress::at(now, self.start_time, self.duration)
    }

    /// Give back the source so it can be stopped; the ticker is dropped here.
    pub fn into_source(self) -> S {
        let PlaybackSession { source, ticker, .. } = self;
        drop(ticker);
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Ticker(Rc<Cell<bool>>);

    impl Drop for Ticker {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn seek_reference_keeps_progress_consistent() {
        // Seeking to 20s at clock 3.0 puts the reference at -17.0.
        let session = PlaybackSession::new((), 1, 3.0 - 20.0, 60.0, ());
        let p = session.progress(3.0 + 2.5);
        assert!((p.elapsed - 22.5).abs() < 1e-9);
    }

    #[test]
    fn releasing_source_cancels_ticker() {
        let cancelled = Rc::new(Cell::new(false));
        let session = PlaybackSession::new("src", 1, 0.0, 10.0, Ticker(cancelled.clone()));
        assert!(!cancelled.get());
        assert_eq!(session.into_source(), "src");
        assert!(cancelled.get());
    }
}
