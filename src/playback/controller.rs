//! Mixer controller — playback lifecycle and input routing.
//!
//! Playback moves `Idle → Loading → Playing → Idle`. Seeking replaces the
//! running session without passing through `Idle`. Slider and tilt input both
//! end in `set_mix`.

use std::time::Duration;

use crate::config::PlayerConfig;
use crate::device::InputMode;
use crate::error::PlayerError;
use crate::mixer::{MixLevels, MixPosition, TiltMapping};

use super::platform::{AudioPlatform, PlayerView, TriggerLabel};
use super::session::PlaybackSession;

const PERMISSION_DENIED: &str = "Permission denied for accessing orientation data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Playing,
}

/// What the host must do after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The cached buffer is playing.
    Playing,
    /// Fetch and decode `url`, then hand the result to `finish_load`.
    Fetch { url: String },
    /// A load is already in flight; nothing to do.
    AlreadyLoading,
}

/// Result of the start/stop trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started(StartOutcome),
    Stopped,
}

pub struct MixerController<P: AudioPlatform, V: PlayerView> {
    platform: P,
    view: V,
    config: PlayerConfig,
    input_mode: InputMode,
    tilt: TiltMapping,
    levels: MixLevels,
    state: PlaybackState,
    buffer: Option<P::Buffer>,
    session: Option<PlaybackSession<P::Source, P::Ticker>>,
    tilt_listener: Option<P::TiltListener>,
    generation: u64,
}

impl<P: AudioPlatform, V: PlayerView> MixerController<P, V> {
    pub fn new(platform: P, view: V, config: PlayerConfig, input_mode: InputMode) -> Self {
        let tilt = TiltMapping::new(config.neutral_tilt_degrees, config.tilt_range_degrees);
        MixerController {
            platform,
            view,
            config,
            input_mode,
            tilt,
            levels: MixLevels::default(),
            state: PlaybackState::Idle,
            buffer: None,
            session: None,
            tilt_listener: None,
            generation: 0,
        }
    }

    /// Show the controls for the detected input mode and apply the initial mix.
    pub fn initialize(&mut self) {
        log::info!("Initializing mixer with {:?} input", self.input_mode);
        self.view
            .show_input_mode(self.input_mode, self.config.debug);
        self.view.set_trigger(TriggerLabel::Start, true);
        self.set_mix(MixPosition::new(self.config.initial_mix));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn levels(&self) -> MixLevels {
        self.levels
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn session(&self) -> Option<&PlaybackSession<P::Source, P::Ticker>> {
        self.session.as_ref()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// True when a started tilt device still has no orientation listener.
    pub fn needs_tilt_listener(&self) -> bool {
        self.input_mode == InputMode::Tilt
            && self.tilt_listener.is_none()
            && self.state != PlaybackState::Idle
    }

    // ── Mix ─────────────────────────────────────────────────

    /// Apply complementary gains and mirror them into the artwork.
    pub fn set_mix(&mut self, position: MixPosition) {
        self.levels = MixLevels::from_position(position);
        self.platform.apply_levels(&self.levels);
        self.view.set_artwork(&self.levels);
    }

    /// Range input value in 0..=100.
    pub fn on_slider(&mut self, value: f64) {
        self.set_mix(MixPosition::from_slider(value));
    }

    /// Front-to-back tilt in degrees. `None` when the sensor reports null.
    pub fn on_tilt(&mut self, beta: Option<f64>) {
        let Some(beta) = beta else {
            return;
        };
        if self.config.debug {
            self.view
                .show_tilt_debug(beta, self.tilt.indicator_percent(beta));
        }
        self.set_mix(self.tilt.normalize(beta));
    }

    // ── Orientation permission ──────────────────────────────

    /// Record the permission answer. `Ok` means a listener may be attached.
    pub fn on_permission(&mut self, granted: bool) -> Result<(), PlayerError> {
        if granted {
            log::debug!("Orientation permission granted");
            return Ok(());
        }
        log::warn!("Orientation permission denied; tilt input disabled");
        self.view.alert(PERMISSION_DENIED);
        Err(PlayerError::Permission)
    }

    /// Keep the listener alive for the current playback run. A listener that
    /// arrives after playback already stopped is dropped at once.
    pub fn attach_tilt(&mut self, listener: P::TiltListener) {
        if self.state == PlaybackState::Idle {
            log::debug!("Playback stopped before orientation listener attached");
            return;
        }
        self.tilt_listener = Some(listener);
    }

    // ── Connectivity ────────────────────────────────────────

    pub fn set_online(&mut self, online: bool) {
        self.view.set_offline(!online);
    }

    // ── Playback ────────────────────────────────────────────

    /// Start/stop trigger.
    pub fn toggle(&mut self) -> Result<ToggleOutcome, PlayerError> {
        match self.state {
            PlaybackState::Playing => {
                self.stop();
                Ok(ToggleOutcome::Stopped)
            }
            PlaybackState::Idle | PlaybackState::Loading => {
                Ok(ToggleOutcome::Started(self.start()?))
            }
        }
    }

    /// Play the cached buffer, or ask the host to load it first.
    pub fn start(&mut self) -> Result<StartOutcome, PlayerError> {
        match self.state {
            PlaybackState::Loading => {
                log::debug!("Start ignored: audio is still loading");
                return Ok(StartOutcome::AlreadyLoading);
            }
            PlaybackState::Playing => return Ok(StartOutcome::Playing),
            PlaybackState::Idle => {}
        }

        self.view.set_title_visible(false);
        if self.buffer.is_some() {
            self.view.set_trigger(TriggerLabel::Stop, true);
            self.play()?;
            return Ok(StartOutcome::Playing);
        }

        log::info!("Loading audio from {}", self.config.audio_url);
        self.state = PlaybackState::Loading;
        self.view.set_loading(true);
        self.view.set_trigger(TriggerLabel::Stop, false);
        Ok(StartOutcome::Fetch {
            url: self.config.audio_url.clone(),
        })
    }

    /// Complete a load started by `start`. The buffer is kept either way;
    /// playback only begins if nothing stopped the load in the meantime.
    pub fn finish_load(&mut self, result: Result<P::Buffer, PlayerError>) -> Result<(), PlayerError> {
        self.view.set_loading(false);
        match result {
            Ok(buffer) => {
                self.buffer = Some(buffer);
                if self.state != PlaybackState::Loading {
                    log::debug!("Audio decoded after stop; keeping buffer for next start");
                    return Ok(());
                }
                self.view.set_trigger(TriggerLabel::Stop, true);
                self.play()
            }
            Err(e) => {
                log::error!("Error loading audio: {e}");
                if self.state == PlaybackState::Loading {
                    self.abort(&e);
                }
                Err(e)
            }
        }
    }

    /// Resume the context and play the cached buffer from the beginning.
    pub fn play(&mut self) -> Result<(), PlayerError> {
        if self.buffer.is_none() {
            return Err(PlayerError::NoBuffer);
        }
        self.platform.resume();
        self.begin_session(0.0)
    }

    /// Halt the current source, suspend the context, cancel the progress
    /// timer and detach the tilt listener.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            self.platform.stop_source(session.into_source());
        }
        self.platform.suspend();
        self.tilt_listener = None;
        if self.state == PlaybackState::Loading {
            self.view.set_loading(false);
        }
        self.state = PlaybackState::Idle;
        self.view.set_trigger(TriggerLabel::Start, true);
        self.view.set_title_visible(true);
    }

    /// Restart the buffer at `target` seconds. Ignored unless playing.
    pub fn seek(&mut self, target: f64) -> Result<(), PlayerError> {
        let Some(duration) = self.session.as_ref().map(|s| s.duration()) else {
            log::debug!("Seek ignored: nothing is playing");
            return Ok(());
        };
        let target = if target.is_finite() {
            target.clamp(0.0, duration)
        } else {
            0.0
        };
        log::debug!("Seeking to {target:.2}s");
        self.begin_session(target)
    }

    /// Seek from a click at `x` pixels across a bar `width` pixels wide.
    pub fn seek_fraction(&mut self, x: f64, width: f64) -> Result<(), PlayerError> {
        if !(width > 0.0) {
            return Ok(());
        }
        let Some(duration) = self.session.as_ref().map(|s| s.duration()) else {
            return Ok(());
        };
        self.seek(x / width * duration)
    }

    /// Progress timer callback.
    pub fn tick(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let progress = session.progress(self.platform.current_time());
        if progress.is_known() {
            self.view.set_progress(&progress);
        }
    }

    /// `ended` callback of the source started with `generation`. Sources that
    /// were replaced by a seek report with an older generation and are ignored.
    pub fn on_source_ended(&mut self, generation: u64) {
        let current = self.session.as_ref().map(|s| s.generation());
        if current == Some(generation) {
            log::info!("Playback finished");
            self.stop();
        } else {
            log::debug!("Ignoring ended event from replaced source {generation}");
        }
    }

    /// Back to `Idle` with the failure surfaced on the page.
    fn abort(&mut self, error: &PlayerError) {
        self.stop();
        self.view.show_error(&error.to_string());
    }

    fn begin_session(&mut self, offset: f64) -> Result<(), PlayerError> {
        let result = self.replace_session(offset);
        if let Err(e) = &result {
            log::error!("Failed to start playback: {e}");
            self.abort(e);
        }
        result
    }

    fn replace_session(&mut self, offset: f64) -> Result<(), PlayerError> {
        if let Some(previous) = self.session.take() {
            self.platform.stop_source(previous.into_source());
        }
        let buffer = self.buffer.as_ref().ok_or(PlayerError::NoBuffer)?;

        self.generation += 1;
        let duration = self.platform.buffer_duration(buffer);
        let source = self
            .platform
            .start_source(buffer, offset, self.generation)?;
        let start_time = self.platform.current_time() - offset;
        let interval = Duration::from_millis(u64::from(self.config.progress_interval_ms));
        let ticker = match self.platform.start_ticker(interval) {
            Ok(ticker) => ticker,
            Err(e) => {
                self.platform.stop_source(source);
                return Err(e);
            }
        };

        self.session = Some(PlaybackSession::new(
            source,
            self.generation,
            start_time,
            duration,
            ticker,
        ));
        self.state = PlaybackState::Playing;
        self.tick();
        Ok(())
    }
}
