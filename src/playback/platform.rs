//! Seams between the controller and the host environment.
//!
//! `AudioPlatform` covers the audio graph and the progress timer,
//! `PlayerView` covers every DOM mutation. The browser implementations live
//! in `crate::web`; tests drive the controller with in-memory fakes.

use std::time::Duration;

use crate::device::InputMode;
use crate::error::PlayerError;
use crate::mixer::MixLevels;

use super::progress::Progress;

/// Audio graph and timers as seen by the controller.
pub trait AudioPlatform {
    /// Decoded multi-channel audio, reused across plays.
    type Buffer;
    /// One-shot source node currently feeding the splitter.
    type Source;
    /// Repeating progress timer. Dropping it cancels the timer.
    type Ticker;
    /// Orientation event subscription. Dropping it detaches the listener.
    type TiltListener;

    /// Audio clock in seconds.
    fn current_time(&self) -> f64;

    /// Resume a suspended context (autoplay policy).
    fn resume(&mut self);

    fn suspend(&mut self);

    fn buffer_duration(&self, buffer: &Self::Buffer) -> f64;

    /// Create a source bound to `buffer`, wire it into the graph and start it
    /// `offset` seconds in. `generation` is reported back through
    /// `MixerController::on_source_ended` when the source finishes.
    fn start_source(
        &mut self,
        buffer: &Self::Buffer,
        offset: f64,
        generation: u64,
    ) -> Result<Self::Source, PlayerError>;

    /// Halt and disconnect a source.
    fn stop_source(&mut self, source: Self::Source);

    /// Assign the four channel gains.
    fn apply_levels(&mut self, levels: &MixLevels);

    fn start_ticker(&mut self, interval: Duration) -> Result<Self::Ticker, PlayerError>;
}

/// Label of the start/stop trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLabel {
    Start,
    Stop,
}

impl TriggerLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerLabel::Start => "Start",
            TriggerLabel::Stop => "Stop",
        }
    }
}

/// Visual surface of the player page.
pub trait PlayerView {
    fn set_trigger(&mut self, label: TriggerLabel, enabled: bool);
    fn set_loading(&mut self, visible: bool);
    /// Instruction heading, faded out while playing.
    fn set_title_visible(&mut self, visible: bool);
    fn set_progress(&mut self, progress: &Progress);
    /// Artwork opacities mirroring the crossfade.
    fn set_artwork(&mut self, levels: &MixLevels);
    /// Show the slider or the tilt debug readout.
    fn show_input_mode(&mut self, mode: InputMode, debug: bool);
    fn show_tilt_debug(&mut self, beta: f64, indicator_percent: f64);
    fn set_offline(&mut self, offline: bool);
    /// Non-blocking error state (load failures).
    fn show_error(&mut self, message: &str);
    /// Blocking modal message.
    fn alert(&mut self, message: &str);
}
