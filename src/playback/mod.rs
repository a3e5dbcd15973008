//! Playback — controller state machine, sessions and progress reporting.

pub mod controller;
pub mod platform;
pub mod progress;
pub mod session;

pub use controller::{MixerController, PlaybackState, StartOutcome, ToggleOutcome};
pub use platform::{AudioPlatform, PlayerView, TriggerLabel};
pub use progress::{format_time, Progress};
pub use session::PlaybackSession;
