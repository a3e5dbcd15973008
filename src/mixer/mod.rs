//! Mixer — crossfade law and input mapping.
//!
//! Both input modalities (slider on desktop, device tilt on mobile) reduce
//! to a single `MixPosition`, which is turned into gain and opacity levels.

pub mod crossfade;
pub mod tilt;

pub use crossfade::{MixLevels, MixPosition};
pub use tilt::TiltMapping;
