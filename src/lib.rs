pub mod config;
pub mod device;
pub mod error;
pub mod mixer;
pub mod playback;
pub mod worker;

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::mixer::{MixPosition, TiltMapping};
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the tiltmix version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: format seconds as `M:SS`.
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    playback::format_time(seconds)
}

/// WASM-exposed: crossfade position for a tilt angle, with the default
/// 35° neutral point and ±45° window.
#[wasm_bindgen(js_name = tiltToMix)]
pub fn tilt_to_mix(beta: f64) -> f64 {
    TiltMapping::default().normalize(beta).value()
}

/// WASM-exposed: source A and source B gains for a position in [0, 1].
#[wasm_bindgen(js_name = crossfadeGains)]
pub fn crossfade_gains(normalized: f64) -> Vec<f64> {
    let levels = mixer::MixLevels::from_position(MixPosition::new(normalized));
    vec![levels.source_a, levels.source_b]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_helpers_agree_with_core() {
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(tilt_to_mix(35.0), 0.5);
        assert_eq!(crossfade_gains(0.25), vec![0.75, 0.25]);
    }
}
