//! Input capability detection.
//!
//! The page picks its input modality from what the browser actually exposes
//! (orientation events, pointer coarseness) and only falls back to the
//! user-agent string when pointer information is missing.

/// What the current browser supports, as detected by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `DeviceOrientationEvent` exists on the window.
    pub orientation_events: bool,
    /// `DeviceOrientationEvent.requestPermission` is a function (iOS 13+).
    pub orientation_permission_prompt: bool,
    /// Result of `(pointer: coarse)`, `None` when media queries are unavailable.
    pub coarse_pointer: Option<bool>,
    /// Whether the user agent looks like a phone or tablet.
    pub user_agent_mobile: bool,
}

/// How the user drives the crossfade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Slider,
    Tilt,
}

/// How orientation access is obtained on a tilt device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionFlow {
    /// Events flow as soon as a listener is attached.
    Implicit,
    /// A permission prompt must be raised from a user gesture first.
    Prompt,
}

impl Capabilities {
    pub fn input_mode(&self) -> InputMode {
        if !self.orientation_events {
            return InputMode::Slider;
        }
        let touch_device = self.coarse_pointer.unwrap_or(self.user_agent_mobile);
        if touch_device {
            InputMode::Tilt
        } else {
            InputMode::Slider
        }
    }

    pub fn permission_flow(&self) -> PermissionFlow {
        if self.orientation_permission_prompt {
            PermissionFlow::Prompt
        } else {
            PermissionFlow::Implicit
        }
    }
}

/// Case-insensitive `Mobi` / `Android` substring test on a user-agent string.
pub fn user_agent_is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ua.contains("mobi") || ua.contains("android")
}
