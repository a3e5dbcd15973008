//! Runtime configuration for the page controller and the offline worker.
//!
//! Both configs are plain serde structs with camelCase keys so they can be
//! handed over from JavaScript as object literals (or JSON). Every field has
//! a default, so an empty object yields the stock setup.

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// Settings for the page-side mixer controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Four-channel audio file fetched on first start.
    pub audio_url: String,
    /// Progress polling period.
    pub progress_interval_ms: u32,
    /// Tilt angle (beta, degrees) mapped to an equal mix.
    pub neutral_tilt_degrees: f64,
    /// Half-width of the tilt window around the neutral point.
    pub tilt_range_degrees: f64,
    /// Mix position applied before any input arrives.
    pub initial_mix: f64,
    /// Shows the tilt readout and indicator bar on tilt devices.
    pub debug: bool,
    /// Offline worker script, registered once on page load.
    pub service_worker_url: String,
    /// Try to lock the screen to portrait.
    pub lock_portrait: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            audio_url: "audio/version5.m4a".to_string(),
            progress_interval_ms: 100,
            neutral_tilt_degrees: 35.0,
            tilt_range_degrees: 45.0,
            initial_mix: 0.5,
            debug: false,
            service_worker_url: "/scripts/service-worker.js".to_string(),
            lock_portrait: true,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.audio_url.is_empty() {
            return Err(PlayerError::Config("audioUrl must not be empty".into()));
        }
        if self.progress_interval_ms == 0 {
            return Err(PlayerError::Config(
                "progressIntervalMs must be positive".into(),
            ));
        }
        if !(self.tilt_range_degrees > 0.0) {
            return Err(PlayerError::Config(
                "tiltRangeDegrees must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_mix) {
            return Err(PlayerError::Config(
                "initialMix must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// How the offline worker answers intercepted requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Serve the cached entry if present, otherwise go to the network.
    /// Entries are never refreshed after install.
    #[default]
    CacheFirst,
    /// Go to the network first and write successful responses back into the
    /// cache; fall back to the cached entry when the network fails.
    NetworkFirstWriteThrough,
    /// Cache-first, and failed navigations are answered with the cached
    /// offline shell page.
    NavigationFallback,
}

/// Settings for the offline cache worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerConfig {
    /// Versioned cache name. Every other cache is evicted on activate.
    pub cache_name: String,
    /// URLs pre-cached as one batch on install.
    pub assets: Vec<String>,
    pub policy: CachePolicy,
    /// Page served for failed navigations under `NavigationFallback`.
    pub offline_shell: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            cache_name: "audio-mixer-cache-v2".to_string(),
            assets: [
                "./",
                "./index.html",
                "./audio/wasser.mp3",
                "./audio/orchester.mp3",
                "./images/icon-192x192.png",
                "./images/icon-512x512.png",
                "./manifest.json",
                "./style.css",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            policy: CachePolicy::CacheFirst,
            offline_shell: "./".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.cache_name.is_empty() {
            return Err(PlayerError::Config("cacheName must not be empty".into()));
        }
        if self.assets.is_empty() {
            return Err(PlayerError::Config("assets must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn parse<T: DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse::<PlayerConfig>("{}");
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.progress_interval_ms, 100);
        assert_eq!(config.neutral_tilt_degrees, 35.0);
    }

    #[test]
    fn camel_case_keys() {
        let config: PlayerConfig = parse(r#"{"audioUrl":"audio/mix.m4a","debug":true}"#);
        assert_eq!(config.audio_url, "audio/mix.m4a");
        assert!(config.debug);
        assert_eq!(config.tilt_range_degrees, 45.0);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = parse::<PlayerConfig>(r#"{"progressIntervalMs":0}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PlayerError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_initial_mix() {
        assert!(parse::<PlayerConfig>(r#"{"initialMix":1.5}"#).validate().is_err());
    }

    #[test]
    fn policy_names_are_kebab_case() {
        let config: WorkerConfig = parse(r#"{"policy":"network-first-write-through"}"#);
        config.validate().unwrap();
        assert_eq!(config.policy, CachePolicy::NetworkFirstWriteThrough);
        assert_eq!(config.cache_name, "audio-mixer-cache-v2");
        assert_eq!(config.assets.len(), 8);
    }

    #[test]
    fn worker_rejects_empty_assets() {
        assert!(parse::<WorkerConfig>(r#"{"assets":[]}"#).validate().is_err());
    }
}
