//! Offline cache worker — install, fetch interception and cache eviction.
//!
//! The strategy logic is independent of the browser; `crate::web` plugs the
//! Cache Storage and Fetch APIs in through the traits in `host`.

pub mod host;
pub mod offline;

pub use host::{CacheStorage, Network, RequestInfo, ResponseInfo};
pub use offline::OfflineWorker;

#[cfg(test)]
mod tests {
    use crate::config::PlayerConfig;

    const LOADER: &str = include_str!("../../www/scripts/service-worker.js");

    #[test]
    fn loader_subscribes_on_first_run() {
        // Top-level (unindented) registrations, nothing awaited before them.
        assert!(!LOADER.contains("await"));
        for (event, handler) in [
            ("install", "handleInstall"),
            ("fetch", "handleFetch"),
            ("activate", "handleActivate"),
        ] {
            let line = LOADER
                .lines()
                .find(|l| l.contains(&format!("addEventListener('{event}'")))
                .unwrap_or_else(|| panic!("no {event} listener"));
            assert!(line.starts_with("self.addEventListener"), "{event} listener is nested");
            assert!(LOADER.contains(&format!("ready.then(() => wasm_bindgen.{handler}(")));
        }
    }

    #[test]
    fn loader_lives_at_the_registered_url() {
        let url = PlayerConfig::default().service_worker_url;
        assert!(url.ends_with("scripts/service-worker.js"));
    }
}
