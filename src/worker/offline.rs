//! Install / fetch / activate handlers driven by one `CachePolicy`.

use crate::config::{CachePolicy, WorkerConfig};
use crate::error::CacheError;

use super::host::{CacheStorage, Network, RequestInfo, ResponseInfo};

pub struct OfflineWorker<S, N> {
    config: WorkerConfig,
    storage: S,
    network: N,
}

impl<S, N> OfflineWorker<S, N>
where
    S: CacheStorage,
    N: Network<Request = S::Request, Response = S::Response>,
{
    pub fn new(config: WorkerConfig, storage: S, network: N) -> Self {
        OfflineWorker {
            config,
            storage,
            network,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Pre-cache the asset list. Fails as a whole if any asset is unreachable.
    pub async fn install(&self) -> Result<(), CacheError> {
        log::info!(
            "Installing {} assets into {}",
            self.config.assets.len(),
            self.config.cache_name
        );
        self.storage
            .add_all(&self.config.cache_name, &self.config.assets)
            .await
    }

    /// Delete every cache except the current version's. Returns the names
    /// that were removed.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut removed = Vec::new();
        for name in self.storage.keys().await? {
            if name == self.config.cache_name {
                continue;
            }
            if self.storage.delete(&name).await? {
                log::info!("Evicted stale cache {name}");
                removed.push(name);
            }
        }
        Ok(removed)
    }

    /// Answer an intercepted request according to the configured policy.
    pub async fn handle_fetch(&self, request: &S::Request) -> Result<S::Response, CacheError> {
        match self.config.policy {
            CachePolicy::CacheFirst => self.cache_first(request).await,
            CachePolicy::NetworkFirstWriteThrough => self.network_first(request).await,
            CachePolicy::NavigationFallback => match self.cache_first(request).await {
                Err(e) if request.is_navigation() => self.offline_shell(e).await,
                other => other,
            },
        }
    }

    async fn cache_first(&self, request: &S::Request) -> Result<S::Response, CacheError> {
        if let Some(cached) = self.storage.match_request(request).await? {
            return Ok(cached);
        }
        self.network.fetch(request).await
    }

    async fn network_first(&self, request: &S::Request) -> Result<S::Response, CacheError> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.write_through(request, &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                log::debug!("Network failed for {}, trying cache", request.url());
                match self.storage.match_request(request).await? {
                    Some(cached) => Ok(cached),
                    None => Err(e),
                }
            }
        }
    }

    /// Best effort: a failed write leaves the previous entry in place.
    async fn write_through(&self, request: &S::Request, response: &S::Response) {
        let copy = match response.duplicate() {
            Ok(copy) => copy,
            Err(e) => {
                log::warn!("Could not clone response for {}: {e}", request.url());
                return;
            }
        };
        if let Err(e) = self
            .storage
            .put(&self.config.cache_name, request, copy)
            .await
        {
            log::warn!("{e}");
        }
    }

    async fn offline_shell(&self, error: CacheError) -> Result<S::Response, CacheError> {
        log::debug!("Navigation failed ({error}), serving {}", self.config.offline_shell);
        match self.storage.match_url(&self.config.offline_shell).await? {
            Some(shell) => Ok(shell),
            None => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Resp {
        status: u16,
        body: String,
    }

    impl ResponseInfo for Resp {
        fn is_success(&self) -> bool {
            (200..300).contains(&self.status)
        }

        fn duplicate(&self) -> Result<Self, CacheError> {
            Ok(self.clone())
        }
    }

    struct Req {
        url: String,
        navigate: bool,
    }

    fn get(url: &str) -> Req {
        Req {
            url: url.to_string(),
            navigate: false,
        }
    }

    fn navigate(url: &str) -> Req {
        Req {
            url: url.to_string(),
            navigate: true,
        }
    }

    impl RequestInfo for Req {
        fn url(&self) -> String {
            self.url.clone()
        }

        fn is_navigation(&self) -> bool {
            self.navigate
        }
    }

    /// Origin server shared by the fake network and the fake `addAll`.
    #[derive(Default)]
    struct Server {
        online: Cell<bool>,
        files: RefCell<BTreeMap<String, Resp>>,
        hits: Cell<usize>,
    }

    impl Server {
        fn serve(&self, url: &str) -> Result<Resp, CacheError> {
            self.hits.set(self.hits.get() + 1);
            if !self.online.get() {
                return Err(CacheError::Network {
                    url: url.to_string(),
                    reason: "offline".to_string(),
                });
            }
            Ok(self.files.borrow().get(url).cloned().unwrap_or(Resp {
                status: 404,
                body: String::new(),
            }))
        }
    }

    struct FakeNetwork(Rc<Server>);

    impl Network for FakeNetwork {
        type Request = Req;
        type Response = Resp;

        async fn fetch(&self, request: &Req) -> Result<Resp, CacheError> {
            self.0.serve(&request.url)
        }
    }

    struct FakeCaches {
        server: Rc<Server>,
        caches: RefCell<BTreeMap<String, BTreeMap<String, Resp>>>,
    }

    impl CacheStorage for FakeCaches {
        type Request = Req;
        type Response = Resp;

        async fn add_all(&self, cache_name: &str, urls: &[String]) -> Result<(), CacheError> {
            let mut batch = BTreeMap::new();
            for url in urls {
                let resp = self.server.serve(url)?;
                if !resp.is_success() {
                    return Err(CacheError::AddAll {
                        name: cache_name.to_string(),
                        reason: format!("{url} returned {}", resp.status),
                    });
                }
                batch.insert(url.clone(), resp);
            }
            self.caches
                .borrow_mut()
                .entry(cache_name.to_string())
                .or_default()
                .extend(batch);
            Ok(())
        }

        async fn put(&self, cache_name: &str, request: &Req, response: Resp) -> Result<(), CacheError> {
            self.caches
                .borrow_mut()
                .entry(cache_name.to_string())
                .or_default()
                .insert(request.url.clone(), response);
            Ok(())
        }

        async fn match_request(&self, request: &Req) -> Result<Option<Resp>, CacheError> {
            self.match_url(&request.url).await
        }

        async fn match_url(&self, url: &str) -> Result<Option<Resp>, CacheError> {
            Ok(self
                .caches
                .borrow()
                .values()
                .find_map(|entries| entries.get(url).cloned()))
        }

        async fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(self.caches.borrow().keys().cloned().collect())
        }

        async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
            Ok(self.caches.borrow_mut().remove(cache_name).is_some())
        }
    }

    fn ok(body: &str) -> Resp {
        Resp {
            status: 200,
            body: body.to_string(),
        }
    }

    fn worker(policy: CachePolicy) -> (OfflineWorker<FakeCaches, FakeNetwork>, Rc<Server>) {
        let server = Rc::new(Server::default());
        server.online.set(true);
        for url in ["./", "./style.css", "./audio/wasser.mp3"] {
            server.files.borrow_mut().insert(url.to_string(), ok(url));
        }
        let config = WorkerConfig {
            cache_name: "mixer-v3".to_string(),
            assets: vec!["./".into(), "./style.css".into(), "./audio/wasser.mp3".into()],
            policy,
            offline_shell: "./".to_string(),
        };
        let storage = FakeCaches {
            server: server.clone(),
            caches: RefCell::new(BTreeMap::new()),
        };
        let network = FakeNetwork(server.clone());
        (OfflineWorker::new(config, storage, network), server)
    }

    #[test]
    fn install_caches_every_asset() {
        let (w, _) = worker(CachePolicy::CacheFirst);
        block_on(w.install()).unwrap();
        let caches = w.storage.caches.borrow();
        assert_eq!(caches["mixer-v3"].len(), 3);
    }

    #[test]
    fn install_is_all_or_nothing() {
        let (w, server) = worker(CachePolicy::CacheFirst);
        server.files.borrow_mut().remove("./audio/wasser.mp3");
        assert!(block_on(w.install()).is_err());
        assert!(w.storage.caches.borrow().is_empty());
    }

    #[test]
    fn activate_evicts_other_versions() {
        let (w, _) = worker(CachePolicy::CacheFirst);
        {
            let mut caches = w.storage.caches.borrow_mut();
            caches.insert("audio-mixer-cache-v1".into(), BTreeMap::new());
            caches.insert("audio-mixer-cache-v2".into(), BTreeMap::new());
        }
        block_on(w.install()).unwrap();
        let removed = block_on(w.activate()).unwrap();
        assert_eq!(removed, vec!["audio-mixer-cache-v1", "audio-mixer-cache-v2"]);
        assert_eq!(block_on(w.storage.keys()).unwrap(), vec!["mixer-v3"]);
    }

    #[test]
    fn cache_first_skips_network_for_cached_urls() {
        let (w, server) = worker(CachePolicy::CacheFirst);
        block_on(w.install()).unwrap();
        let hits = server.hits.get();

        let resp = block_on(w.handle_fetch(&get("./style.css"))).unwrap();
        assert_eq!(resp.body, "./style.css");
        assert_eq!(server.hits.get(), hits);
    }

    #[test]
    fn cache_first_falls_back_to_network_without_writing() {
        let (w, server) = worker(CachePolicy::CacheFirst);
        block_on(w.install()).unwrap();
        server.files.borrow_mut().insert("./extra.js".into(), ok("extra"));

        let resp = block_on(w.handle_fetch(&get("./extra.js"))).unwrap();
        assert_eq!(resp.body, "extra");
        assert!(block_on(w.storage.match_url("./extra.js")).unwrap().is_none());
    }

    #[test]
    fn cache_first_never_refreshes() {
        let (w, server) = worker(CachePolicy::CacheFirst);
        block_on(w.install()).unwrap();
        server.files.borrow_mut().insert("./style.css".into(), ok("new"));
        let resp = block_on(w.handle_fetch(&get("./style.css"))).unwrap();
        assert_eq!(resp.body, "./style.css");
    }

    #[test]
    fn network_first_writes_through() {
        let (w, server) = worker(CachePolicy::NetworkFirstWriteThrough);
        block_on(w.install()).unwrap();
        server.files.borrow_mut().insert("./style.css".into(), ok("new"));

        let resp = block_on(w.handle_fetch(&get("./style.css"))).unwrap();
        assert_eq!(resp.body, "new");

        server.online.set(false);
        let resp = block_on(w.handle_fetch(&get("./style.css"))).unwrap();
        assert_eq!(resp.body, "new");
    }

    #[test]
    fn network_first_does_not_cache_errors() {
        let (w, _) = worker(CachePolicy::NetworkFirstWriteThrough);
        let resp = block_on(w.handle_fetch(&get("./missing.png"))).unwrap();
        assert_eq!(resp.status, 404);
        assert!(block_on(w.storage.match_url("./missing.png")).unwrap().is_none());
    }

    #[test]
    fn navigation_fallback_serves_shell_offline() {
        let (w, server) = worker(CachePolicy::NavigationFallback);
        block_on(w.install()).unwrap();
        server.online.set(false);

        let resp = block_on(w.handle_fetch(&navigate("./player?track=2"))).unwrap();
        assert_eq!(resp.body, "./");

        let err = block_on(w.handle_fetch(&get("./player.js"))).unwrap_err();
        assert!(matches!(err, CacheError::Network { .. }));
    }

    #[test]
    fn cache_first_offline_uncached_fails() {
        let (w, server) = worker(CachePolicy::CacheFirst);
        server.online.set(false);
        assert!(block_on(w.handle_fetch(&navigate("./"))).is_err());
    }
}
