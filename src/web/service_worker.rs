//! Offline worker bound to `ServiceWorkerGlobalScope` events.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    Cache, CacheStorage as JsCacheStorage, Request, RequestMode, Response,
    ServiceWorkerGlobalScope,
};

use crate::config::WorkerConfig;
use crate::error::CacheError;
use crate::worker::{CacheStorage, Network, OfflineWorker, RequestInfo, ResponseInfo};

use super::{config_from_js, describe, init_logging, to_js};

impl RequestInfo for Request {
    fn url(&self) -> String {
        Request::url(self)
    }

    fn is_navigation(&self) -> bool {
        self.mode() == RequestMode::Navigate
    }
}

impl ResponseInfo for Response {
    fn is_success(&self) -> bool {
        self.ok()
    }

    fn duplicate(&self) -> Result<Self, CacheError> {
        Response::clone(self).map_err(|e| CacheError::Put {
            url: self.url(),
            reason: describe(&e),
        })
    }
}

async fn settle(promise: Promise) -> Result<JsValue, String> {
    JsFuture::from(promise).await.map_err(|e| describe(&e))
}

pub struct BrowserCaches {
    caches: JsCacheStorage,
}

impl BrowserCaches {
    async fn open(&self, name: &str) -> Result<Cache, CacheError> {
        let open_error = |reason: String| CacheError::Open {
            name: name.to_string(),
            reason,
        };
        settle(self.caches.open(name))
            .await
            .map_err(open_error)?
            .dyn_into::<Cache>()
            .map_err(|e| open_error(describe(&e)))
    }

    fn response(value: JsValue, url: &str) -> Result<Option<Response>, CacheError> {
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        value
            .dyn_into::<Response>()
            .map(Some)
            .map_err(|e| CacheError::Match {
                url: url.to_string(),
                reason: describe(&e),
            })
    }
}

impl CacheStorage for BrowserCaches {
    type Request = Request;
    type Response = Response;

    async fn add_all(&self, cache_name: &str, urls: &[String]) -> Result<(), CacheError> {
        let cache = self.open(cache_name).await?;
        let list: Array = urls.iter().map(|url| JsValue::from_str(url)).collect();
        settle(cache.add_all_with_str_sequence(&list))
            .await
            .map(|_| ())
            .map_err(|reason| CacheError::AddAll {
                name: cache_name.to_string(),
                reason,
            })
    }

    async fn put(
        &self,
        cache_name: &str,
        request: &Request,
        response: Response,
    ) -> Result<(), CacheError> {
        let cache = self.open(cache_name).await?;
        settle(cache.put_with_request(request, &response))
            .await
            .map(|_| ())
            .map_err(|reason| CacheError::Put {
                url: request.url(),
                reason,
            })
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let url = request.url();
        let value = settle(self.caches.match_with_request(request))
            .await
            .map_err(|reason| CacheError::Match {
                url: url.clone(),
                reason,
            })?;
        Self::response(value, &url)
    }

    async fn match_url(&self, url: &str) -> Result<Option<Response>, CacheError> {
        let value = settle(self.caches.match_with_str(url))
            .await
            .map_err(|reason| CacheError::Match {
                url: url.to_string(),
                reason,
            })?;
        Self::response(value, url)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let value = settle(self.caches.keys())
            .await
            .map_err(|reason| CacheError::Open {
                name: "*".to_string(),
                reason,
            })?;
        Ok(Array::from(&value)
            .iter()
            .filter_map(|name| name.as_string())
            .collect())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
        settle(self.caches.delete(cache_name))
            .await
            .map(|deleted| deleted.as_bool().unwrap_or(false))
            .map_err(|reason| CacheError::Delete {
                name: cache_name.to_string(),
                reason,
            })
    }
}

pub struct BrowserNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl Network for BrowserNetwork {
    type Request = Request;
    type Response = Response;

    async fn fetch(&self, request: &Request) -> Result<Response, CacheError> {
        let network_error = |reason: String| CacheError::Network {
            url: request.url(),
            reason,
        };
        settle(self.scope.fetch_with_request(request))
            .await
            .map_err(network_error)?
            .dyn_into::<Response>()
            .map_err(|e| network_error(describe(&e)))
    }
}

type BrowserWorker = OfflineWorker<BrowserCaches, BrowserNetwork>;

// Service-worker events must be subscribed during the script's first run,
// before the wasm module can finish loading. The loader script
// (`www/scripts/service-worker.js`) adds the listeners synchronously and
// forwards each event here once the module is ready.

thread_local! {
    static WORKER: RefCell<Option<Rc<BrowserWorker>>> = const { RefCell::new(None) };
}

fn build(config: WorkerConfig) -> Result<Rc<BrowserWorker>, JsValue> {
    config.validate().map_err(to_js)?;
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let caches = scope.caches()?;
    Ok(Rc::new(OfflineWorker::new(
        config,
        BrowserCaches { caches },
        BrowserNetwork { scope },
    )))
}

/// The configured worker, or one with the default config.
fn current() -> Result<Rc<BrowserWorker>, JsValue> {
    if let Some(worker) = WORKER.with(|slot| slot.borrow().clone()) {
        return Ok(worker);
    }
    let worker = build(WorkerConfig::default())?;
    WORKER.with(|slot| *slot.borrow_mut() = Some(worker.clone()));
    Ok(worker)
}

/// WASM-exposed: set the cache name, asset list and policy. Optional; the
/// handlers fall back to the defaults.
#[wasm_bindgen(js_name = configureOfflineWorker)]
pub fn configure_offline_worker(config: JsValue) -> Result<(), JsValue> {
    init_logging(false);
    let worker = build(config_from_js(config)?)?;
    WORKER.with(|slot| *slot.borrow_mut() = Some(worker));
    Ok(())
}

/// WASM-exposed: pre-cache the asset list. Pass the promise to
/// `event.waitUntil` so a failed batch fails the install.
#[wasm_bindgen(js_name = handleInstall)]
pub fn handle_install() -> Promise {
    future_to_promise(async move {
        let worker = current()?;
        worker.install().await.map_err(|e| {
            log::error!("{e}");
            to_js(e)
        })?;
        Ok::<JsValue, JsValue>(JsValue::UNDEFINED)
    })
}

/// WASM-exposed: answer an intercepted request. Pass the promise to
/// `event.respondWith`.
#[wasm_bindgen(js_name = handleFetch)]
pub fn handle_fetch(request: Request) -> Promise {
    future_to_promise(async move {
        let worker = current()?;
        worker
            .handle_fetch(&request)
            .await
            .map(JsValue::from)
            .map_err(to_js)
    })
}

/// WASM-exposed: evict caches from older versions. Resolves to the list of
/// removed cache names.
#[wasm_bindgen(js_name = handleActivate)]
pub fn handle_activate() -> Promise {
    future_to_promise(async move {
        let worker = current()?;
        let removed = worker.activate().await.map_err(to_js)?;
        log::info!("Activated {}; removed {removed:?}", worker.config().cache_name);
        let removed: Array = removed.into_iter().map(JsValue::from).collect();
        Ok::<JsValue, JsValue>(removed.into())
    })
}
