use crate::error::CacheError;

/// What the worker needs to know about an intercepted request.
pub trait RequestInfo {
    fn url(&self) -> String;
    /// Top-level page navigation (`mode == "navigate"`).
    fn is_navigation(&self) -> bool;
}

pub trait ResponseInfo: Sized {
    /// 2xx status.
    fn is_success(&self) -> bool;
    /// Independent copy; response bodies can only be consumed once.
    fn duplicate(&self) -> Result<Self, CacheError>;
}

/// Named, versioned caches (the browser's `CacheStorage`).
#[allow(async_fn_in_trait)]
pub trait CacheStorage {
    type Request: RequestInfo;
    type Response: ResponseInfo;

    /// Open (or create) `cache_name` and fetch and store every URL as one
    /// batch. Nothing is stored if any fetch fails.
    async fn add_all(&self, cache_name: &str, urls: &[String]) -> Result<(), CacheError>;

    async fn put(
        &self,
        cache_name: &str,
        request: &Self::Request,
        response: Self::Response,
    ) -> Result<(), CacheError>;

    /// Look the request up across all caches.
    async fn match_request(
        &self,
        request: &Self::Request,
    ) -> Result<Option<Self::Response>, CacheError>;

    async fn match_url(&self, url: &str) -> Result<Option<Self::Response>, CacheError>;

    /// Names of every cache in the origin.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Returns whether a cache by that name existed.
    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError>;
}

#[allow(async_fn_in_trait)]
pub trait Network {
    type Request: RequestInfo;
    type Response: ResponseInfo;

    /// Fails only when no response arrives at all; HTTP errors are responses.
    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, CacheError>;
}
