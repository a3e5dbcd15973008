use thiserror::Error;

/// Errors raised by the page-side mixer controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Failed to fetch audio from '{url}': {reason}")]
    Fetch { url: String, reason: String },
    #[error("Failed to decode audio: {0}")]
    Decode(String),
    #[error("Audio graph error: {0}")]
    Graph(String),
    #[error("No decoded audio buffer is loaded")]
    NoBuffer,
    #[error("Orientation permission denied")]
    Permission,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JavaScript error: {0}")]
    Js(String),
}

/// Errors raised by the offline cache worker.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to open cache '{name}': {reason}")]
    Open { name: String, reason: String },
    #[error("Failed to pre-cache assets into '{name}': {reason}")]
    AddAll { name: String, reason: String },
    #[error("Cache lookup failed for '{url}': {reason}")]
    Match { url: String, reason: String },
    #[error("Failed to store '{url}' in cache: {reason}")]
    Put { url: String, reason: String },
    #[error("Failed to delete cache '{name}': {reason}")]
    Delete { name: String, reason: String },
    #[error("Network request for '{url}' failed: {reason}")]
    Network { url: String, reason: String },
}
