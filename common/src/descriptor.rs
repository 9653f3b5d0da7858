// common/src/descriptor.rs
//! The configuration descriptor (`api.json`) and its process-wide cache.
//!
//! The descriptor is fetched at most once per process lifetime. Callers that
//! arrive while the fetch is in flight attach to it instead of issuing their
//! own request.
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{UploaderError, UploaderResult};
use crate::utils::normalize_base_url;

/// Values read from the descriptor's `firebase` object. Empty means absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub api_key: String,
    pub level_server_url: String,
}

impl ServiceDescriptor {
    /// Extract the known fields from a descriptor document.
    ///
    /// Fields of the wrong type are treated as missing.
    pub fn from_json(json: &Value) -> Self {
        let firebase = json.get("firebase").filter(|v| v.is_object());
        let field = |name: &str| {
            firebase
                .and_then(|f| f.get(name))
                .and_then(Value::as_str)
        };

        Self {
            api_key: field("api_key").map(|k| k.trim().to_string()).unwrap_or_default(),
            level_server_url: field("level_server_url")
                .map(normalize_base_url)
                .unwrap_or_default(),
        }
    }

    /// Parse descriptor text. An empty document is an empty descriptor.
    pub fn parse(text: &str) -> UploaderResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let json: Value = serde_json::from_str(text)
            .map_err(|e| UploaderError::Parse(format!("Descriptor parse error: {}", e)))?;
        Ok(Self::from_json(&json))
    }

    /// The identity-service key, or the configuration error callers report
    pub fn require_api_key(&self) -> UploaderResult<&str> {
        if self.api_key.is_empty() {
            return Err(UploaderError::Config("Firebase API key missing in api.json.".to_string()));
        }
        Ok(&self.api_key)
    }
}

/// Where the descriptor document comes from
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    async fn fetch(&self) -> UploaderResult<ServiceDescriptor>;

    /// Human readable location, for logs
    fn location(&self) -> String;
}

pub struct FileDescriptorSource {
    path: PathBuf,
}

impl FileDescriptorSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DescriptorSource for FileDescriptorSource {
    async fn fetch(&self) -> UploaderResult<ServiceDescriptor> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| UploaderError::Transport(e.to_string()))?;
        ServiceDescriptor::parse(&text)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpDescriptorSource {
    client: reqwest::Client,
    url: String,
}

impl HttpDescriptorSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl DescriptorSource for HttpDescriptorSource {
    async fn fetch(&self) -> UploaderResult<ServiceDescriptor> {
        let res = self.client.get(&self.url).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UploaderError::Service {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        ServiceDescriptor::parse(&text)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source from a configured location string
pub fn source_for(location: &str, client: reqwest::Client) -> Arc<dyn DescriptorSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpDescriptorSource::new(client, location))
    } else {
        Arc::new(FileDescriptorSource::new(location))
    }
}

enum CacheState {
    Uninitialized,
    Loading(watch::Receiver<Option<Arc<ServiceDescriptor>>>),
    Ready(Arc<ServiceDescriptor>),
}

enum Step {
    Done(Arc<ServiceDescriptor>),
    Join(watch::Receiver<Option<Arc<ServiceDescriptor>>>),
    Lead(watch::Sender<Option<Arc<ServiceDescriptor>>>),
}

/// Single-flight cache around a [`DescriptorSource`].
pub struct DescriptorCache {
    source: Arc<dyn DescriptorSource>,
    state: Mutex<CacheState>,
}

impl DescriptorCache {
    pub fn new(source: Arc<dyn DescriptorSource>) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::Uninitialized),
        }
    }

    /// Cache that is already resolved, never touching a source
    pub fn ready(descriptor: ServiceDescriptor) -> Self {
        Self {
            source: Arc::new(StaticSource(descriptor.clone())),
            state: Mutex::new(CacheState::Ready(Arc::new(descriptor))),
        }
    }

    /// Resolved descriptor, if the fetch has completed
    pub fn peek(&self) -> Option<Arc<ServiceDescriptor>> {
        match &*self.state.lock() {
            CacheState::Ready(d) => Some(d.clone()),
            _ => None,
        }
    }

    /// Get the descriptor, fetching it on first use.
    ///
    /// Never fails: a failed fetch resolves to the empty descriptor.
    pub async fn get(&self) -> Arc<ServiceDescriptor> {
        loop {
            let step = {
                let mut state = self.state.lock();
                match &*state {
                    CacheState::Ready(d) => Step::Done(d.clone()),
                    CacheState::Loading(rx) => Step::Join(rx.clone()),
                    CacheState::Uninitialized => {
                        let (tx, rx) = watch::channel(None);
                        *state = CacheState::Loading(rx);
                        Step::Lead(tx)
                    }
                }
            };

            match step {
                Step::Done(descriptor) => return descriptor,
                Step::Join(mut rx) => {
                    let resolved = match rx.wait_for(Option::is_some).await {
                        Ok(value) => (*value).clone(),
                        Err(_) => None,
                    };
                    if let Some(descriptor) = resolved {
                        return descriptor;
                    }
                    // The leader was dropped before finishing; take over.
                }
                Step::Lead(tx) => return self.lead(tx).await,
            }
        }
    }

    async fn lead(&self, tx: watch::Sender<Option<Arc<ServiceDescriptor>>>) -> Arc<ServiceDescriptor> {
        let mut guard = LoadGuard { cache: self, finished: false };

        tracing::info!("Loading service descriptor from {}", self.source.location());
        let descriptor = match self.source.fetch().await {
            Ok(descriptor) => {
                if descriptor.api_key.is_empty() {
                    tracing::warn!("Service descriptor has no firebase.api_key");
                }
                descriptor
            },
            Err(e) => {
                tracing::warn!("Failed to load api.json config: {}", e);
                ServiceDescriptor::default()
            }
        };

        let descriptor = Arc::new(descriptor);
        *self.state.lock() = CacheState::Ready(descriptor.clone());
        guard.finished = true;
        let _ = tx.send(Some(descriptor.clone()));
        descriptor
    }
}

/// Resets a half-finished load so the next caller restarts it
struct LoadGuard<'a> {
    cache: &'a DescriptorCache,
    finished: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.cache.state.lock() = CacheState::Uninitialized;
        }
    }
}

struct StaticSource(ServiceDescriptor);

#[async_trait]
impl DescriptorSource for StaticSource {
    async fn fetch(&self) -> UploaderResult<ServiceDescriptor> {
        Ok(self.0.clone())
    }

    fn location(&self) -> String {
        "<static>".to_string()
    }
}
