//! Feed fetch client and the loading/error/ready cache around it.
//!
//! [`FeedCache`] performs exactly one fetch per session unless explicitly
//! retried; a retry re-runs the whole pipeline and the new result fully
//! replaces the previous set. There is no in-flight deduplication — callers
//! should disable retry while [`FeedState::Loading`] — and no generation
//! check: whichever fetch completes last wins.

use std::path::Path;
use std::sync::Arc;

use call_stream_feed_models::ServiceRequest;

use crate::{FeedError, pipeline};

/// HTTP client bound to the feed's fixed URL.
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Creates a client for the given feed URL.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(url: &str) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent("call-stream/0.1")
            .build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// The feed URL this client fetches.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the raw feed text.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Transport`] on a network failure or a
    /// non-success HTTP status.
    pub async fn fetch_raw(&self) -> Result<String, FeedError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let text = response.text().await?;

        log::debug!("Downloaded {} bytes from {}", text.len(), self.url);

        Ok(text)
    }
}

/// Observable state of the feed cache.
#[derive(Debug, Clone)]
pub enum FeedState {
    /// A fetch is in flight (or none has started yet).
    Loading,
    /// The last fetch failed; carries the failure message verbatim.
    Error(String),
    /// The normalized record set from the last successful fetch, shared
    /// read-only with every rendering consumer.
    Ready(Arc<Vec<ServiceRequest>>),
}

impl FeedState {
    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The record set, when ready.
    #[must_use]
    pub const fn requests(&self) -> Option<&Arc<Vec<ServiceRequest>>> {
        match self {
            Self::Ready(requests) => Some(requests),
            Self::Loading | Self::Error(_) => None,
        }
    }
}

/// One-fetch-per-session cache over the normalized feed.
pub struct FeedCache {
    client: FeedClient,
    state: FeedState,
}

impl FeedCache {
    /// Creates a cache in the loading state, with no fetch started.
    #[must_use]
    pub const fn new(client: FeedClient) -> Self {
        Self {
            client,
            state: FeedState::Loading,
        }
    }

    /// The current cache state.
    #[must_use]
    pub const fn state(&self) -> &FeedState {
        &self.state
    }

    /// The record set from the last successful fetch, if any.
    #[must_use]
    pub const fn requests(&self) -> Option<&Arc<Vec<ServiceRequest>>> {
        self.state.requests()
    }

    /// Fetches the feed and runs it through the normalization pipeline,
    /// transitioning to `Ready` or `Error`.
    pub async fn load(&mut self) -> &FeedState {
        self.state = FeedState::Loading;
        let result = match self.client.fetch_raw().await {
            Ok(raw) => pipeline::normalize(&raw),
            Err(e) => Err(e),
        };
        self.apply(result)
    }

    /// Re-runs the full pipeline from scratch. The new result wholly
    /// replaces the previous set — there is no merge.
    pub async fn retry(&mut self) -> &FeedState {
        log::info!("Retrying feed fetch from {}", self.client.url());
        self.load().await
    }

    /// Normalizes feed text from a local file instead of the network.
    pub fn load_path(&mut self, path: &Path) -> &FeedState {
        self.state = FeedState::Loading;
        let result = std::fs::read_to_string(path)
            .map_err(FeedError::from)
            .and_then(|raw| pipeline::normalize(&raw));
        self.apply(result)
    }

    /// Normalizes already-downloaded feed text.
    pub fn load_text(&mut self, text: &str) -> &FeedState {
        self.state = FeedState::Loading;
        let result = pipeline::normalize(text);
        self.apply(result)
    }

    /// Applies a pipeline result to the cache slot — last write wins.
    fn apply(&mut self, result: Result<Vec<ServiceRequest>, FeedError>) -> &FeedState {
        self.state = match result {
            Ok(requests) => {
                log::info!("Feed ready: {} requests", requests.len());
                FeedState::Ready(Arc::new(requests))
            }
            Err(e) => {
                log::error!("Feed fetch failed: {e}");
                FeedState::Error(e.to_string())
            }
        };
        &self.state
    }
}
