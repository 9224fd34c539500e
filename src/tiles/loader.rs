//! GET/POST transport negotiation for WMS image and tile requests
//!
//! Short request URLs are handed straight to the image sink so the renderer
//! fetches them with a plain GET. URLs longer than the configured limit are
//! POSTed as a form body instead and delivered to the sink as a data URI.
//! If the POST fails the original URL is assigned anyway as a last resort.

use crate::core::config::WmsConfig;
use crate::prelude::{Arc, Mutex};
use crate::runtime::{self, AsyncHandle};
use crate::{MapError, Result};
use async_trait::async_trait;
use base64::Engine as _;
use once_cell::sync::Lazy;

/// Shared async HTTP client for POST requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("wmslayer/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const FALLBACK_MIME: &str = "application/octet-stream";

/// What an image element ends up displaying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSrc {
    /// Fetched by the renderer itself with GET
    Url(String),
    /// Image bytes already fetched, inlined as a `data:` URI
    DataUri(String),
}

impl ImageSrc {
    pub fn as_str(&self) -> &str {
        match self {
            ImageSrc::Url(url) => url,
            ImageSrc::DataUri(uri) => uri,
        }
    }

    pub fn is_data_uri(&self) -> bool {
        matches!(self, ImageSrc::DataUri(_))
    }
}

/// Receiver of a loaded image or tile. Each assignment replaces the previous content.
pub trait ImageSink: Send + Sync {
    fn set_src(&self, src: ImageSrc);
}

/// Sink that keeps the last assigned source
#[derive(Debug, Default)]
pub struct ImageSlot {
    src: Mutex<Option<ImageSrc>>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ImageSrc> {
        self.src.lock().ok().and_then(|src| src.clone())
    }
}

impl ImageSink for ImageSlot {
    fn set_src(&self, src: ImageSrc) {
        if let Ok(mut slot) = self.src.lock() {
            *slot = Some(src);
        }
    }
}

/// Body of a successful POST response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedImage {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PostedImage {
    /// Encodes the image as `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        let mime = self.content_type.as_deref().unwrap_or(FALLBACK_MIME);
        format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Sends a URL-encoded form body and returns the binary response.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
#[async_trait]
pub trait FormPoster: Send + Sync {
    async fn post_form(&self, url: &str, body: String) -> Result<PostedImage>;
}

/// Real form poster using reqwest
#[derive(Clone)]
pub struct ReqwestPoster {
    client: reqwest::Client,
}

impl ReqwestPoster {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestPoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormPoster for ReqwestPoster {
    async fn post_form(&self, url: &str, body: String) -> Result<PostedImage> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MapError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(PostedImage {
            content_type,
            bytes,
        })
    }
}

/// POSTs the query part of `url` to its path and inlines the response
async fn post_as_data_uri(poster: &dyn FormPoster, url: &str) -> Result<ImageSrc> {
    let (base, query) = url.split_once('?').unwrap_or((url, ""));
    let image = poster.post_form(base, query.to_string()).await?;
    Ok(ImageSrc::DataUri(image.to_data_uri()))
}

/// Degrades a failed POST to a plain GET of the original URL
fn recover_with_get(result: Result<ImageSrc>, url: String) -> ImageSrc {
    result.unwrap_or_else(|e| {
        log::warn!("POST of long WMS request failed ({}), falling back to GET", e);
        ImageSrc::Url(url)
    })
}

/// Per-request load strategy shared by image and tile sources
#[derive(Clone)]
pub struct WmsLoader {
    max_get_url_length: usize,
    poster: Arc<dyn FormPoster>,
}

impl WmsLoader {
    pub fn new(config: &WmsConfig) -> Self {
        Self::with_poster(config, Arc::new(ReqwestPoster::new()))
    }

    pub fn with_poster(config: &WmsConfig, poster: Arc<dyn FormPoster>) -> Self {
        Self {
            max_get_url_length: config.max_get_url_length,
            poster,
        }
    }

    pub fn max_get_url_length(&self) -> usize {
        self.max_get_url_length
    }

    /// URLs up to and including the limit stay GET
    pub fn requires_post(&self, url: &str) -> bool {
        url.len() > self.max_get_url_length
    }

    /// Loads `url` into `sink`.
    ///
    /// Short URLs are assigned synchronously and `None` is returned. Long
    /// URLs are fetched in a spawned task whose handle is returned; the sink
    /// is written when it completes, with the GET fallback on failure.
    pub fn load(&self, url: String, sink: Arc<dyn ImageSink>) -> Option<Box<dyn AsyncHandle>> {
        if !self.requires_post(&url) {
            sink.set_src(ImageSrc::Url(url));
            return None;
        }

        log::debug!(
            "request URL is {} characters (limit {}), switching to POST",
            url.len(),
            self.max_get_url_length
        );
        let poster = self.poster.clone();
        Some(runtime::spawn(async move {
            let result = post_as_data_uri(poster.as_ref(), &url).await;
            sink.set_src(recover_with_get(result, url));
        }))
    }

    /// Fetches `url` through the POST path without any fallback
    pub async fn fetch(&self, url: &str) -> Result<ImageSrc> {
        post_as_data_uri(self.poster.as_ref(), url).await
    }

    /// Resolves `url` the way [`load`](Self::load) would, awaiting the result
    pub async fn resolve(&self, url: String) -> ImageSrc {
        if !self.requires_post(&url) {
            return ImageSrc::Url(url);
        }
        let result = self.fetch(&url).await;
        recover_with_get(result, url)
    }
}
