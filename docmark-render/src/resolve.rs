//! Callbacks for content the Markdown side references but does not contain
//!
//! Cross-document links, includes and images outside the working folder are
//! resolved through [`ContentResolver`]. Absolute image URLs go through a
//! [`MediaFetcher`]. Both are called synchronously during traversal, so
//! output order always follows document order.

use crate::error::RenderError;
use crate::markdown::{Block, Inline};
use std::path::{Path, PathBuf};
pub use url::Url;

/// The node asking for external content.
#[derive(Debug, Clone, Copy)]
pub enum ContentOwner<'a> {
    Block(&'a Block),
    Inline(&'a Inline),
}

pub trait ContentResolver {
    /// Rewrite a relative Markdown link to an absolute URL.
    fn resolve_relative_to_absolute(&self, _path: &str) -> Option<String> {
        None
    }

    /// Bytes of a file referenced by `owner`, if it can be found.
    fn fetch_external_content(&self, _owner: ContentOwner<'_>, _path: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl ContentResolver for NoopResolver {}

/// Resolves against a directory on disk and an optional published content root.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    base_dir: PathBuf,
    content_root: Option<Url>,
}

impl FileSystemResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileSystemResolver {
            base_dir: base_dir.into(),
            content_root: None,
        }
    }

    /// Links ending in `.md` are rewritten against `root`, without the extension.
    pub fn with_content_root(mut self, root: Url) -> Self {
        self.content_root = Some(root);
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ContentResolver for FileSystemResolver {
    fn resolve_relative_to_absolute(&self, path: &str) -> Option<String> {
        let root = self.content_root.as_ref()?;
        let (target, fragment) = match path.split_once('#') {
            Some((target, fragment)) => (target, Some(fragment)),
            None => (path, None),
        };
        let target = target.strip_suffix(".md").unwrap_or(target);
        let mut url = root.join(target).ok()?;
        url.set_fragment(fragment);
        Some(url.to_string())
    }

    fn fetch_external_content(&self, _owner: ContentOwner<'_>, path: &str) -> Option<Vec<u8>> {
        let candidate = self.base_dir.join(path);
        match std::fs::read(&candidate) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("could not read {}: {e}", candidate.display());
                None
            }
        }
    }
}

/// Fetches absolute media URLs.
pub trait MediaFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError>;
}

/// Refuses every request; used when network access is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl MediaFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Media(format!(
            "network access disabled, not fetching {url}"
        )))
    }
}

/// Blocking HTTP(S) fetcher using the platform TLS stack.
#[cfg(feature = "network")]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

#[cfg(feature = "network")]
impl HttpFetcher {
    pub fn new() -> Self {
        use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

        let tls_config = TlsConfig::builder()
            .provider(TlsProvider::NativeTls)
            .root_certs(RootCerts::PlatformVerifier)
            .build();
        let agent = ureq::Agent::config_builder()
            .tls_config(tls_config)
            .build()
            .into();
        HttpFetcher { agent }
    }
}

#[cfg(feature = "network")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "network")]
impl MediaFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        use std::io::Read;

        let mut body = self
            .agent
            .get(url)
            .header("User-Agent", concat!("docmark/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|e| RenderError::Media(format!("failed to download {url}: {e}")))?
            .into_body();

        let mut bytes = Vec::new();
        body.as_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// The fetcher matching a network policy.
pub fn default_fetcher(allow_network: bool) -> Box<dyn MediaFetcher> {
    #[cfg(feature = "network")]
    if allow_network {
        return Box::new(HttpFetcher::new());
    }
    let _ = allow_network;
    Box::new(OfflineFetcher)
}

pub fn is_absolute_url(path: &str) -> bool {
    Url::parse(path).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
