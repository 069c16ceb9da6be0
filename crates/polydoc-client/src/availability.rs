//! Memoized lookups in the missing-pages manifest.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use polydoc_mdx::{Language, LanguageAvailability};

/// Errors that can occur while loading the manifest.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Manifest request returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the missing-pages manifest is loaded from.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch(&self) -> Result<LanguageAvailability, FetchError>;
}

/// Manifest served over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Manifest published at the root of a site, e.g.
    /// `https://example.com/docs/` -> `https://example.com/docs/missing-pages.json`.
    pub fn for_site(site_url: &str) -> Self {
        Self::new(format!(
            "{}/missing-pages.json",
            site_url.trim_end_matches('/')
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    async fn fetch(&self) -> Result<LanguageAvailability, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.json::<LanguageAvailability>().await?)
    }
}

/// Manifest read from a local build output.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ManifestSource for FileSource {
    async fn fetch(&self) -> Result<LanguageAvailability, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Answers "does this page exist in that language?" from a manifest loaded
/// at most once per cache.
///
/// A failed load is remembered as an empty manifest, so every page then
/// reports as available. Callers racing the first load may each fetch; the
/// first result stored wins.
pub struct AvailabilityCache<S> {
    source: S,
    manifest: RwLock<Option<Arc<LanguageAvailability>>>,
}

impl<S: ManifestSource> AvailabilityCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            manifest: RwLock::new(None),
        }
    }

    /// Whether `page_path` exists for `language`.
    ///
    /// Only pages listed in the manifest for that language are unavailable.
    pub async fn is_available(&self, page_path: &str, language: Language) -> bool {
        let manifest = self.manifest().await;
        manifest
            .get(page_path)
            .is_none_or(|missing| !missing.contains(&language))
    }

    /// The memoized manifest, loading it on first use.
    pub async fn manifest(&self) -> Arc<LanguageAvailability> {
        if let Some(manifest) = self.manifest.read().await.as_ref() {
            return Arc::clone(manifest);
        }

        let loaded = match self.source.fetch().await {
            Ok(manifest) => {
                tracing::debug!("Loaded missing pages manifest ({} entries)", manifest.len());
                manifest
            }
            Err(e) => {
                tracing::warn!("Failed to load missing pages manifest: {}", e);
                LanguageAvailability::new()
            }
        };

        let mut slot = self.manifest.write().await;
        Arc::clone(slot.get_or_insert_with(|| Arc::new(loaded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct CountingSource {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ManifestSource for CountingSource {
        async fn fetch(&self) -> Result<LanguageAvailability, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(self.body)?)
        }
    }

    #[tokio::test]
    async fn listed_languages_are_unavailable() {
        let cache = AvailabilityCache::new(CountingSource::new(r#"{"install": ["python"]}"#));

        assert!(!cache.is_available("install", Language::Python).await);
        assert!(cache.is_available("install", Language::TypeScript).await);
        assert!(cache.is_available("essentials", Language::Python).await);
    }

    #[tokio::test]
    async fn fetches_once() {
        let cache = AvailabilityCache::new(CountingSource::new(r#"{"install": ["python"]}"#));

        cache.is_available("install", Language::Python).await;
        cache.is_available("install", Language::CSharp).await;
        cache.manifest().await;

        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_manifest_fails_open() {
        let cache = AvailabilityCache::new(CountingSource::new("not json"));

        for language in Language::ALL {
            assert!(cache.is_available("install", language).await);
        }
        assert!(cache.manifest().await.is_empty());
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_server_fails_open() {
        // Nothing listens on the discard port.
        let source = HttpSource::new("http://127.0.0.1:9/missing-pages.json");
        let cache = AvailabilityCache::new(source);

        assert!(cache.is_available("install", Language::Python).await);
    }

    #[tokio::test]
    async fn reads_manifest_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing-pages.json");
        fs::write(&path, "{\n  \"essentials/activity\": [\n    \"csharp\"\n  ]\n}\n").unwrap();

        let cache = AvailabilityCache::new(FileSource::new(&path));

        assert!(!cache.is_available("essentials/activity", Language::CSharp).await);
        assert!(cache.is_available("essentials/activity", Language::Python).await);
    }

    #[tokio::test]
    async fn missing_file_fails_open() {
        let temp = tempdir().unwrap();
        let source = FileSource::new(temp.path().join("absent.json"));

        assert!(matches!(source.fetch().await, Err(FetchError::Io { .. })));
        assert!(AvailabilityCache::new(source).is_available("x", Language::Python).await);
    }

    /// Serve one HTTP response with `body` and return the manifest URL.
    async fn serve_once(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/missing-pages.json")
    }

    #[tokio::test]
    async fn fetches_manifest_over_http() {
        let url = serve_once(r#"{"essentials/activity": ["csharp"]}"#).await;

        let manifest = HttpSource::new(url).fetch().await.unwrap();

        assert_eq!(
            manifest.get("essentials/activity"),
            Some(&vec![Language::CSharp])
        );
    }

    #[tokio::test]
    async fn malformed_http_manifest_is_a_decode_error() {
        let url = serve_once("not json").await;
        let source = HttpSource::new(url);

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(&err, FetchError::Http(e) if e.is_decode()));
    }

    #[test]
    fn site_manifest_url() {
        assert_eq!(
            HttpSource::for_site("https://example.com/teams-ai/").url(),
            "https://example.com/teams-ai/missing-pages.json"
        );
    }
}
