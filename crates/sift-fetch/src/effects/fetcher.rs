use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use sift_fs::{Staging, TempFile};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::core::file_name_from_url;
use crate::data::FetchOptions;
use crate::effects::http::{HttpClient, TransportFailure};
use crate::error::{FetchError, Result};

/// A fetched body sitting in the staging directory, not yet known unique.
///
/// Dropping it deletes the staged file.
#[derive(Debug)]
pub struct TempArtifact {
    /// Source URL.
    pub url: String,

    /// File name derived from the URL.
    pub name: String,

    /// Body size.
    pub bytes: u64,

    file: TempFile,
}

impl TempArtifact {
    pub fn path(&self) -> &Path { self.file.path() }

    /// Take ownership of the staged file guard.
    pub fn into_file(self) -> TempFile { self.file }
}

/// Downloads single resources into a staging directory.
pub struct Fetcher<C: HttpClient> {
    client:  C,
    staging: Staging,
    options: FetchOptions,
}

impl<C: HttpClient> Fetcher<C> {
    /// Create a fetcher that stages downloads under `staging_root`.
    pub fn new(client: C, staging_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            client,
            staging: Staging::new(staging_root)?,
            options: FetchOptions::default(),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn staging(&self) -> &Staging { &self.staging }

    /// Stream `url` into a fresh temporary file.
    ///
    /// No retries are attempted. On any error the partial file has already
    /// been removed when this returns.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<TempArtifact> {
        let name = file_name_from_url(url)?;
        let file = self.staging.temp_file(&name);

        let bytes = self.stream_to(url, file.path()).await?;
        debug!(bytes, staged = %file.path().display(), "download staged");

        Ok(TempArtifact {
            url: url.to_string(),
            name,
            bytes,
            file,
        })
    }

    async fn stream_to(&self, url: &str, path: &Path) -> Result<u64> {
        let mut stream = self
            .client
            .stream(url.trim(), &self.options.headers)
            .await
            .map_err(|e| transport(url, e))?;

        let mut out = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| FetchError::io(path, e))?;

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport(url, e))?;
            out.write_all(&chunk).await.map_err(|e| FetchError::io(path, e))?;
            written += chunk.len() as u64;
        }

        out.flush().await.map_err(|e| FetchError::io(path, e))?;
        out.sync_all().await.map_err(|e| FetchError::io(path, e))?;
        Ok(written)
    }
}

fn transport<E: TransportFailure>(url: &str, err: E) -> FetchError {
    FetchError::Transport {
        url:     url.to_string(),
        status:  err.status(),
        timeout: err.is_timeout(),
        source:  Box::new(err),
    }
}
