use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const METADATA_TIMEOUT: Duration = Duration::from_secs(15);
const ARTIFACT_TIMEOUT: Duration = Duration::from_secs(300);
const QUIET_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives the download percentage (0–100).
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// How a file download reports itself.
#[derive(Clone, Copy)]
pub enum FetchMode<'a> {
    /// Percentage callback, invoked only when the response declares a length.
    Progress(Option<ProgressFn<'a>>),
    /// High-volume, low-value traffic: no progress, shorter timeouts.
    Quiet,
}

/// One resource at a time from the distribution service.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a small metadata document.
    async fn fetch_text(&self, url: &str) -> LauncherResult<String>;

    /// Stream `url` into `dest`, creating parent directories. Returns the
    /// number of bytes written.
    async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        mode: FetchMode<'_>,
    ) -> LauncherResult<u64>;
}

/// HTTP implementation of [`Fetcher`].
pub struct Downloader {
    client: Client,
    quiet_client: Client,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self {
            client: build_http_client(CONNECT_TIMEOUT)?,
            quiet_client: build_http_client(QUIET_CONNECT_TIMEOUT)?,
        })
    }
}

#[async_trait]
impl Fetcher for Downloader {
    async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        mode: FetchMode<'_>,
    ) -> LauncherResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let (client, timeout, progress) = match mode {
            FetchMode::Progress(progress) => (&self.client, ARTIFACT_TIMEOUT, progress),
            FetchMode::Quiet => (&self.quiet_client, QUIET_TIMEOUT, None),
        };

        let response = client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Never let a truncated body appear at `dest`: the store treats
        // existence as validity.
        let part = part_path(dest);
        match stream_body(response, &part, progress).await {
            Ok(written) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| LauncherError::io(dest, e))?;
                debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
                Ok(written)
            }
            Err(err) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(err)
            }
        }
    }
}

async fn stream_body(
    response: reqwest::Response,
    part: &Path,
    progress: Option<ProgressFn<'_>>,
) -> LauncherResult<u64> {
    let total = response.content_length().filter(|len| *len > 0);
    let mut written: u64 = 0;
    let mut last_pct: Option<u8> = None;

    // Scoped so the handle is closed before the rename (Windows holds locks).
    {
        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| LauncherError::io(part, e))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::io(part, e))?;
            written = written.saturating_add(chunk.len() as u64);

            if let (Some(report), Some(total)) = (progress, total) {
                let pct = percent(written, total);
                if last_pct != Some(pct) {
                    last_pct = Some(pct);
                    report(pct);
                }
            }
        }

        file.flush().await.map_err(|e| LauncherError::io(part, e))?;
    }

    Ok(written)
}

fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (done.saturating_mul(100) / total).min(100) as u8
}

/// Sibling path used while a download is in flight.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
