//! In-memory [`Fetcher`] for tests: canned bodies by URL, request log,
//! injected failures and an optional gate that holds every response.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use super::client::{FetchMode, Fetcher};
use crate::core::error::{LauncherError, LauncherResult};

enum Route {
    Body(Vec<u8>),
    Status(u16),
}

#[derive(Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<String>>,
    gate: Option<watch::Receiver<bool>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responses are held until `true` is sent on the paired sender.
    pub fn gated() -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let fetcher = Self {
            gate: Some(rx),
            ..Self::default()
        };
        (fetcher, tx)
    }

    pub fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Body(body.into()));
    }

    pub fn serve_json(&self, url: &str, value: &serde_json::Value) {
        self.serve(url, value.to_string());
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Status(status));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    async fn respond(&self, url: &str) -> LauncherResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            let _ = gate.wait_for(|open| *open).await;
        }

        let routes = self.routes.lock().unwrap();
        match routes.get(url) {
            Some(Route::Body(body)) => Ok(body.clone()),
            Some(Route::Status(status)) => Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let body = self.respond(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        dest: &Path,
        mode: FetchMode<'_>,
    ) -> LauncherResult<u64> {
        let body = self.respond(url).await?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &body)?;
        if let FetchMode::Progress(Some(report)) = mode {
            report(100);
        }
        Ok(body.len() as u64)
    }
}
