use std::path::Path;
use std::sync::Arc;

use crate::core::downloader::{FetchMode, Fetcher, ProgressFn};
use crate::core::error::LauncherResult;
use crate::core::events::EventSink;

use super::layout::GameLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Descriptor,
    ClientJar,
    Library,
    NativeBundle,
    AssetIndex,
    AssetObject,
    LoaderLibrary,
}

impl ArtifactKind {
    fn is_quiet(self) -> bool {
        matches!(self, ArtifactKind::AssetObject)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Cached,
    Downloaded(u64),
}

/// Download-if-absent over the [`GameLayout`]. Existing files are trusted;
/// no content validation is performed.
#[derive(Clone)]
pub struct ArtifactStore {
    layout: GameLayout,
    fetcher: Arc<dyn Fetcher>,
    events: EventSink,
}

impl ArtifactStore {
    pub fn new(layout: GameLayout, fetcher: Arc<dyn Fetcher>, events: EventSink) -> Self {
        Self {
            layout,
            fetcher,
            events,
        }
    }

    pub fn layout(&self) -> &GameLayout {
        &self.layout
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Ensure `dest` exists. `url` is only evaluated when a download is
    /// needed, so a descriptor missing an optional URL costs nothing when the
    /// artifact is already cached.
    pub async fn ensure<F>(&self, kind: ArtifactKind, dest: &Path, url: F) -> LauncherResult<Ensured>
    where
        F: FnOnce() -> LauncherResult<String>,
    {
        if tokio::fs::try_exists(dest).await.unwrap_or(false) {
            return Ok(Ensured::Cached);
        }

        let url = url()?;
        let written = if kind.is_quiet() {
            self.fetcher
                .fetch_to_file(&url, dest, FetchMode::Quiet)
                .await?
        } else {
            let events = self.events.clone();
            let report = move |pct: u8| events.percent(pct);
            let progress: ProgressFn<'_> = &report;
            self.fetcher
                .fetch_to_file(&url, dest, FetchMode::Progress(Some(progress)))
                .await?
        };

        Ok(Ensured::Downloaded(written))
    }
}
