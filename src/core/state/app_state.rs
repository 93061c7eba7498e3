use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::config::{Endpoints, LauncherConfig};
use crate::core::downloader::{Downloader, Fetcher};
use crate::core::error::LauncherResult;
use crate::core::events::EventSink;
use crate::core::launch::LaunchPipeline;
use crate::core::platform::Platform;
use crate::core::store::{ArtifactStore, GameLayout};
use crate::core::version::{RefreshOutcome, VersionCatalog, VersionRecord};

use super::attempt::{AttemptCell, AttemptState};

/// Long-lived launcher state shared with the presentation layer.
pub struct AppState {
    config: LauncherConfig,
    endpoints: Endpoints,
    store: ArtifactStore,
    events: EventSink,
    catalog: Arc<VersionCatalog>,
    attempt: AttemptCell,
    platform: Platform,
}

impl AppState {
    pub fn new(config: LauncherConfig, events: EventSink) -> LauncherResult<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(Downloader::new()?);
        Ok(Self::with_fetcher(
            config,
            Endpoints::default(),
            fetcher,
            events,
            Platform::current(),
        ))
    }

    pub fn with_fetcher(
        config: LauncherConfig,
        endpoints: Endpoints,
        fetcher: Arc<dyn Fetcher>,
        events: EventSink,
        platform: Platform,
    ) -> Self {
        let config = config.sanitized();
        let layout = GameLayout::new(&config.game_directory);
        let catalog = Arc::new(VersionCatalog::new(
            fetcher.clone(),
            layout.clone(),
            endpoints.version_manifest.clone(),
            events.clone(),
        ));
        let store = ArtifactStore::new(layout, fetcher, events.clone());

        Self {
            config,
            endpoints,
            store,
            attempt: AttemptCell::new(events.clone()),
            events,
            catalog,
            platform,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn attempt_state(&self) -> AttemptState {
        self.attempt.current()
    }

    /// Run a catalog refresh on the worker pool.
    pub fn refresh_catalog(&self) -> JoinHandle<RefreshOutcome> {
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move { catalog.refresh().await })
    }

    /// Start an attempt unless one is already in flight. The state leaves
    /// `Idle` before the task is submitted.
    pub fn request_launch(&self, record: VersionRecord) -> Option<JoinHandle<LauncherResult<i32>>> {
        let guard = self.attempt.try_begin()?;
        let pipeline = LaunchPipeline::new(
            self.config.clone(),
            self.endpoints.clone(),
            self.store.clone(),
            self.events.clone(),
            self.platform,
        );
        let events = self.events.clone();

        Some(tokio::spawn(async move {
            let result = pipeline.run(&record, &guard).await;
            if let Err(e) = &result {
                events.error(format!("Launch of {} failed: {}", record.id, e));
            }
            drop(guard);
            result
        }))
    }
}
