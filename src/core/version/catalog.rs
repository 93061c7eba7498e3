use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::core::downloader::Fetcher;
use crate::core::error::LauncherResult;
use crate::core::events::EventSink;
use crate::core::store::GameLayout;

use super::manifest::{VersionManifest, VersionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub source: CatalogSource,
    pub count: usize,
}

/// Known versions: the remote manifest when reachable, otherwise whatever
/// descriptors are already on disk.
pub struct VersionCatalog {
    records: RwLock<Vec<VersionRecord>>,
    refreshing: Mutex<()>,
    fetcher: Arc<dyn Fetcher>,
    layout: GameLayout,
    manifest_url: String,
    events: EventSink,
}

impl VersionCatalog {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        layout: GameLayout,
        manifest_url: impl Into<String>,
        events: EventSink,
    ) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            refreshing: Mutex::new(()),
            fetcher,
            layout,
            manifest_url: manifest_url.into(),
            events,
        }
    }

    /// Replace the record set. Never fails: any manifest problem falls back
    /// to the local scan.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _serialized = self.refreshing.lock().await;

        self.events.status("Loading version list...");
        let (records, source) = match self.fetch_remote().await {
            Ok(records) => (records, CatalogSource::Remote),
            Err(e) => {
                self.events
                    .warn(format!("Version manifest unavailable ({}), using local versions", e));
                (self.scan_local().await, CatalogSource::Local)
            }
        };

        let count = records.len();
        *self.records.write().await = records;

        match source {
            CatalogSource::Remote => self.events.info(format!("Loaded {} versions", count)),
            CatalogSource::Local => self.events.info(format!("Found {} local versions", count)),
        }
        RefreshOutcome { source, count }
    }

    async fn fetch_remote(&self) -> LauncherResult<Vec<VersionRecord>> {
        let raw = self.fetcher.fetch_text(&self.manifest_url).await?;
        let manifest = VersionManifest::parse(&raw)?;
        Ok(manifest.into_records())
    }

    /// `versions/<id>/<id>.json` directories, sorted by id.
    async fn scan_local(&self) -> Vec<VersionRecord> {
        let versions_dir = self.layout.versions_dir();
        let mut entries = match tokio::fs::read_dir(&versions_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No local versions at {:?}: {}", versions_dir, e);
                return Vec::new();
            }
        };

        let mut ids = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            if self.layout.descriptor_path(&id).is_file() {
                ids.push(id);
            }
        }

        ids.sort();
        ids.into_iter().map(VersionRecord::local).collect()
    }

    /// Release and local always; snapshots only on request. Manifest order.
    pub async fn filter(&self, include_snapshots: bool) -> Vec<VersionRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.is_visible(include_snapshots))
            .cloned()
            .collect()
    }

    pub async fn find(&self, id: &str) -> Option<VersionRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::testing::MockFetcher;
    use crate::core::version::VersionKind;

    const MANIFEST: &str = "https://meta.test/manifest.json";

    fn manifest_body() -> serde_json::Value {
        serde_json::json!({
            "versions": [
                { "id": "24w14a", "type": "snapshot", "url": "https://meta.test/24w14a.json" },
                { "id": "1.20.4", "type": "release", "url": "https://meta.test/1.20.4.json" },
                { "id": "1.20.1", "type": "release", "url": "https://meta.test/1.20.1.json" }
            ]
        })
    }

    fn catalog(fetcher: Arc<MockFetcher>, root: &std::path::Path) -> VersionCatalog {
        VersionCatalog::new(fetcher, GameLayout::new(root), MANIFEST, EventSink::disabled())
    }

    #[tokio::test]
    async fn remote_refresh_filters_snapshots() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.serve_json(MANIFEST, &manifest_body());
        let catalog = catalog(fetcher, temp.path());

        let outcome = catalog.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome {
                source: CatalogSource::Remote,
                count: 3
            }
        );

        let releases: Vec<_> = catalog.filter(false).await.into_iter().map(|r| r.id).collect();
        assert_eq!(releases, vec!["1.20.4", "1.20.1"]);
        assert_eq!(catalog.filter(true).await.len(), 3);
        assert_eq!(
            catalog.find("24w14a").await.map(|r| r.kind),
            Some(VersionKind::Snapshot)
        );
        assert!(catalog.find("1.0").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_manifest_falls_back_to_local_descriptors() {
        let temp = tempfile::tempdir().unwrap();
        let layout = GameLayout::new(temp.path());
        for id in ["1.8.9", "1.12.2"] {
            let path = layout.descriptor_path(id);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "{}").unwrap();
        }
        // Directory without a descriptor is not a version.
        std::fs::create_dir_all(layout.version_dir("broken")).unwrap();

        let fetcher = Arc::new(MockFetcher::new());
        fetcher.fail(MANIFEST, 503);
        let catalog = catalog(fetcher, temp.path());

        let outcome = catalog.refresh().await;
        assert_eq!(outcome.source, CatalogSource::Local);
        assert_eq!(outcome.count, 2);

        let records = catalog.filter(false).await;
        assert_eq!(records[0], VersionRecord::local("1.12.2"));
        assert_eq!(records[1], VersionRecord::local("1.8.9"));
    }

    #[tokio::test]
    async fn malformed_manifest_without_versions_dir_yields_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.serve(MANIFEST, "<html>maintenance</html>");
        let catalog = catalog(fetcher, &temp.path().join("missing"));

        let outcome = catalog.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome {
                source: CatalogSource::Local,
                count: 0
            }
        );
    }

    #[tokio::test]
    async fn refresh_replaces_previous_records() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.serve_json(MANIFEST, &manifest_body());
        let catalog = catalog(fetcher.clone(), temp.path());
        catalog.refresh().await;

        fetcher.fail(MANIFEST, 500);
        catalog.refresh().await;
        assert!(catalog.filter(true).await.is_empty());
    }
}
