use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use tracing::debug;

use crate::core::config::Endpoints;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::store::{ArtifactKind, ArtifactStore, Ensured};
use crate::core::version::version_file::AssetIndexRef;

const PROGRESS_EVERY: usize = 50;

/// Asset index document: `{objects: {name → {hash, size}}}`.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

impl AssetIndex {
    /// Distinct well-formed hashes, sorted so runs are reproducible.
    pub fn distinct_hashes(&self) -> BTreeSet<&str> {
        self.objects
            .values()
            .map(|o| o.hash.as_str())
            .filter(|h| is_valid_hash(h))
            .collect()
    }
}

/// 40 lowercase hex characters.
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 40
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetReport {
    pub total: usize,
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
}

pub struct AssetSynchronizer<'a> {
    store: &'a ArtifactStore,
    endpoints: &'a Endpoints,
    events: &'a EventSink,
}

impl<'a> AssetSynchronizer<'a> {
    pub fn new(store: &'a ArtifactStore, endpoints: &'a Endpoints, events: &'a EventSink) -> Self {
        Self {
            store,
            endpoints,
            events,
        }
    }

    /// Ensure the index (fatal on failure), then every object it names.
    /// Object failures are only counted.
    pub async fn synchronize(&self, index_ref: &AssetIndexRef) -> LauncherResult<AssetReport> {
        let layout = self.store.layout();
        let index_path = layout.asset_index(&index_ref.id);
        let index_url = index_ref.url.clone();

        self.events
            .status(format!("Checking asset index {}...", index_ref.id));
        self.store
            .ensure(ArtifactKind::AssetIndex, &index_path, move || {
                index_url.ok_or(LauncherError::MissingDescriptorField("assetIndex.url"))
            })
            .await?;

        let raw = tokio::fs::read_to_string(&index_path)
            .await
            .map_err(|e| LauncherError::io(&index_path, e))?;
        let index: AssetIndex = serde_json::from_str(&raw)?;
        let hashes = index.distinct_hashes();

        let mut report = AssetReport {
            total: hashes.len(),
            ..AssetReport::default()
        };
        self.events
            .status(format!("Checking {} assets...", report.total));

        for (i, hash) in hashes.iter().enumerate() {
            let dest = layout.asset_object(hash);
            let url = self.endpoints.asset_object_url(hash);

            match self
                .store
                .ensure(ArtifactKind::AssetObject, &dest, move || Ok(url))
                .await
            {
                Ok(Ensured::Cached) => report.cached += 1,
                Ok(Ensured::Downloaded(_)) => report.fetched += 1,
                Err(e) => {
                    debug!("Asset {} failed: {}", hash, e);
                    report.failed += 1;
                }
            }

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 || done == report.total {
                self.events.progress("Assets", done, report.total);
            }
        }

        if report.failed > 0 {
            self.events.warn(format!(
                "{} of {} assets could not be downloaded",
                report.failed, report.total
            ));
        }
        self.events.info(format!(
            "Assets: {} fetched, {} cached, {} failed",
            report.fetched, report.cached, report.failed
        ));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::downloader::testing::MockFetcher;
    use crate::core::events::{drain, LauncherEvent};
    use crate::core::store::GameLayout;

    const INDEX_URL: &str = "https://meta.test/indexes/5.json";

    fn hash(n: usize) -> String {
        format!("{:040x}", n)
    }

    fn index_ref() -> AssetIndexRef {
        AssetIndexRef {
            id: "5".into(),
            url: Some(INDEX_URL.into()),
        }
    }

    #[test]
    fn hash_validation() {
        assert!(is_valid_hash("bdf48ef6b5d0d23bbb02e17d04865216179f510a"));
        assert!(!is_valid_hash("BDF48EF6B5D0D23BBB02E17D04865216179F510A"));
        assert!(!is_valid_hash("bdf48e"));
        assert!(!is_valid_hash("../../../../etc/passwd00000000000000000000"));
    }

    #[tokio::test]
    async fn partial_object_failure_is_counted_not_raised() {
        let temp = tempfile::tempdir().unwrap();
        let endpoints = Endpoints {
            resources: "https://cdn.test/".into(),
            ..Endpoints::default()
        };
        let fetcher = Arc::new(MockFetcher::new());

        let mut objects = serde_json::Map::new();
        for n in 0..120 {
            objects.insert(
                format!("minecraft/sounds/{}.ogg", n),
                serde_json::json!({ "hash": hash(n), "size": 1 }),
            );
        }
        // Same object under a second name, and a malformed entry.
        objects.insert("alias.ogg".into(), serde_json::json!({ "hash": hash(0), "size": 1 }));
        objects.insert("bad.ogg".into(), serde_json::json!({ "hash": "zz", "size": 1 }));
        fetcher.serve_json(INDEX_URL, &serde_json::json!({ "objects": objects }));

        for n in 0..120 {
            let url = endpoints.asset_object_url(&hash(n));
            if n < 3 {
                fetcher.fail(&url, 503);
            } else {
                fetcher.serve(&url, b"x".to_vec());
            }
        }

        let (events, mut rx) = EventSink::channel();
        let store = ArtifactStore::new(GameLayout::new(temp.path()), fetcher.clone(), events.clone());
        let report = AssetSynchronizer::new(&store, &endpoints, &events)
            .synchronize(&index_ref())
            .await
            .unwrap();

        assert_eq!(
            report,
            AssetReport {
                total: 120,
                fetched: 117,
                cached: 0,
                failed: 3
            }
        );

        let progress: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                LauncherEvent::Progress { done, .. } => Some(done),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![50, 100, 120]);

        // Second pass only retries what is still missing.
        fetcher.clear_requests();
        let again = AssetSynchronizer::new(&store, &endpoints, &events)
            .synchronize(&index_ref())
            .await
            .unwrap();
        assert_eq!(again.cached, 117);
        assert_eq!(again.failed, 3);
        assert_eq!(fetcher.request_count(), 3);
    }

    #[tokio::test]
    async fn missing_index_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let endpoints = Endpoints::default();
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.fail(INDEX_URL, 404);

        let events = EventSink::disabled();
        let store = ArtifactStore::new(GameLayout::new(temp.path()), fetcher, events.clone());
        let err = AssetSynchronizer::new(&store, &endpoints, &events)
            .synchronize(&index_ref())
            .await
            .unwrap_err();

        assert!(err.is_network());
    }
}
