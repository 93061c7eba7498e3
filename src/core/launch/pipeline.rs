// ─── Launch Pipeline ───
// One attempt: descriptor → client jar → libraries → assets → natives →
// loader → plan → process. Stages run strictly in order.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::assets::{AssetReport, AssetSynchronizer};
use crate::core::config::{Endpoints, LauncherConfig, OPTIMIZED_MODPACK_URL};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::java;
use crate::core::loaders::{read_entry_point, FabricInstaller, LoaderOutcome};
use crate::core::platform::Platform;
use crate::core::state::AttemptGuard;
use crate::core::store::{ArtifactKind, ArtifactStore};
use crate::core::version::{VersionDetail, VersionRecord};

use super::classpath::{Classpath, DependencyResolver, LibraryReport};
use super::natives::{NativeExtractor, NativeReport};
use super::plan::{heap_exceeds_physical, LaunchComposer, LaunchInputs, LaunchPlan};
use super::process::ProcessSupervisor;

/// Stage counters of a prepared attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub libraries: LibraryReport,
    /// `None` when the descriptor names no downloadable asset index.
    pub assets: Option<AssetReport>,
    pub natives: NativeReport,
    /// `None` when loader mode is off.
    pub loader: Option<LoaderOutcome>,
}

#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub plan: LaunchPlan,
    pub report: AttemptReport,
}

#[derive(Clone)]
pub struct LaunchPipeline {
    config: LauncherConfig,
    endpoints: Endpoints,
    store: ArtifactStore,
    events: EventSink,
    platform: Platform,
}

impl LaunchPipeline {
    pub fn new(
        config: LauncherConfig,
        endpoints: Endpoints,
        store: ArtifactStore,
        events: EventSink,
        platform: Platform,
    ) -> Self {
        Self {
            config,
            endpoints,
            store,
            events,
            platform,
        }
    }

    /// Full attempt. `guard` moves to `Launching` right before the spawn.
    pub async fn run(&self, record: &VersionRecord, guard: &AttemptGuard) -> LauncherResult<i32> {
        let prepared = self.prepare(record).await?;
        guard.launching();
        self.events
            .status(format!("Launching {}...", record.id));
        ProcessSupervisor::new(&self.events)
            .run(&prepared.plan)
            .await
    }

    /// Everything up to the composed plan; no process is spawned.
    pub async fn prepare(&self, record: &VersionRecord) -> LauncherResult<PreparedLaunch> {
        let id = record.id.as_str();
        let layout = self.store.layout();
        info!("Preparing {} for {}", id, self.platform);
        self.events.status(format!("Resolving {}...", id));
        layout.prepare()?;

        // Descriptor
        let descriptor_path = layout.descriptor_path(id);
        let descriptor_url = record.descriptor_url.clone();
        let missing_id = record.id.clone();
        self.store
            .ensure(ArtifactKind::Descriptor, &descriptor_path, move || {
                descriptor_url.ok_or(LauncherError::VersionNotFound(missing_id))
            })
            .await?;
        let raw = tokio::fs::read_to_string(&descriptor_path)
            .await
            .map_err(|e| LauncherError::io(&descriptor_path, e))?;
        let detail = VersionDetail::parse(&raw)?;

        // Client artifact
        self.events.status("Checking game client...");
        let client_jar = layout.client_jar(id);
        self.store
            .ensure(ArtifactKind::ClientJar, &client_jar, || detail.client_url())
            .await?;

        // Libraries
        let mut classpath = Classpath::new();
        let libraries = DependencyResolver::new(&self.store, &self.events, self.platform)
            .resolve(&detail, &mut classpath)
            .await;

        // Assets
        let assets = self.sync_assets(&detail).await?;

        // Natives
        let (natives_dir, natives) = NativeExtractor::new(&self.store, &self.events, self.platform)
            .extract(id, &detail)
            .await?;

        // Loader
        let mut loader = None;
        let mut loader_entry_point = None;
        if self.config.loader_enabled {
            let outcome = FabricInstaller::new(&self.store, &self.endpoints, &self.events)
                .install(id, &mut classpath)
                .await;
            if outcome.is_installed() {
                loader_entry_point = read_entry_point(&layout.loader_entry_marker(id)).await;
            }
            loader = Some(outcome);
        }
        self.modpack_hint();

        // Runtime
        let interpreter = self.interpreter();
        let java_major = java::detect_major_version(&interpreter).await;
        debug!("Java {:?} reports major version {}", interpreter, java_major);
        if heap_exceeds_physical(self.config.ram_megabytes, java::physical_memory_mb()) {
            self.events.warn(format!(
                "Requested heap of {} MB exceeds installed memory",
                self.config.ram_megabytes
            ));
        }

        let plan = LaunchComposer::compose(LaunchInputs {
            version_id: record.id.clone(),
            interpreter,
            java_major,
            platform: self.platform,
            ram_megabytes: self.config.ram_megabytes,
            game_root: layout.root().to_path_buf(),
            natives_dir,
            asset_index_id: detail.asset_index_id(),
            username: self.config.username.clone(),
            fullscreen: self.config.fullscreen,
            classpath: classpath.finish(client_jar),
            loader_entry_point,
            declared_main_class: detail.declared_main_class().map(str::to_string),
        });
        self.events.info(format!("Command: {}", plan.display()));

        Ok(PreparedLaunch {
            plan,
            report: AttemptReport {
                libraries,
                assets,
                natives,
                loader,
            },
        })
    }

    /// A descriptor without an asset index, or one whose index cannot be
    /// located, skips the stage. A failed index download is fatal.
    async fn sync_assets(&self, detail: &VersionDetail) -> LauncherResult<Option<AssetReport>> {
        let index_ref = match &detail.asset_index {
            Some(index_ref) => index_ref,
            None => {
                self.events
                    .info("Descriptor has no asset index, skipping assets");
                return Ok(None);
            }
        };

        match AssetSynchronizer::new(&self.store, &self.endpoints, &self.events)
            .synchronize(index_ref)
            .await
        {
            Ok(report) => Ok(Some(report)),
            Err(LauncherError::MissingDescriptorField(field)) => {
                self.events
                    .info(format!("Asset index has no {}, skipping assets", field));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The pack itself is installed by hand; only guidance is logged.
    fn modpack_hint(&self) {
        if !self.config.optimized_modpack {
            return;
        }
        if !self.config.loader_enabled {
            self.events
                .warn("Fabulously Optimized needs the Fabric loader, enable it to use the pack");
            return;
        }
        self.events.status("Checking Fabulously Optimized mods...");
        self.events.info(format!(
            "Fabulously Optimized: ensure mods are in {:?}",
            self.store.layout().mods_dir()
        ));
        self.events
            .info(format!("Get the latest pack from {}", OPTIMIZED_MODPACK_URL));
    }

    fn interpreter(&self) -> PathBuf {
        self.config
            .java_path
            .clone()
            .unwrap_or_else(|| java::default_java_path(self.platform))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    use serde_json::json;
    use zip::write::SimpleFileOptions;

    use crate::core::config::Endpoints;
    use crate::core::downloader::testing::MockFetcher;
    use crate::core::version::VersionRecord;

    pub const VERSION: &str = "1.20.1";
    pub const DESCRIPTOR_URL: &str = "https://meta.test/v1/packages/1.20.1.json";
    pub const INDEX_URL: &str = "https://meta.test/v1/packages/5.json";

    pub fn endpoints() -> Endpoints {
        Endpoints {
            version_manifest: "https://meta.test/manifest.json".into(),
            resources: "https://cdn.test/".into(),
            loader_meta: "https://fabric.test/v2".into(),
            loader_maven: "https://maven.test/".into(),
        }
    }

    pub fn record() -> VersionRecord {
        VersionRecord {
            id: VERSION.into(),
            kind: crate::core::version::VersionKind::Release,
            descriptor_url: Some(DESCRIPTOR_URL.into()),
        }
    }

    fn natives_bundle(file_name: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer.start_file(file_name, SimpleFileOptions::default()).unwrap();
        writer.write_all(b"native").unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Serves a complete 1.20.1 closure: manifest, descriptor, client jar,
    /// two libraries, one native bundle per platform and a three-object
    /// asset index.
    pub fn serve_version(fetcher: &MockFetcher, endpoints: &Endpoints) {
        fetcher.serve_json(
            &endpoints.version_manifest,
            &json!({ "versions": [
                { "id": VERSION, "type": "release", "url": DESCRIPTOR_URL },
                { "id": "23w31a", "type": "snapshot", "url": "https://meta.test/23w31a.json" }
            ] }),
        );

        let mut classifiers = serde_json::Map::new();
        for (key, file_name) in [
            ("natives-linux", "liblwjgl.so"),
            ("natives-windows", "lwjgl.dll"),
            ("natives-macos", "liblwjgl.dylib"),
        ] {
            let url = format!("https://libs.test/lwjgl-{}.jar", key);
            classifiers.insert(
                key.into(),
                json!({ "path": format!("org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-{}.jar", key), "url": url }),
            );
            fetcher.serve(&url, natives_bundle(file_name));
        }

        fetcher.serve_json(
            DESCRIPTOR_URL,
            &json!({
                "id": VERSION,
                "mainClass": "net.minecraft.client.main.Main",
                "assetIndex": { "id": "5", "url": INDEX_URL },
                "downloads": { "client": { "url": "https://cdn.test/client-1.20.1.jar" } },
                "libraries": [
                    { "name": "com.mojang:brigadier:1.1.8",
                      "downloads": { "artifact": { "path": "com/mojang/brigadier/1.1.8/brigadier-1.1.8.jar",
                                                   "url": "https://libs.test/brigadier.jar" } } },
                    { "name": "org.lwjgl:lwjgl:3.3.1",
                      "downloads": {
                          "artifact": { "path": "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1.jar",
                                        "url": "https://libs.test/lwjgl.jar" },
                          "classifiers": classifiers
                      } }
                ]
            }),
        );
        fetcher.serve("https://cdn.test/client-1.20.1.jar", b"client".to_vec());
        fetcher.serve("https://libs.test/brigadier.jar", b"brigadier".to_vec());
        fetcher.serve("https://libs.test/lwjgl.jar", b"lwjgl".to_vec());

        let hashes = [
            "bdf48ef6b5d0d23bbb02e17d04865216179f510a",
            "0a5f3c5ea2e9b5b57ef4a0f6e4d53b5b3a7d2f10",
            "7c2b9b4b0d0e6a9f3e1c8d2a5b4c3d2e1f0a9b8c",
        ];
        let objects: serde_json::Map<_, _> = hashes
            .iter()
            .enumerate()
            .map(|(i, h)| (format!("minecraft/lang/{}.json", i), json!({ "hash": h, "size": 6 })))
            .collect();
        fetcher.serve_json(INDEX_URL, &json!({ "objects": objects }));
        for h in hashes {
            fetcher.serve(&endpoints.asset_object_url(h), b"object".to_vec());
        }
    }

    pub fn serve_loader(fetcher: &MockFetcher, endpoints: &Endpoints) {
        fetcher.serve_json(
            &endpoints.loader_builds_url(VERSION),
            &json!([{ "loader": { "version": "0.15.11" } }]),
        );
        fetcher.serve_json(
            &endpoints.loader_profile_url(VERSION, "0.15.11"),
            &json!({
                "id": "fabric-loader-0.15.11-1.20.1",
                "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
                "libraries": [
                    { "name": "net.fabricmc:intermediary:1.20.1" },
                    { "name": "net.fabricmc:fabric-loader:0.15.11" }
                ]
            }),
        );
        fetcher.serve(
            "https://maven.test/net/fabricmc/intermediary/1.20.1/intermediary-1.20.1.jar",
            b"int".to_vec(),
        );
        fetcher.serve(
            "https://maven.test/net/fabricmc/fabric-loader/0.15.11/fabric-loader-0.15.11.jar",
            b"loader".to_vec(),
        );
    }
}
