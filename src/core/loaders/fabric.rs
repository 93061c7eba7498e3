use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::config::{Endpoints, FABRIC_INSTALL_HINT};
use crate::core::downloader::part_path;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::launch::Classpath;
use crate::core::maven::MavenCoordinate;
use crate::core::store::{ArtifactKind, ArtifactStore};

/// Profile document served by the loader meta service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub libraries: Vec<FabricLibrary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FabricLibrary {
    pub name: String,
    /// Repository base; the loader Maven when absent.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoaderBuild {
    loader: LoaderVersion,
}

#[derive(Debug, Deserialize)]
struct LoaderVersion {
    version: String,
}

impl FabricProfile {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Taken from the `fabric-loader` library, falling back to the profile id.
    pub fn loader_version(&self) -> Option<String> {
        self.libraries
            .iter()
            .filter_map(|lib| MavenCoordinate::parse(&lib.name).ok())
            .find(|c| c.group == "net.fabricmc" && c.artifact == "fabric-loader")
            .map(|c| c.version)
            .or_else(|| self.id.clone())
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.main_class.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderOutcome {
    Installed {
        loader_version: Option<String>,
        entry_point: Option<String>,
        libraries: usize,
        failed: usize,
    },
    /// Soft failure: the attempt continues with the base version.
    Skipped { reason: String },
}

impl LoaderOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, LoaderOutcome::Installed { .. })
    }
}

pub struct FabricInstaller<'a> {
    store: &'a ArtifactStore,
    endpoints: &'a Endpoints,
    events: &'a EventSink,
}

impl<'a> FabricInstaller<'a> {
    pub fn new(store: &'a ArtifactStore, endpoints: &'a Endpoints, events: &'a EventSink) -> Self {
        Self {
            store,
            endpoints,
            events,
        }
    }

    /// Layer the loader over `game_version`. Never fails the attempt: on any
    /// error the classpath is left untouched and the outcome says why.
    pub async fn install(&self, game_version: &str, classpath: &mut Classpath) -> LoaderOutcome {
        self.events
            .status(format!("Installing Fabric for {}...", game_version));

        match self.try_install(game_version).await {
            Ok((profile, block, failed)) => {
                let libraries = block.len();
                for path in block {
                    classpath.prepend(path);
                }
                let loader_version = profile.loader_version();
                self.events.info(format!(
                    "Fabric {} ready ({} libraries)",
                    loader_version.as_deref().unwrap_or("?"),
                    libraries
                ));
                LoaderOutcome::Installed {
                    loader_version,
                    entry_point: profile.entry_point().map(str::to_string),
                    libraries,
                    failed,
                }
            }
            Err(e) => {
                let reason = e.to_string();
                self.events.warn(format!(
                    "Fabric could not be installed for {}: {}. Continuing without it; install manually from {}",
                    game_version, reason, FABRIC_INSTALL_HINT
                ));
                LoaderOutcome::Skipped { reason }
            }
        }
    }

    async fn try_install(
        &self,
        game_version: &str,
    ) -> LauncherResult<(FabricProfile, Vec<PathBuf>, usize)> {
        let profile = self.load_profile(game_version).await?;

        let mut block = Vec::with_capacity(profile.libraries.len());
        let mut failed = 0;
        for lib in &profile.libraries {
            match self.ensure_library(lib).await {
                Ok(path) => block.push(path),
                Err(e) => {
                    failed += 1;
                    self.events
                        .warn(format!("Fabric library {} failed: {}", lib.name, e));
                }
            }
        }

        if let Some(main_class) = profile.entry_point() {
            self.persist_entry_point(game_version, main_class).await?;
        }

        Ok((profile, block, failed))
    }

    /// Reuse the persisted profile, else select the first published build
    /// and fetch its profile.
    async fn load_profile(&self, game_version: &str) -> LauncherResult<FabricProfile> {
        let layout = self.store.layout();
        let profile_path = layout.loader_profile(game_version);

        if let Ok(raw) = tokio::fs::read_to_string(&profile_path).await {
            match FabricProfile::parse(&raw) {
                Ok(profile) => {
                    debug!("Reusing loader profile at {:?}", profile_path);
                    return Ok(profile);
                }
                Err(e) => debug!("Ignoring unreadable loader profile {:?}: {}", profile_path, e),
            }
        }

        let fetcher = self.store.fetcher();
        let builds_raw = fetcher
            .fetch_text(&self.endpoints.loader_builds_url(game_version))
            .await?;
        let builds: Vec<LoaderBuild> = serde_json::from_str(&builds_raw)?;
        let loader_version = builds
            .into_iter()
            .next()
            .map(|b| b.loader.version)
            .ok_or_else(|| {
                LauncherError::Loader(format!("no loader builds for {}", game_version))
            })?;

        info!("Selected Fabric loader {} for {}", loader_version, game_version);
        let raw = fetcher
            .fetch_text(
                &self
                    .endpoints
                    .loader_profile_url(game_version, &loader_version),
            )
            .await?;
        let profile = FabricProfile::parse(&raw)?;

        write_atomically(&profile_path, raw.as_bytes()).await?;
        Ok(profile)
    }

    async fn ensure_library(&self, lib: &FabricLibrary) -> LauncherResult<PathBuf> {
        let coord = MavenCoordinate::parse(&lib.name)?;
        let dest = self.store.layout().library_path(&coord.relative_path());
        let repo = lib
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(self.endpoints.loader_maven.as_str());
        let url = coord.url(repo);

        self.store
            .ensure(ArtifactKind::LoaderLibrary, &dest, move || Ok(url))
            .await?;
        Ok(dest)
    }

    async fn persist_entry_point(&self, game_version: &str, main_class: &str) -> LauncherResult<()> {
        let marker = self.store.layout().loader_entry_marker(game_version);
        if let Ok(existing) = tokio::fs::read_to_string(&marker).await {
            if existing.trim() == main_class {
                return Ok(());
            }
        }
        write_atomically(&marker, main_class.as_bytes()).await
    }
}

/// Entry point persisted by a previous installation, if any.
pub async fn read_entry_point(marker: &std::path::Path) -> Option<String> {
    let raw = tokio::fs::read_to_string(marker).await.ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

async fn write_atomically(dest: &std::path::Path, bytes: &[u8]) -> LauncherResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }
    let tmp = part_path(dest);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| LauncherError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, dest)
        .await
        .map_err(|e| LauncherError::io(dest, e))
}
