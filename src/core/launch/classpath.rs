// ─── Classpath Builder ───
// Resolves the descriptor's plain libraries and accumulates the ordered
// classpath: loader libraries first, resolved libraries, client jar last.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::events::EventSink;
use crate::core::platform::Platform;
use crate::core::store::{ArtifactKind, ArtifactStore, Ensured};
use crate::core::version::VersionDetail;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.entries.push(path);
    }

    /// Insert `path` ahead of every existing entry.
    pub fn prepend(&mut self, path: PathBuf) {
        self.entries.insert(0, path);
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the client jar and drop later duplicates.
    pub fn finish(mut self, client_jar: PathBuf) -> Vec<PathBuf> {
        self.entries.push(client_jar);
        dedup_preserving_order(&mut self.entries);
        self.entries
    }
}

fn dedup_preserving_order(entries: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_string_lossy().to_lowercase()
        } else {
            entry.to_string_lossy().into_owned()
        };
        seen.insert(key)
    });
}

/// Join classpath entries with the platform separator.
pub fn join_classpath(entries: &[PathBuf], platform: Platform) -> String {
    entries
        .iter()
        .map(|p| safe_path_str(p))
        .collect::<Vec<_>>()
        .join(platform.classpath_separator())
}

/// Path text for the command line. The JVM rejects Windows extended-length
/// (`\\?\`) prefixes on the classpath.
pub fn safe_path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();
    match text.strip_prefix(r"\\?\") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LibraryReport {
    pub downloaded: usize,
    pub cached: usize,
    pub failed: usize,
}

/// Ensures every plain library of a descriptor and records it on the
/// classpath. A failed library is logged, counted and left off.
pub struct DependencyResolver<'a> {
    store: &'a ArtifactStore,
    events: &'a EventSink,
    platform: Platform,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(store: &'a ArtifactStore, events: &'a EventSink, platform: Platform) -> Self {
        Self {
            store,
            events,
            platform,
        }
    }

    pub async fn resolve(&self, detail: &VersionDetail, classpath: &mut Classpath) -> LibraryReport {
        let libraries = detail.plain_libraries(self.platform);
        let total = libraries.len();
        let mut report = LibraryReport::default();

        self.events
            .status(format!("Checking {} libraries...", total));

        for (i, lib) in libraries.iter().enumerate() {
            let dest = self.store.layout().library_path(&lib.relative_path);
            let url = lib.download_url.clone();

            match self
                .store
                .ensure(ArtifactKind::Library, &dest, move || Ok(url))
                .await
            {
                Ok(Ensured::Cached) => {
                    report.cached += 1;
                    classpath.push(dest);
                }
                Ok(Ensured::Downloaded(bytes)) => {
                    debug!("Downloaded library {} ({} bytes)", lib.relative_path, bytes);
                    report.downloaded += 1;
                    classpath.push(dest);
                }
                Err(e) => {
                    report.failed += 1;
                    self.events
                        .warn(format!("Library {} failed: {}", lib.relative_path, e));
                }
            }

            self.events.progress("Libraries", i + 1, total);
        }

        self.events.info(format!(
            "Libraries: {} downloaded, {} cached, {} failed",
            report.downloaded, report.cached, report.failed
        ));
        report
    }
}
