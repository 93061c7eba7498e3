use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::downloader::part_path;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::platform::{is_shared_library, Platform};
use crate::core::store::{ArtifactKind, ArtifactStore};
use crate::core::version::VersionDetail;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NativeReport {
    pub bundles: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Unpacks the platform's native bundles into `natives/<id>/`.
pub struct NativeExtractor<'a> {
    store: &'a ArtifactStore,
    events: &'a EventSink,
    platform: Platform,
}

impl<'a> NativeExtractor<'a> {
    pub fn new(store: &'a ArtifactStore, events: &'a EventSink, platform: Platform) -> Self {
        Self {
            store,
            events,
            platform,
        }
    }

    /// Returns the natives directory, which exists afterwards even when no
    /// bundle applies to this platform.
    pub async fn extract(
        &self,
        version_id: &str,
        detail: &VersionDetail,
    ) -> LauncherResult<(PathBuf, NativeReport)> {
        let natives_dir = self.store.layout().natives_dir(version_id);
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .map_err(|e| LauncherError::io(&natives_dir, e))?;

        let bundles = detail.native_bundles(self.platform);
        let mut report = NativeReport {
            bundles: bundles.len(),
            ..NativeReport::default()
        };

        if bundles.is_empty() {
            self.events
                .info(format!("No native bundles for {}", self.platform));
            return Ok((natives_dir, report));
        }

        self.events.status("Extracting natives...");
        for bundle in bundles {
            let archive = self.store.layout().library_path(&bundle.relative_path);
            let url = bundle.download_url.clone();
            if let Err(e) = self
                .store
                .ensure(ArtifactKind::NativeBundle, &archive, move || Ok(url))
                .await
            {
                report.failed += 1;
                self.events
                    .warn(format!("Native bundle {} failed: {}", bundle.relative_path, e));
                continue;
            }

            let dest = natives_dir.clone();
            let source = archive.clone();
            let outcome = tokio::task::spawn_blocking(move || unpack_shared_libraries(&source, &dest))
                .await
                .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))
                .and_then(|r| r);

            match outcome {
                Ok((extracted, skipped)) => {
                    report.extracted += extracted;
                    report.skipped += skipped;
                }
                Err(e) => {
                    report.failed += 1;
                    self.events
                        .warn(format!("Cannot extract {:?}: {}", archive, e));
                }
            }
        }

        self.events.info(format!(
            "Natives: {} extracted, {} already present",
            report.extracted, report.skipped
        ));
        Ok((natives_dir, report))
    }
}

/// Copy every shared library entry into `dest_dir`, flattened to its file
/// name. Directories and `META-INF/` are ignored, existing files are kept.
/// Returns `(extracted, skipped)`.
fn unpack_shared_libraries(archive_path: &Path, dest_dir: &Path) -> LauncherResult<(usize, usize)> {
    let file = std::fs::File::open(archive_path).map_err(|e| LauncherError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut extracted = 0;
    let mut skipped = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if entry.is_dir() || name.starts_with("META-INF/") || !is_shared_library(&name) {
            continue;
        }
        let file_name = match name.rsplit(['/', '\\']).next() {
            Some(f) if !f.is_empty() => f.to_string(),
            _ => continue,
        };

        let dest = dest_dir.join(&file_name);
        if dest.exists() {
            skipped += 1;
            continue;
        }

        // A failed copy must not leave a partial file at `dest`.
        let tmp = part_path(&dest);
        if let Err(e) = copy_entry(&mut entry, &tmp) {
            let _ = std::fs::remove_file(&tmp);
            return Err(LauncherError::io(&dest, e));
        }
        std::fs::rename(&tmp, &dest).map_err(|e| LauncherError::io(&dest, e))?;
        debug!("Extracted native: {}", file_name);
        extracted += 1;
    }

    Ok((extracted, skipped))
}

fn copy_entry(entry: &mut impl std::io::Read, tmp: &Path) -> std::io::Result<()> {
    let mut out = std::fs::File::create(tmp)?;
    std::io::copy(entry, &mut out)?;
    out.sync_all()
}
