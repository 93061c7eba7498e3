use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the bootstrapper.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Documents ───────────────────────────────────────
    #[error("Descriptor field missing: {0}")]
    MissingDescriptorField(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Loader ──────────────────────────────────────────
    #[error("Loader error: {0}")]
    Loader(String),

    // ── Launch ──────────────────────────────────────────
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Launch failed: {0}")]
    Launch(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Transport failures and non-success statuses. Callers decide whether
    /// the missing item is mandatory.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::DownloadFailed { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failures_are_network_errors() {
        let err = LauncherError::DownloadFailed {
            url: "https://example.com/a.jar".into(),
            status: 404,
        };
        assert!(err.is_network());
        assert_eq!(
            err.to_string(),
            "Download failed for https://example.com/a.jar: HTTP 404"
        );
    }

    #[test]
    fn descriptor_errors_are_not_network_errors() {
        assert!(!LauncherError::MissingDescriptorField("downloads.client.url").is_network());
        assert!(!LauncherError::Loader("no builds".into()).is_network());
    }
}
