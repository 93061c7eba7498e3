// ─── Java Runtime ───
// Interpreter location and version probing.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::core::platform::Platform;

/// Major version assumed when the interpreter cannot be probed.
pub const FALLBACK_MAJOR: u32 = 8;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// `$JAVA_HOME/bin/java[.exe]` when set, else the bare executable name
/// resolved through `PATH`.
pub fn default_java_path(platform: Platform) -> PathBuf {
    let java_home = std::env::var_os("JAVA_HOME").filter(|v| !v.is_empty());
    resolve_java_path(java_home.as_deref().map(Path::new), platform)
}

fn resolve_java_path(java_home: Option<&Path>, platform: Platform) -> PathBuf {
    match java_home {
        Some(home) => home.join("bin").join(platform.java_executable()),
        None => PathBuf::from(platform.java_executable()),
    }
}

/// Run `<java> -version` and read the major version from its banner.
#[instrument]
pub async fn detect_major_version(java: &Path) -> u32 {
    probe_major_version(java, PROBE_TIMEOUT).await
}

/// A probe that outlives `limit` is killed.
async fn probe_major_version(java: &Path, limit: Duration) -> u32 {
    let mut command = Command::new(java);
    command
        .arg("-version")
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!("Cannot run {:?} -version: {}", java, e);
            return FALLBACK_MAJOR;
        }
        Err(_) => {
            warn!("{:?} -version timed out", java);
            return FALLBACK_MAJOR;
        }
    };

    // The banner goes to stderr on every JDK we know of.
    let banner = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );
    debug!("Probing {:?}: {}", java, banner.lines().next().unwrap_or(""));

    parse_version_string(&banner)
        .map(|v| parse_major_version(&v))
        .filter(|major| *major > 0)
        .unwrap_or(FALLBACK_MAJOR)
}

/// Text between the first pair of quotes, e.g. `17.0.2` in
/// `openjdk version "17.0.2" 2022-01-18`.
pub fn parse_version_string(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let start = line.find('"')?;
        let rest = &line[start + 1..];
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    })
}

/// `1.8.0_392` → 8, `17.0.2` → 17, `21-ea` → 21. Unparseable → 0.
pub fn parse_major_version(version: &str) -> u32 {
    let mut parts = version.split('.').map(leading_number);
    let first = parts.next().flatten().unwrap_or(0);

    if first == 1 {
        parts.next().flatten().unwrap_or(first)
    } else {
        first
    }
}

fn leading_number(segment: &str) -> Option<u32> {
    let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Installed physical memory, in megabytes.
pub fn physical_memory_mb() -> Option<u64> {
    let mut system = sysinfo::System::new();
    system.refresh_memory();
    match system.total_memory() {
        0 => None,
        bytes => Some(bytes / (1024 * 1024)),
    }
}
