use serde::Serialize;

/// The three host platforms the distribution publishes native bundles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// OS name used by descriptor `rules` and `natives` maps.
    pub fn os_rule_name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "osx",
            Platform::Linux => "linux",
        }
    }

    /// Classifier key of the native bundle in `downloads.classifiers`.
    pub fn native_classifier(self) -> &'static str {
        match self {
            Platform::Windows => "natives-windows",
            Platform::MacOs => "natives-macos",
            Platform::Linux => "natives-linux",
        }
    }

    pub fn classpath_separator(self) -> &'static str {
        match self {
            Platform::Windows => ";",
            _ => ":",
        }
    }

    /// Environment variable the dynamic linker searches for shared libraries.
    pub fn library_path_var(self) -> &'static str {
        match self {
            Platform::Windows => "PATH",
            Platform::MacOs => "DYLD_LIBRARY_PATH",
            Platform::Linux => "LD_LIBRARY_PATH",
        }
    }

    pub fn java_executable(self) -> &'static str {
        match self {
            Platform::Windows => "java.exe",
            _ => "java",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

/// Whether an archive entry is a shared library the game loads at runtime.
pub fn is_shared_library(name: &str) -> bool {
    name.ends_with(".so")
        || name.ends_with(".dll")
        || name.ends_with(".dylib")
        || name.ends_with(".jnilib")
}
