pub mod runtime;

pub use runtime::{default_java_path, detect_major_version, physical_memory_mb, FALLBACK_MAJOR};
