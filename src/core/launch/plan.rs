// ─── Launch Plan ───
// Builds the full interpreter invocation from the resolved version.

use std::path::PathBuf;

use crate::core::auth::OfflineIdentity;
use crate::core::http::{APP_NAME, APP_VERSION};
use crate::core::platform::Platform;
use crate::core::version::FALLBACK_MAIN_CLASS;

use super::classpath::{join_classpath, safe_path_str};

const MODULE_ACCESS_FLAGS: [&str; 6] = [
    "--add-opens=java.base/java.net=ALL-UNNAMED",
    "--add-opens=java.base/sun.nio.ch=ALL-UNNAMED",
    "--add-opens=java.base/java.lang=ALL-UNNAMED",
    "--add-opens=java.base/java.lang.reflect=ALL-UNNAMED",
    "--add-opens=java.base/java.util=ALL-UNNAMED",
    "--add-exports=java.base/sun.security.action=ALL-UNNAMED",
];

const INITIAL_HEAP: &str = "-Xms256M";

/// Everything the composer needs, gathered by the pipeline.
#[derive(Debug, Clone)]
pub struct LaunchInputs {
    pub version_id: String,
    pub interpreter: PathBuf,
    pub java_major: u32,
    pub platform: Platform,
    pub ram_megabytes: u32,
    pub game_root: PathBuf,
    pub natives_dir: PathBuf,
    pub asset_index_id: String,
    pub username: String,
    pub fullscreen: bool,
    /// Ordered entries, client jar last.
    pub classpath: Vec<PathBuf>,
    /// Persisted loader entry point; only read when loader mode is on.
    pub loader_entry_point: Option<String>,
    pub declared_main_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub interpreter: PathBuf,
    pub flags: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub entry_point: String,
    /// Game arguments as `(--name, value)` pairs; flags carry no value.
    pub arguments: Vec<(String, Option<String>)>,
    pub platform: Platform,
    pub working_dir: PathBuf,
    pub natives_dir: PathBuf,
}

pub struct LaunchComposer;

impl LaunchComposer {
    pub fn compose(inputs: LaunchInputs) -> LaunchPlan {
        let flags = runtime_flags(&inputs);
        let entry_point = resolve_entry_point(
            inputs.loader_entry_point.as_deref(),
            inputs.declared_main_class.as_deref(),
        );
        let identity = OfflineIdentity::derive(&inputs.username);

        let assets_dir = inputs.game_root.join("assets");
        let mut arguments: Vec<(String, Option<String>)> = vec![
            ("--version".into(), Some(inputs.version_id.clone())),
            ("--gameDir".into(), Some(safe_path_str(&inputs.game_root))),
            ("--assetsDir".into(), Some(safe_path_str(&assets_dir))),
            ("--assetIndex".into(), Some(inputs.asset_index_id.clone())),
            ("--uuid".into(), Some(identity.uuid)),
            ("--accessToken".into(), Some(identity.access_token)),
            ("--userType".into(), Some(identity.user_type)),
            ("--username".into(), Some(identity.username)),
        ];
        if inputs.fullscreen {
            arguments.push(("--fullscreen".into(), None));
        }

        LaunchPlan {
            interpreter: inputs.interpreter,
            flags,
            classpath: inputs.classpath,
            entry_point,
            arguments,
            platform: inputs.platform,
            working_dir: inputs.game_root,
            natives_dir: inputs.natives_dir,
        }
    }
}

fn runtime_flags(inputs: &LaunchInputs) -> Vec<String> {
    let mut flags = Vec::new();
    if inputs.platform == Platform::MacOs {
        flags.push("-XstartOnFirstThread".to_string());
    }
    if inputs.java_major >= 9 {
        flags.extend(MODULE_ACCESS_FLAGS.iter().map(|f| f.to_string()));
    }
    flags.push(format!("-Xmx{}M", inputs.ram_megabytes));
    flags.push(INITIAL_HEAP.to_string());
    flags.push(format!(
        "-Djava.library.path={}",
        safe_path_str(&inputs.natives_dir)
    ));
    flags.push(format!("-Dminecraft.launcher.brand={}", APP_NAME));
    flags.push(format!("-Dminecraft.launcher.version={}", APP_VERSION));
    flags
}

/// Loader entry point, then the descriptor's main class, then the vanilla
/// default.
pub fn resolve_entry_point(loader_entry: Option<&str>, declared: Option<&str>) -> String {
    loader_entry
        .or(declared)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(FALLBACK_MAIN_CLASS)
        .to_string()
}

/// Whether the requested heap is larger than the installed memory.
pub fn heap_exceeds_physical(ram_megabytes: u32, physical_mb: Option<u64>) -> bool {
    physical_mb.is_some_and(|total| u64::from(ram_megabytes) > total)
}

impl LaunchPlan {
    /// Arguments after the interpreter, in order.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.flags.clone();
        args.push("-cp".into());
        args.push(join_classpath(&self.classpath, self.platform));
        args.push(self.entry_point.clone());
        for (name, value) in &self.arguments {
            args.push(name.clone());
            if let Some(value) = value {
                args.push(value.clone());
            }
        }
        args
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Copy/paste-able command line for the log.
    pub fn display(&self) -> String {
        let mut parts = vec![shell_escape(&safe_path_str(&self.interpreter))];
        parts.extend(self.command_args().iter().map(|a| shell_escape(a)));
        parts.join(" ")
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | ',')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> LaunchInputs {
        LaunchInputs {
            version_id: "1.20.1".into(),
            interpreter: PathBuf::from("/usr/bin/java"),
            java_major: 17,
            platform: Platform::Linux,
            ram_megabytes: 2048,
            game_root: PathBuf::from("/mc"),
            natives_dir: PathBuf::from("/mc/natives/1.20.1"),
            asset_index_id: "5".into(),
            username: "Steve".into(),
            fullscreen: false,
            classpath: vec![
                PathBuf::from("/mc/libraries/a.jar"),
                PathBuf::from("/mc/versions/1.20.1/1.20.1.jar"),
            ],
            loader_entry_point: None,
            declared_main_class: Some("net.minecraft.client.main.Main".into()),
        }
    }

    #[test]
    fn steve_without_loader() {
        let plan = LaunchComposer::compose(inputs());

        assert_eq!(plan.entry_point, "net.minecraft.client.main.Main");
        assert_eq!(plan.argument("--username"), Some("Steve"));
        assert_eq!(plan.argument("--accessToken"), Some("0"));
        assert_eq!(plan.argument("--userType"), Some("legacy"));
        assert_eq!(plan.argument("--assetIndex"), Some("5"));
        assert_eq!(plan.argument("--assetsDir"), Some("/mc/assets"));
        assert_eq!(
            plan.argument("--uuid"),
            Some(crate::core::auth::offline_uuid("Steve").as_str())
        );
        assert!(!plan.arguments.iter().any(|(n, _)| n == "--fullscreen"));

        let names: Vec<_> = plan.arguments.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "--version",
                "--gameDir",
                "--assetsDir",
                "--assetIndex",
                "--uuid",
                "--accessToken",
                "--userType",
                "--username"
            ]
        );
    }

    #[test]
    fn flags_follow_platform_and_runtime() {
        let modern = LaunchComposer::compose(inputs());
        assert_eq!(modern.flags[0], MODULE_ACCESS_FLAGS[0]);
        assert!(modern.flags.contains(&"-Xmx2048M".to_string()));
        assert!(modern.flags.contains(&"-Xms256M".to_string()));
        assert!(modern
            .flags
            .contains(&"-Djava.library.path=/mc/natives/1.20.1".to_string()));

        let legacy = LaunchComposer::compose(LaunchInputs {
            java_major: 8,
            platform: Platform::MacOs,
            fullscreen: true,
            ..inputs()
        });
        assert_eq!(legacy.flags[0], "-XstartOnFirstThread");
        assert!(!legacy.flags.iter().any(|f| f.starts_with("--add-opens")));
        assert_eq!(
            legacy.arguments.last(),
            Some(&("--fullscreen".to_string(), None))
        );
    }

    #[test]
    fn entry_point_precedence() {
        assert_eq!(
            resolve_entry_point(Some("net.fabricmc.loader.impl.launch.knot.KnotClient"), Some("a.Main")),
            "net.fabricmc.loader.impl.launch.knot.KnotClient"
        );
        assert_eq!(resolve_entry_point(None, Some("a.Main")), "a.Main");
        assert_eq!(resolve_entry_point(None, None), FALLBACK_MAIN_CLASS);
    }

    #[test]
    fn command_args_put_classpath_before_entry_point() {
        let plan = LaunchComposer::compose(inputs());
        let args = plan.command_args();
        let cp = args.iter().position(|a| a == "-cp").unwrap();
        assert_eq!(
            args[cp + 1],
            "/mc/libraries/a.jar:/mc/versions/1.20.1/1.20.1.jar"
        );
        assert_eq!(args[cp + 2], "net.minecraft.client.main.Main");
        assert_eq!(args[cp + 3], "--version");
    }

    #[test]
    fn display_escapes_unsafe_tokens() {
        let plan = LaunchComposer::compose(LaunchInputs {
            game_root: PathBuf::from("/home/me/My Games"),
            ..inputs()
        });
        assert!(plan.display().contains("\"/home/me/My Games\""));
        assert!(plan.display().starts_with("/usr/bin/java "));
    }

    #[test]
    fn heap_warning_threshold() {
        assert!(heap_exceeds_physical(16384, Some(8192)));
        assert!(!heap_exceeds_physical(2048, Some(8192)));
        assert!(!heap_exceeds_physical(2048, None));
    }
}
