use std::fmt;

use crate::core::error::{LauncherError, LauncherResult};

/// A loader library coordinate:
/// `group:artifact:version[:classifier][@extension]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    /// Defaults to `jar`.
    pub extension: String,
}

impl MavenCoordinate {
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let invalid = || LauncherError::InvalidMavenCoordinate(coord.to_string());

        let (body, extension) = match coord.rsplit_once('@') {
            Some((body, ext)) if !ext.is_empty() => (body, ext),
            Some(_) => return Err(invalid()),
            None => (coord, "jar"),
        };

        let parts: Vec<&str> = body.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }

        let classifier = match parts.len() {
            3 => None,
            4 => Some(parts[3].to_string()),
            _ => return Err(invalid()),
        };

        Ok(Self {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier,
            extension: extension.to_string(),
        })
    }

    /// `artifact-version[-classifier].extension`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{}.{}", self.artifact, self.version, c, self.extension),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Repository-relative path with forward slashes; the same string locates
    /// the file under `libraries/` and under the repository base.
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.filename()
        )
    }

    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}",
            repo_base.trim_end_matches('/'),
            self.relative_path()
        )
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let c = MavenCoordinate::parse("net.fabricmc:fabric-loader:0.15.11").unwrap();
        assert_eq!(c.group, "net.fabricmc");
        assert_eq!(c.artifact, "fabric-loader");
        assert_eq!(c.version, "0.15.11");
        assert_eq!(c.classifier, None);
        assert_eq!(c.extension, "jar");
        assert_eq!(
            c.relative_path(),
            "net/fabricmc/fabric-loader/0.15.11/fabric-loader-0.15.11.jar"
        );
    }

    #[test]
    fn classifier_and_extension() {
        let c = MavenCoordinate::parse("org.ow2.asm:asm:9.6:sources@zip").unwrap();
        assert_eq!(c.filename(), "asm-9.6-sources.zip");
        assert_eq!(c.to_string(), "org.ow2.asm:asm:9.6:sources@zip");
    }

    #[test]
    fn url_joins_repository_base() {
        let c = MavenCoordinate::parse("net.fabricmc:intermediary:1.20.1").unwrap();
        assert_eq!(
            c.url("https://maven.fabricmc.net/"),
            "https://maven.fabricmc.net/net/fabricmc/intermediary/1.20.1/intermediary-1.20.1.jar"
        );
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        for bad in ["net.fabricmc:loader", "a:b:c:d:e", "a::1.0", "a:b:1.0@"] {
            assert!(
                matches!(
                    MavenCoordinate::parse(bad),
                    Err(LauncherError::InvalidMavenCoordinate(_))
                ),
                "{} should be rejected",
                bad
            );
        }
    }
}
