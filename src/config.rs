use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".codecite.toml";

/// Build configuration loaded from `.codecite.toml`.
///
/// `roots` lists the base locations (absolute paths or URLs) of every
/// indexed documentation project. `packages` maps a top-level package
/// name to the directory holding its sources, for the import strategy.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Top-level package name to source-directory mapping.
    pub packages: HashMap<String, String>,
    /// Try the registered package sources before the inventory.
    pub prefer_import: bool,
    /// Fail the build on per-reference lookup errors instead of warning.
    pub reraise: bool,
    /// Base locations of indexed documentation projects.
    pub roots: Vec<String>,
    /// Timeout applied to every page and inventory fetch.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages: HashMap::new(),
            prefer_import: false,
            reraise: false,
            roots: Vec::new(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from `.codecite.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed, never a silent fallback when the
    /// user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.roots.is_empty());
        assert!(config.packages.is_empty());
        assert!(!config.prefer_import);
        assert!(!config.reraise);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "roots = [\"/docs/build\"]\nprefer_import = true\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.roots, vec!["/docs/build".to_string()]);
        assert!(config.prefer_import);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn package_table_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[packages]\nfake_project = \"python/fake_project\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(
            config.packages.get("fake_project").map(String::as_str),
            Some("python/fake_project")
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "roots = not-toml").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
