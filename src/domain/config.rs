use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a specification workspace.
///
/// This struct holds settings that control where specifications and deltas
/// are looked up, and how strictly deltas are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Directory holding baseline specifications, relative to the workspace
    /// root.
    specs_dir: PathBuf,

    /// Directory holding delta documents, relative to the workspace root.
    changes_dir: PathBuf,

    /// Whether deltas must pass the applicability check before they are
    /// merged.
    ///
    /// When `false`, operations targeting missing requirements are silently
    /// skipped during the merge.
    pub check_applicability: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            specs_dir: default_specs_dir(),
            changes_dir: default_changes_dir(),
            check_applicability: true,
        }
    }
}

impl Config {
    /// The directory, relative to a workspace root, holding the config file.
    pub const DIR: &'static str = ".specdelta";

    /// The config file name inside [`Config::DIR`].
    pub const FILE: &'static str = "config.toml";

    /// The location of the config file for a workspace root.
    #[must_use]
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(Self::DIR).join(Self::FILE)
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration for a workspace root, falling back to the
    /// defaults if there is no readable config file.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(&Self::path_in(root)).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// Parent directories are created if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The specifications directory, relative to the workspace root.
    #[must_use]
    pub fn specs_dir(&self) -> &Path {
        &self.specs_dir
    }

    /// The deltas directory, relative to the workspace root.
    #[must_use]
    pub fn changes_dir(&self) -> &Path {
        &self.changes_dir
    }

    /// Sets the specifications directory.
    pub fn set_specs_dir(&mut self, dir: PathBuf) {
        self.specs_dir = dir;
    }

    /// Sets the deltas directory.
    pub fn set_changes_dir(&mut self, dir: PathBuf) {
        self.changes_dir = dir;
    }
}

fn default_specs_dir() -> PathBuf {
    PathBuf::from("specs")
}

fn default_changes_dir() -> PathBuf {
    PathBuf::from("changes")
}

const fn default_check_applicability() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_specs_dir")]
        specs_dir: PathBuf,

        #[serde(default = "default_changes_dir")]
        changes_dir: PathBuf,

        #[serde(default = "default_check_applicability")]
        check_applicability: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                specs_dir,
                changes_dir,
                check_applicability,
            } => Self {
                specs_dir,
                changes_dir,
                check_applicability,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            specs_dir: config.specs_dir,
            changes_dir: config.changes_dir,
            check_applicability: config.check_applicability,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nspecs_dir = \"docs/specs\"\nchanges_dir = \"docs/changes\"\ncheck_applicability = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.specs_dir(), Path::new("docs/specs"));
        assert_eq!(config.changes_dir(), Path::new("docs/changes"));
        assert!(!config.check_applicability);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ncheck_applicability = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_or_default() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.set_specs_dir(PathBuf::from("requirements"));
        config.check_applicability = false;

        config.save(&Config::path_in(tmp.path())).unwrap();

        assert_eq!(Config::load_or_default(tmp.path()), config);
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(tmp.path()), Config::default());
    }
}
