//! Project configuration stored in `concept-map.toml`
//!
//! Everything is optional; a missing file means all defaults. The resolved
//! [`Config`] is passed explicitly into the state manager and mapping
//! service, nothing reads paths from global state.

use crate::mapping::ConceptMapper;
use crate::paths;
use crate::state::{StateManager, DEFAULT_MAX_BACKUPS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk shape of `concept-map.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub state: StateSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSection {
    /// State file, relative to the project root unless absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Backups retained per state file
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

impl Default for StateSection {
    fn default() -> Self {
        Self {
            file: None,
            max_backups: default_max_backups(),
        }
    }
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub state_file: PathBuf,
    pub max_backups: usize,
}

impl Config {
    /// Defaults for a project root, ignoring any config file
    pub fn for_root(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            state_file: paths::default_state_file(&project_root),
            project_root,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Load `concept-map.toml` from `project_root` (if present)
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = paths::config_path(project_root);
        let file = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str::<ConfigFile>(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            ConfigFile::default()
        };

        let mut config = Self::for_root(project_root);
        if let Some(state_file) = file.state.file {
            config.state_file = project_root.join(state_file);
        }
        config.max_backups = file.state.max_backups.max(1);
        Ok(config)
    }

    /// Override the state file (CLI `--state`), resolved against the root
    pub fn with_state_file(mut self, state_file: impl AsRef<Path>) -> Self {
        self.state_file = self.project_root.join(state_file);
        self
    }

    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.state_file).with_max_backups(self.max_backups)
    }

    pub fn mapper(&self) -> ConceptMapper {
        ConceptMapper::new(self.state_manager())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();

        assert_eq!(config.state_file, paths::default_state_file(tmp.path()));
        assert_eq!(config.max_backups, 5);
    }

    #[test]
    fn test_load_overrides() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            paths::config_path(tmp.path()),
            "[state]\nfile = \"ground_truth/data/concepts_map.json\"\nmax_backups = 3\n",
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(
            config.state_file,
            tmp.path().join("ground_truth/data/concepts_map.json")
        );
        assert_eq!(config.max_backups, 3);
        assert_eq!(config.state_manager().max_backups(), 3);
    }

    #[test]
    fn test_zero_backups_clamped() {
        let tmp = TempDir::new().unwrap();
        fs::write(paths::config_path(tmp.path()), "[state]\nmax_backups = 0\n").unwrap();

        assert_eq!(Config::load(tmp.path()).unwrap().max_backups, 1);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(paths::config_path(tmp.path()), "[state\n").unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn test_state_override_absolute_and_relative() {
        let tmp = TempDir::new().unwrap();
        let config = Config::for_root(tmp.path()).with_state_file("maps/a.json");
        assert_eq!(config.state_file, tmp.path().join("maps/a.json"));

        let config = Config::for_root(tmp.path()).with_state_file("/abs/b.json");
        assert_eq!(config.state_file, PathBuf::from("/abs/b.json"));
    }
}
