//! Workspace configuration
//!
//! Paths are stored relative to the workspace (mod) root in an optional
//! `hoi4-states.json` file. Missing fields fall back to the game's layout.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the config file at the workspace root
pub const CONFIG_FILE_NAME: &str = "hoi4-states.json";

/// Paths used by the tool, relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the state files
    pub states_directory: PathBuf,
    /// Localisation file receiving new state names
    pub localisation_file: PathBuf,
    /// Directory holding country tag definitions
    pub country_tags_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            states_directory: PathBuf::from("history/states"),
            localisation_file: PathBuf::from("localisation/state_names_l_english.yml"),
            country_tags_directory: PathBuf::from("common/country_tags"),
        }
    }
}

impl Config {
    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load the workspace's config file, or the defaults if it has none
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// A mod folder and its configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Workspace root directory
    pub root: PathBuf,
    /// Loaded configuration
    pub config: Config,
}

impl Workspace {
    /// Open a workspace at `root`, or at the current directory
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => env::current_dir()
                .map_err(|e| Error::NoWorkspace(format!("cannot read current directory: {}", e)))?,
        };

        if !root.is_dir() {
            return Err(Error::NoWorkspace(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }

        let config = Config::load_or_default(&root)?;
        Ok(Self { root, config })
    }

    /// Path of the config file for this workspace
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// States directory, which must exist
    pub fn states_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join(&self.config.states_directory);
        if !dir.is_dir() {
            return Err(Error::DirectoryMissing(dir));
        }
        Ok(dir)
    }

    /// Localisation file path (may not exist yet)
    pub fn localisation_file(&self) -> PathBuf {
        self.root.join(&self.config.localisation_file)
    }

    /// Country tags directory (may not exist)
    pub fn country_tags_dir(&self) -> PathBuf {
        self.root.join(&self.config.country_tags_directory)
    }
}
