//! Directory scanner for discovering HOI4 state files

use crate::error::{Error, Result};
use crate::state::{ProvinceId, StateFile, StateId};
use crate::text::read_text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A `.txt` file that could not be read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Why the file was skipped
    pub reason: String,
}

impl SkippedFile {
    /// Check if the file name follows the `<id>-<Name>.txt` convention for `id`
    pub fn looks_like_state(&self, id: StateId) -> bool {
        let stem = match self.path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s,
            None => return false,
        };
        let prefix = stem.split(&['-', ' ', '_'][..]).next().unwrap_or(stem);
        prefix.parse::<StateId>().ok() == Some(id)
    }
}

/// Result of scanning a states directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Directory that was scanned
    pub directory: PathBuf,
    /// Recognised state files, sorted by path
    pub states: Vec<StateFile>,
    /// Files that could not be read
    pub skipped: Vec<SkippedFile>,
    /// Readable `.txt` files without a state id
    pub ignored: Vec<PathBuf>,
}

impl ScanResult {
    /// Find the first state with the given id
    pub fn find_state(&self, id: StateId) -> Option<&StateFile> {
        self.states.iter().find(|s| s.id == id)
    }

    /// All states declaring the given id
    pub fn states_with_id(&self, id: StateId) -> Vec<&StateFile> {
        self.states.iter().filter(|s| s.id == id).collect()
    }

    /// Highest state id in the directory
    pub fn max_state_id(&self) -> Option<StateId> {
        self.states.iter().map(|s| s.id).max()
    }

    /// Map of province -> states listing it, in scan order
    pub fn province_owners(&self) -> BTreeMap<ProvinceId, Vec<StateId>> {
        let mut owners: BTreeMap<ProvinceId, Vec<StateId>> = BTreeMap::new();
        for state in &self.states {
            for &province in state.province_ids() {
                let entry = owners.entry(province).or_default();
                if !entry.contains(&state.id) {
                    entry.push(state.id);
                }
            }
        }
        owners
    }

    /// Provinces listed by more than one state
    pub fn contested_provinces(&self) -> BTreeMap<ProvinceId, Vec<StateId>> {
        self.province_owners()
            .into_iter()
            .filter(|(_, states)| states.len() > 1)
            .collect()
    }

    /// A skipped file whose name marks it as state `id`
    pub fn skipped_candidate(&self, id: StateId) -> Option<&SkippedFile> {
        self.skipped.iter().find(|f| f.looks_like_state(id))
    }
}

fn is_state_text(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

/// Scan a states directory for `.txt` state files
///
/// Only the top level of the directory is read. Unreadable files are
/// recorded in [`ScanResult::skipped`] rather than failing the scan.
pub fn list_state_files<P: AsRef<Path>>(directory: P) -> Result<ScanResult> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(Error::DirectoryMissing(directory.to_path_buf()));
    }

    let mut states = Vec::new();
    let mut skipped = Vec::new();
    let mut ignored = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                if !is_state_text(&path) {
                    continue;
                }
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();

        // Only process state text files
        if !entry.file_type().is_file() || !is_state_text(path) {
            continue;
        }

        let (content, encoding) = match read_text(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable state file");
                skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match StateFile::parse(path, content) {
            Some(state) => states.push(StateFile { encoding, ..state }),
            None => {
                debug!(path = %path.display(), "no state id found, ignoring");
                ignored.push(path.to_path_buf());
            }
        }
    }

    debug!(
        directory = %directory.display(),
        states = states.len(),
        skipped = skipped.len(),
        ignored = ignored.len(),
        "scanned states directory"
    );

    Ok(ScanResult {
        directory: directory.to_path_buf(),
        states,
        skipped,
        ignored,
    })
}
