//! Creation of new state files

use crate::error::{Error, Result};
use crate::localisation::append_state_name;
use crate::parser::join_ids;
use crate::reassign::{apply_plan, plan_reassignment, ReassignRequest, ReassignResult};
use crate::scanner::list_state_files;
use crate::state::{ProvinceId, StateCategory, StateFile, StateId};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything needed to create a new state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStateSpec {
    /// New state id, usually from [`next_state_id`]
    pub id: StateId,
    /// Display name, recorded in the localisation file
    pub name: String,
    /// Settlement-size category
    pub category: StateCategory,
    /// Owner country tag
    pub owner: String,
    /// Country tags with a core on the state
    pub cores: Vec<String>,
    /// Initial provinces, in the order they are written
    pub provinces: Vec<ProvinceId>,
}

impl NewStateSpec {
    /// File name for the new state
    pub fn file_name(&self) -> String {
        format!("{}-NewState.txt", self.id)
    }

    /// Render the state file text
    pub fn render(&self) -> String {
        build_state_text(
            self.id,
            self.category,
            &self.owner,
            self.cores.as_slice(),
            &self.provinces,
        )
    }
}

/// Render the text of a new state file
///
/// Provinces are written in the order given. `add_core_of` lines are left
/// out entirely when there are no core tags.
pub fn build_state_text<S: AsRef<str>>(
    id: StateId,
    category: StateCategory,
    owner: &str,
    cores: &[S],
    provinces: &[ProvinceId],
) -> String {
    let mut text = format!(
        "state={{\n\tid = {id}\n\tname = \"STATE_{id}\"\n\tmanpower = 1\n\tstate_category = {category}\n\thistory={{\n\t\towner = {owner}\n"
    );
    for core in cores {
        text.push_str("\t\tadd_core_of = ");
        text.push_str(core.as_ref());
        text.push('\n');
    }
    text.push_str("\t}\n\tprovinces={\n\t\t");
    text.push_str(&join_ids(provinces));
    text.push_str("\n\t}\n}");
    text
}

/// One past the highest state id in the directory, or 1 if there are none
pub fn next_state_id<P: AsRef<Path>>(directory: P) -> Result<StateId> {
    let scan = list_state_files(directory)?;
    match scan.max_state_id() {
        None => Ok(1),
        Some(id) => id.checked_add(1).ok_or(Error::StateIdOverflow(id)),
    }
}

/// Result of creating a state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedState {
    /// The new state id
    pub id: StateId,
    /// The new state file
    pub path: PathBuf,
    /// Localisation file the display name was written to
    pub localisation: Option<PathBuf>,
    /// Reassignment that moved the provinces into the new state
    pub reassignment: ReassignResult,
}

/// Write a new state file and move its provinces away from their old states
///
/// The whole reassignment is planned, with the new file already in place,
/// before anything is written. A failure to update the localisation file
/// is logged and does not stop the creation.
pub fn create_state<P: AsRef<Path>>(
    directory: P,
    spec: &NewStateSpec,
    localisation: Option<&Path>,
) -> Result<CreatedState> {
    let directory = directory.as_ref();
    let request = ReassignRequest::new(spec.provinces.iter().copied(), spec.id)?;

    let path = directory.join(spec.file_name());
    let mut scan = list_state_files(directory)?;
    if path.exists() {
        return Err(Error::StateFileExists(path));
    }

    let text = spec.render();
    let state = StateFile::parse(&path, text.clone()).ok_or_else(|| {
        Error::Inconsistent(format!("generated text for state {} has no id", spec.id))
    })?;
    scan.states.push(state);
    let plan = plan_reassignment(&scan, &request)?;

    write_new_file(&path, &text)?;
    info!(path = %path.display(), id = spec.id, "created state file");

    let reassignment = apply_plan(&plan)?;

    let localisation = localisation.and_then(|loc| {
        match append_state_name(loc, spec.id, &spec.name) {
            Ok(()) => Some(loc.to_path_buf()),
            Err(e) => {
                warn!(path = %loc.display(), error = %e, "failed to update localisation file");
                None
            }
        }
    });

    Ok(CreatedState {
        id: spec.id,
        path,
        localisation,
        reassignment,
    })
}

/// Create `path` with `text`, failing if something already exists there
fn write_new_file(path: &Path, text: &str) -> Result<()> {
    let write_error = |source| Error::FileWrite {
        path: path.to_path_buf(),
        written: 0,
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e: io::Error| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::StateFileExists(path.to_path_buf()),
            _ => write_error(e),
        })?;
    file.write_all(text.as_bytes()).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn spec(cores: &[&str]) -> NewStateSpec {
        NewStateSpec {
            id: 42,
            name: "Gerald".to_string(),
            category: StateCategory::Town,
            owner: "ITA".to_string(),
            cores: cores.iter().map(|c| c.to_string()).collect(),
            provinces: vec![30, 10, 20],
        }
    }

    #[test]
    fn test_build_state_text_with_cores() {
        let text = build_state_text(42, StateCategory::Town, "ITA", &["ITA", "GER"], &[30, 10]);
        assert_eq!(
            text,
            "state={\n\tid = 42\n\tname = \"STATE_42\"\n\tmanpower = 1\n\tstate_category = town\n\thistory={\n\t\towner = ITA\n\t\tadd_core_of = ITA\n\t\tadd_core_of = GER\n\t}\n\tprovinces={\n\t\t30 10\n\t}\n}"
        );
    }

    #[test]
    fn test_build_state_text_without_cores() {
        let text = build_state_text::<&str>(7, StateCategory::Rural, "GER", &[], &[1]);
        assert!(!text.contains("add_core_of"));
        assert!(text.contains("\t\towner = GER\n\t}\n"));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_build_state_text_core_order() {
        let text = spec(&["ITA", "GER"]).render();
        let cores: Vec<&str> = text
            .lines()
            .filter(|l| l.contains("add_core_of"))
            .map(str::trim)
            .collect();
        assert_eq!(cores, vec!["add_core_of = ITA", "add_core_of = GER"]);
    }

    #[test]
    fn test_next_state_id_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(next_state_id(dir.path()).unwrap(), 1);
    }

    #[test]
    fn test_next_state_id_after_max() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("41-A.txt"), "state={ id = 41 }").unwrap();
        fs::write(dir.path().join("3-B.txt"), "state={ id = 3 }").unwrap();
        assert_eq!(next_state_id(dir.path()).unwrap(), 42);
    }

    #[test]
    fn test_next_state_id_overflow() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("4294967295-Last.txt"), "state={ id = 4294967295 }").unwrap();
        assert!(matches!(
            next_state_id(dir.path()),
            Err(Error::StateIdOverflow(u32::MAX))
        ));
    }

    #[test]
    fn test_create_state_moves_provinces() {
        let dir = tempdir().unwrap();
        let states = dir.path().join("states");
        fs::create_dir(&states).unwrap();
        fs::write(states.join("1-A.txt"), "state={ id = 1 provinces={ 10 11 20 } }").unwrap();
        let loc = dir.path().join("localisation/state_names_l_english.yml");

        let created = create_state(&states, &spec(&["ITA"]), Some(&loc)).unwrap();

        assert_eq!(created.path, states.join("42-NewState.txt"));
        assert_eq!(created.localisation.as_deref(), Some(loc.as_path()));
        assert_eq!(created.reassignment.removed_from[&1], vec![10, 20]);

        let scan = list_state_files(&states).unwrap();
        assert_eq!(scan.find_state(1).unwrap().province_ids(), &[11]);
        assert_eq!(scan.find_state(42).unwrap().province_ids(), &[10, 20, 30]);

        let loc_text = fs::read_to_string(&loc).unwrap();
        assert_eq!(loc_text, "l_english:\n STATE_42:0 \"Gerald\"\n");
    }

    #[test]
    fn test_create_state_refuses_overwrite() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("42-NewState.txt"), "keep me").unwrap();

        let err = create_state(dir.path(), &spec(&[]), None).unwrap_err();

        assert!(matches!(err, Error::StateFileExists(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("42-NewState.txt")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_create_state_writes_nothing_when_planning_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1-A.txt"), "state={ id = 1 provinces={ 10 11 } }").unwrap();
        fs::write(dir.path().join("2-B.txt"), "state={ id = 2 provinces={ 3 { 4 } } }").unwrap();
        let loc = dir.path().join("state_names_l_english.yml");
        let mut new_state = spec(&[]);
        new_state.id = 3;
        new_state.provinces = vec![10];

        let err = create_state(dir.path(), &new_state, Some(&loc)).unwrap_err();

        assert!(matches!(err, Error::MalformedProvincesBlock { .. }));
        assert!(!dir.path().join("3-NewState.txt").exists());
        assert!(!loc.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("1-A.txt")).unwrap(),
            "state={ id = 1 provinces={ 10 11 } }"
        );
        assert_eq!(next_state_id(dir.path()).unwrap(), 3);
    }

    #[test]
    fn test_create_state_rejects_taken_id() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("42-Other.txt"), "state={ id = 42 provinces={ 1 } }").unwrap();

        let err = create_state(dir.path(), &spec(&[]), None).unwrap_err();

        assert!(matches!(err, Error::DuplicateStateId { id: 42, .. }));
        assert!(!dir.path().join("42-NewState.txt").exists());
    }

    #[test]
    fn test_write_new_file_never_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("42-NewState.txt");
        write_new_file(&path, "first").unwrap();

        let err = write_new_file(&path, "second").unwrap_err();

        assert!(matches!(err, Error::StateFileExists(p) if p == path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }
}
