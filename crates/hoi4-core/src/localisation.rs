//! State name localisation file bookkeeping

use crate::error::{Error, Result};
use crate::state::StateId;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header line of an English localisation file
pub const LOCALISATION_HEADER: &str = "l_english:";

/// Localisation key for a state's display name
pub fn state_name_key(id: StateId) -> String {
    format!("STATE_{}", id)
}

/// Render one localisation entry, including its leading indent and newline
pub fn state_name_entry(id: StateId, name: &str) -> String {
    format!(" {}:0 \"{}\"\n", state_name_key(id), name)
}

/// Append a state's display name to a localisation file
///
/// A missing file is created with the `l_english:` header, along with any
/// missing parent directories. An existing file is never rewritten apart
/// from adding a final newline when it lacks one.
pub fn append_state_name(path: &Path, id: StateId, name: &str) -> Result<()> {
    let entry = state_name_entry(id, name);

    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}\n{}", LOCALISATION_HEADER, entry))?;
        info!(path = %path.display(), "created localisation file");
        return Ok(());
    }

    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut file = OpenOptions::new().append(true).open(path)?;
    if !content.is_empty() && !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.write_all(entry.as_bytes())?;

    info!(path = %path.display(), entry = entry.trim(), "appended state name");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entry_format() {
        assert_eq!(state_name_entry(42, "Gerald"), " STATE_42:0 \"Gerald\"\n");
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("localisation/state_names_l_english.yml");

        append_state_name(&path, 7, "Tyrol").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "l_english:\n STATE_7:0 \"Tyrol\"\n"
        );
    }

    #[test]
    fn test_append_adds_missing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.yml");
        fs::write(&path, "l_english:\n STATE_1:0 \"Savoy\"").unwrap();

        append_state_name(&path, 2, "Nice").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "l_english:\n STATE_1:0 \"Savoy\"\n STATE_2:0 \"Nice\"\n"
        );
    }

    #[test]
    fn test_append_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.yml");
        fs::write(&path, "l_english:\n").unwrap();

        append_state_name(&path, 3, "Istria").unwrap();
        append_state_name(&path, 4, "Dalmatia").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "l_english:\n STATE_3:0 \"Istria\"\n STATE_4:0 \"Dalmatia\"\n"
        );
    }
}
