//! Country tag discovery

use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

lazy_static! {
    static ref TAG_DEFINITION: Regex =
        Regex::new(r"(?m)^\s*([A-Z0-9]{3})\s*=").expect("tag definition regex");
}

/// Check that a tag is a 3-character code of uppercase letters or digits
pub fn is_valid_tag(tag: &str) -> bool {
    tag.len() == 3
        && tag
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Tags defined in one country tags file
pub fn parse_country_tags(content: &str) -> Vec<String> {
    TAG_DEFINITION
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// All tags defined in `.txt` files of the country tags directory, sorted
///
/// A missing directory yields no tags. Unreadable files are skipped.
pub fn load_country_tags<P: AsRef<Path>>(directory: P) -> Result<Vec<String>> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let mut tags = BTreeSet::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !path.extension().is_some_and(|ext| ext == "txt") {
            continue;
        }

        match fs::read_to_string(path) {
            Ok(content) => tags.extend(parse_country_tags(&content)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable tags file"),
        }
    }

    Ok(tags.into_iter().collect())
}
