//! Error types for hoi4-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hoi4-core
#[derive(Debug, Error)]
pub enum Error {
    /// No workspace root could be resolved
    #[error("no workspace folder: {0}")]
    NoWorkspace(String),

    /// The configured states directory does not exist
    #[error("states directory '{0}' does not exist or is not a directory")]
    DirectoryMissing(PathBuf),

    /// Malformed province or state ID text
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No state file declares the requested id
    #[error("could not find a state file for state ID {id} in '{directory}'")]
    TargetNotFound { id: u32, directory: PathBuf },

    /// More than one state file declares the same id
    #[error("state ID {id} is declared by both '{first}' and '{second}'")]
    DuplicateStateId {
        id: u32,
        first: PathBuf,
        second: PathBuf,
    },

    /// The target state has no provinces block to receive provinces
    #[error("target state {id} in file '{path}' is missing a provinces block")]
    TargetMissingProvincesBlock { id: u32, path: PathBuf },

    /// A provinces block that cannot be safely rewritten
    #[error("malformed provinces block in '{path}': {reason}")]
    MalformedProvincesBlock { path: PathBuf, reason: String },

    /// Internal consistency check failed
    #[error("internal consistency error: {0}")]
    Inconsistent(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file after `written` files were already rewritten
    #[error(
        "failed to write file '{path}' ({written} file(s) already rewritten, some files may already have been modified): {source}"
    )]
    FileWrite {
        path: PathBuf,
        written: usize,
        #[source]
        source: std::io::Error,
    },

    /// Refusing to overwrite an existing state file
    #[error("state file '{0}' already exists")]
    StateFileExists(PathBuf),

    /// The highest state id leaves no room for another
    #[error("no free state ID after {0}")]
    StateIdOverflow(u32),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
