//! Core types for representing HOI4 state files

use crate::error::{Error, Result};
use crate::parser::{find_provinces_block, parse_state_id};
use crate::text::TextEncoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

/// Numeric province identifier
pub type ProvinceId = u32;

/// Numeric state identifier
pub type StateId = u32;

/// A single state file discovered in the states directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// Full path to the file
    pub path: PathBuf,
    /// State identifier from `state={ id = N }`
    pub id: StateId,
    /// Raw file content
    #[serde(skip)]
    pub content: String,
    /// Encoding the content was read with
    pub encoding: TextEncoding,
    /// The first provinces block in the file
    pub provinces: ProvincesBlock,
}

impl StateFile {
    /// Build a state file from its text, or `None` if the text declares no state id
    pub fn parse(path: impl Into<PathBuf>, content: String) -> Option<Self> {
        let id = parse_state_id(&content)?;
        let provinces = find_provinces_block(&content);
        Some(Self {
            path: path.into(),
            id,
            content,
            encoding: TextEncoding::Utf8,
            provinces,
        })
    }

    /// Province IDs listed in the block, empty when the block is absent or malformed
    pub fn province_ids(&self) -> &[ProvinceId] {
        self.provinces.ids().unwrap_or(&[])
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// The provinces block of a state file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProvincesBlock {
    /// No `provinces={` in the file
    Missing,
    /// A block that was found but cannot be rewritten safely
    Malformed { reason: String },
    /// A well-formed block
    Present {
        /// Byte range of the whole block, from `provinces` to the closing brace
        span: Range<usize>,
        /// Province IDs in textual order
        ids: Vec<ProvinceId>,
    },
}

impl ProvincesBlock {
    /// IDs of a well-formed block
    pub fn ids(&self) -> Option<&[ProvinceId]> {
        match self {
            ProvincesBlock::Present { ids, .. } => Some(ids),
            _ => None,
        }
    }

    /// Check if the block is present and well-formed
    pub fn is_present(&self) -> bool {
        matches!(self, ProvincesBlock::Present { .. })
    }
}

/// Settlement-size category of a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCategory {
    Enclave,
    TinyIsland,
    Pastoral,
    SmallIsland,
    Rural,
    Town,
    LargeTown,
    City,
    LargeCity,
    Metropolis,
    Megalopolis,
    Wasteland,
}

impl StateCategory {
    /// All categories, smallest settlements first
    pub const ALL: [StateCategory; 12] = [
        StateCategory::Enclave,
        StateCategory::TinyIsland,
        StateCategory::Pastoral,
        StateCategory::SmallIsland,
        StateCategory::Rural,
        StateCategory::Town,
        StateCategory::LargeTown,
        StateCategory::City,
        StateCategory::LargeCity,
        StateCategory::Metropolis,
        StateCategory::Megalopolis,
        StateCategory::Wasteland,
    ];

    /// The tag written to `state_category`
    pub fn as_str(&self) -> &'static str {
        match self {
            StateCategory::Enclave => "enclave",
            StateCategory::TinyIsland => "tiny_island",
            StateCategory::Pastoral => "pastoral",
            StateCategory::SmallIsland => "small_island",
            StateCategory::Rural => "rural",
            StateCategory::Town => "town",
            StateCategory::LargeTown => "large_town",
            StateCategory::City => "city",
            StateCategory::LargeCity => "large_city",
            StateCategory::Metropolis => "metropolis",
            StateCategory::Megalopolis => "megalopolis",
            StateCategory::Wasteland => "wasteland",
        }
    }
}

impl FromStr for StateCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        StateCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| {
                let names: Vec<&str> = StateCategory::ALL.iter().map(|c| c.as_str()).collect();
                Error::InvalidInput(format!(
                    "unknown state category '{}', expected one of: {}",
                    trimmed,
                    names.join(", ")
                ))
            })
    }
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
