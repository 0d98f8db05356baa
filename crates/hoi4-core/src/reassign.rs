//! Province reassignment engine
//!
//! Moving provinces happens in two steps so that nothing touches the disk
//! until every state file has been checked:
//! - [`plan_reassignment`] computes the new text of each affected file
//! - [`apply_plan`] writes those files back, in scan order

use crate::error::{Error, Result};
use crate::parser::{parse_id, parse_id_list, splice_provinces_block};
use crate::scanner::{list_state_files, ScanResult, SkippedFile};
use crate::state::{ProvinceId, ProvincesBlock, StateFile, StateId};
use crate::text::{encode, TextEncoding};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A request to move provinces into one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct ReassignRequest {
    provinces: Vec<ProvinceId>,
    target: StateId,
}

/// Unchecked form of a request, as read from JSON
#[derive(Deserialize)]
struct RawRequest {
    provinces: Vec<ProvinceId>,
    target: StateId,
}

impl TryFrom<RawRequest> for ReassignRequest {
    type Error = Error;

    fn try_from(raw: RawRequest) -> Result<Self> {
        Self::new(raw.provinces, raw.target)
    }
}

impl ReassignRequest {
    /// Create a request, dropping repeated provinces but keeping their first-seen order
    pub fn new(provinces: impl IntoIterator<Item = ProvinceId>, target: StateId) -> Result<Self> {
        if target == 0 {
            return Err(Error::InvalidInput("state ID must be positive, got 0".to_string()));
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for province in provinces {
            if province == 0 {
                return Err(Error::InvalidInput(
                    "province IDs must be positive, got 0".to_string(),
                ));
            }
            if seen.insert(province) {
                unique.push(province);
            }
        }

        if unique.is_empty() {
            return Err(Error::InvalidInput(
                "please enter at least one province ID".to_string(),
            ));
        }

        Ok(Self {
            provinces: unique,
            target,
        })
    }

    /// Parse a request from user text, e.g. `"1234 5678"` and `"106"`
    pub fn parse(provinces: &str, target: &str) -> Result<Self> {
        Self::new(parse_id_list(provinces)?, parse_id(target)?)
    }

    /// Requested provinces in request order
    pub fn provinces(&self) -> &[ProvinceId] {
        &self.provinces
    }

    /// State that receives the provinces
    pub fn target(&self) -> StateId {
        self.target
    }
}

/// A pending rewrite of one state file
#[derive(Debug, Clone)]
pub struct FileChange {
    /// File to rewrite
    pub path: PathBuf,
    /// State declared by the file
    pub state_id: StateId,
    /// Provinces this state loses
    pub removed: Vec<ProvinceId>,
    /// Provinces this state gains (target only)
    pub added: Vec<ProvinceId>,
    /// New full text of the file
    pub content: String,
    /// Encoding to write the text back with
    pub encoding: TextEncoding,
}

/// Every file rewrite needed to satisfy a request
#[derive(Debug, Clone)]
pub struct ReassignPlan {
    /// Target state id
    pub target: StateId,
    /// File declaring the target state
    pub target_path: PathBuf,
    /// Files whose text changes, in scan order
    pub changes: Vec<FileChange>,
    /// Unreadable files left out of the plan
    pub skipped: Vec<SkippedFile>,
}

impl ReassignPlan {
    /// Check if applying the plan would leave the directory as it is
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Summarise the plan as if every change were written
    pub fn summary(&self) -> ReassignResult {
        let mut removed_from = BTreeMap::new();
        let mut added = Vec::new();

        for change in &self.changes {
            if !change.removed.is_empty() {
                removed_from.insert(change.state_id, change.removed.clone());
            }
            if change.path == self.target_path {
                added = change.added.clone();
            }
        }

        ReassignResult {
            target: self.target,
            files_written: self.changes.iter().map(|c| c.path.clone()).collect(),
            removed_from,
            added,
            skipped: self.skipped.clone(),
        }
    }
}

/// Outcome of a reassignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignResult {
    /// Target state id
    pub target: StateId,
    /// Files that were (or, for a preview, would be) written
    pub files_written: Vec<PathBuf>,
    /// Provinces taken away from each previous owner
    pub removed_from: BTreeMap<StateId, Vec<ProvinceId>>,
    /// Provinces the target did not list before
    pub added: Vec<ProvinceId>,
    /// Unreadable files that were not checked; provinces they list were not moved
    pub skipped: Vec<SkippedFile>,
}

impl ReassignResult {
    /// Check if every state file in the directory was read
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Find the single state file that can receive provinces
fn resolve_target(scan: &ScanResult, id: StateId) -> Result<&StateFile> {
    let matches = scan.states_with_id(id);

    let target = match matches.as_slice() {
        [] => {
            // An unreadable file may be the target; we only know it by its name
            if let Some(skipped) = scan.skipped_candidate(id) {
                return Err(Error::FileRead {
                    path: skipped.path.clone(),
                    source: io::Error::new(io::ErrorKind::Other, skipped.reason.clone()),
                });
            }
            return Err(Error::TargetNotFound {
                id,
                directory: scan.directory.clone(),
            });
        }
        [single] => *single,
        [first, second, ..] => {
            return Err(Error::DuplicateStateId {
                id,
                first: first.path.clone(),
                second: second.path.clone(),
            })
        }
    };

    match &target.provinces {
        ProvincesBlock::Present { .. } => Ok(target),
        ProvincesBlock::Missing => Err(Error::TargetMissingProvincesBlock {
            id,
            path: target.path.clone(),
        }),
        ProvincesBlock::Malformed { reason } => Err(Error::MalformedProvincesBlock {
            path: target.path.clone(),
            reason: reason.clone(),
        }),
    }
}

/// Compute the file rewrites for a request without touching the disk
///
/// The target's list becomes its old list minus the request, plus the
/// request, sorted ascending. Every other state only loses requested
/// provinces and keeps the order of the rest. Files that do not change
/// are left out of the plan.
pub fn plan_reassignment(scan: &ScanResult, request: &ReassignRequest) -> Result<ReassignPlan> {
    let target = resolve_target(scan, request.target)?;
    let requested: HashSet<ProvinceId> = request.provinces.iter().copied().collect();
    let mut changes = Vec::new();

    for state in &scan.states {
        let is_target = state.path == target.path;

        let (span, ids) = match &state.provinces {
            ProvincesBlock::Present { span, ids } => (span, ids),
            ProvincesBlock::Missing if is_target => {
                return Err(Error::Inconsistent(format!(
                    "target state {} lost its provinces block during planning",
                    state.id
                )))
            }
            ProvincesBlock::Missing => continue,
            ProvincesBlock::Malformed { reason } => {
                return Err(Error::MalformedProvincesBlock {
                    path: state.path.clone(),
                    reason: reason.clone(),
                })
            }
        };

        let (removed, mut remaining): (Vec<ProvinceId>, Vec<ProvinceId>) =
            ids.iter().copied().partition(|id| requested.contains(id));

        let (removed, added) = if is_target {
            let added: Vec<ProvinceId> = request
                .provinces
                .iter()
                .copied()
                .filter(|id| !removed.contains(id))
                .collect();
            remaining.extend_from_slice(&request.provinces);
            remaining.sort_unstable();
            remaining.dedup();
            (Vec::new(), added)
        } else if removed.is_empty() {
            continue;
        } else {
            (removed, Vec::new())
        };

        let content = splice_provinces_block(&state.content, span, &remaining);
        if content == state.content {
            continue;
        }

        changes.push(FileChange {
            path: state.path.clone(),
            state_id: state.id,
            removed,
            added,
            content,
            encoding: state.encoding,
        });
    }

    Ok(ReassignPlan {
        target: request.target,
        target_path: target.path.clone(),
        changes,
        skipped: scan.skipped.clone(),
    })
}

/// Write every change in the plan
///
/// Stops at the first failed write. Files written before the failure stay
/// rewritten; the error reports how many there were.
pub fn apply_plan(plan: &ReassignPlan) -> Result<ReassignResult> {
    for (written, change) in plan.changes.iter().enumerate() {
        fs::write(&change.path, encode(&change.content, change.encoding)).map_err(|source| {
            Error::FileWrite {
                path: change.path.clone(),
                written,
                source,
            }
        })?;

        info!(
            path = %change.path.display(),
            state = change.state_id,
            removed = ?change.removed,
            added = ?change.added,
            "rewrote state file"
        );
    }

    for file in &plan.skipped {
        warn!(path = %file.path.display(), reason = %file.reason, "state file was not checked");
    }

    Ok(plan.summary())
}

/// Move the requested provinces into the target state
pub fn reassign<P: AsRef<Path>>(directory: P, request: &ReassignRequest) -> Result<ReassignResult> {
    let scan = list_state_files(directory)?;
    let plan = plan_reassignment(&scan, request)?;
    apply_plan(&plan)
}
