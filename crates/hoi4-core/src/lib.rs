//! hoi4-core: Core library for editing Hearts of Iron IV state files
//!
//! This library provides functionality to:
//! - Scan a states directory for state files and their provinces blocks
//! - Reassign provinces between states, keeping each province in exactly one state
//! - Build new state files and pick the next free state id
//! - Record state names in localisation files and discover country tags
//! - Resolve the workspace and its configured paths

pub mod builder;
pub mod config;
pub mod error;
pub mod localisation;
pub mod parser;
pub mod reassign;
pub mod scanner;
pub mod state;
pub mod tags;
pub mod text;

pub use builder::{build_state_text, create_state, next_state_id, CreatedState, NewStateSpec};
pub use config::{Config, Workspace, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use localisation::append_state_name;
pub use parser::{parse_id, parse_id_list};
pub use reassign::{
    apply_plan, plan_reassignment, reassign, FileChange, ReassignPlan, ReassignRequest,
    ReassignResult,
};
pub use scanner::{list_state_files, ScanResult, SkippedFile};
pub use state::{ProvinceId, ProvincesBlock, StateCategory, StateFile, StateId};
pub use tags::{is_valid_tag, load_country_tags};
pub use text::TextEncoding;
