//! Mapping service - the operations behind every command
//!
//! Each operation is one load-mutate-save cycle over the state file:
//! `init`, `load-concepts`, `add` and `status`. Outcomes come back as typed
//! values so the CLI decides how to print them.
//!
//! # Example
//!
//! ```no_run
//! use concept_map::mapping::{ConceptMapper, MappingRequest};
//! use concept_map::model::Confidence;
//! use concept_map::state::StateManager;
//!
//! let mapper = ConceptMapper::new(StateManager::new(".concept-map/concepts_map.json"));
//! mapper.init_project("demo", false)?;
//! mapper.load_concepts_from_file("taxonomy.json".as_ref())?;
//! mapper.add_mapping(MappingRequest {
//!     concept: "Decorators".to_string(),
//!     file_path: "src/cache.py".to_string(),
//!     identifier: Some("memoize".to_string()),
//!     lines: None,
//!     confidence: Confidence::High,
//!     pattern_type: "function_definition".to_string(),
//!     evidence: "returns a wrapper closure".to_string(),
//! })?;
//! # Ok::<(), concept_map::mapping::MappingError>(())
//! ```

mod service;
pub mod taxonomy;

pub use service::{parse_line_range, ConceptMapper};

use crate::locator::Span;
use crate::model::Confidence;
use crate::state::StateError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("No state file found at {}. Run 'init' first.", path.display())]
    NoState { path: PathBuf },

    #[error("Concept '{name}' not found. Load it first with 'load-concepts'.")]
    ConceptNotFound { name: String },

    #[error("Invalid line format '{input}': {reason}")]
    InvalidLineRange { input: String, reason: String },

    #[error("Could not determine lines. Provide a valid --identifier or --lines.")]
    LinesUnresolved { detail: Option<String> },

    #[error("Could not read file content at {path}:{start}-{end}")]
    SnippetUnavailable {
        path: String,
        start: usize,
        end: usize,
    },

    #[error("Concepts file not found: {}", path.display())]
    TaxonomyMissing { path: PathBuf },

    #[error("Failed to read concepts file {}: {source}", path.display())]
    TaxonomyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in concepts file {}: {message}", path.display())]
    TaxonomyInvalidJson { path: PathBuf, message: String },

    #[error("Concepts file {} has no 'concepts' list", path.display())]
    TaxonomyMissingConcepts { path: PathBuf },

    #[error("Failed to save state to {}", path.display())]
    SaveFailed { path: PathBuf },

    #[error(transparent)]
    State(#[from] StateError),
}

impl MappingError {
    /// True only for state-file corruption / schema violations
    pub fn is_fatal(&self) -> bool {
        matches!(self, MappingError::State(e) if e.is_fatal())
    }
}

// =============================================================================
// Operation inputs and outcomes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    /// State file present and `force` not set; nothing written
    AlreadyExists,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Display names added, in taxonomy order
    pub added: Vec<String>,
    /// Display names already present by normalized key
    pub skipped: Vec<String>,
    /// One message per malformed taxonomy entry
    pub rejected: Vec<String>,
    /// False when nothing was added and the save was skipped
    pub saved: bool,
}

/// Evidence to attach to a concept
#[derive(Debug, Clone)]
pub struct MappingRequest {
    pub concept: String,
    pub file_path: String,
    /// Class / function name, resolved by the locator
    pub identifier: Option<String>,
    /// Manual `start-end` fallback
    pub lines: Option<String>,
    pub confidence: Confidence,
    pub pattern_type: String,
    pub evidence: String,
}

/// Where a resolved span came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    Identifier,
    /// `--lines` used; carries why the identifier didn't resolve, if one was given
    Manual { fallback_reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { span: Span, source: LineSource },
    /// Same file and start line already recorded; nothing written
    Duplicate { file_path: String, line_start: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptSummary {
    pub key: String,
    pub display_name: String,
    pub implementations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub project: String,
    pub last_updated: Option<String>,
    /// Sorted by display name
    pub concepts: Vec<ConceptSummary>,
}
