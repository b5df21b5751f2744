use super::taxonomy::read_taxonomy;
use super::{
    AddOutcome, ConceptSummary, InitOutcome, LineSource, LoadOutcome, MappingError,
    MappingRequest, StatusReport,
};
use crate::clock;
use crate::locator::{self, Span};
use crate::model::{normalize_key, ConceptStore, Implementation};
use crate::snippet;
use crate::state::StateManager;
use std::path::Path;
use tracing::{debug, info, warn};

/// Orchestrates the concept map operations over one state file
#[derive(Debug, Clone)]
pub struct ConceptMapper {
    state: StateManager,
}

impl ConceptMapper {
    pub fn new(state: StateManager) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Load the store, treating an absent state file as an error
    fn load_required(&self) -> Result<ConceptStore, MappingError> {
        self.state.load()?.ok_or_else(|| MappingError::NoState {
            path: self.state.state_file().to_path_buf(),
        })
    }

    fn persist(&self, store: &mut ConceptStore) -> Result<(), MappingError> {
        if self.state.save(store) {
            Ok(())
        } else {
            Err(MappingError::SaveFailed {
                path: self.state.state_file().to_path_buf(),
            })
        }
    }

    // =========================================================================
    // init
    // =========================================================================

    /// Create an empty concept map. Refuses to overwrite unless `force`.
    ///
    /// With `force` the existing file is not read, so this also works over
    /// a corrupt state file (the old file is still backed up first).
    pub fn init_project(&self, project_name: &str, force: bool) -> Result<InitOutcome, MappingError> {
        if self.state.exists() && !force {
            return Ok(InitOutcome::AlreadyExists);
        }

        let mut store = self.state.initialize(project_name);
        self.persist(&mut store)?;
        info!(project = project_name, force, "initialized concept map");
        Ok(InitOutcome::Created)
    }

    // =========================================================================
    // load-concepts
    // =========================================================================

    /// Append concepts from a taxonomy file; existing keys are never overwritten
    pub fn load_concepts_from_file(&self, path: &Path) -> Result<LoadOutcome, MappingError> {
        let mut store = self.load_required()?;
        let taxonomy = read_taxonomy(path)?;

        let mut outcome = LoadOutcome {
            rejected: taxonomy.rejected,
            ..Default::default()
        };

        for entry in taxonomy.entries {
            let name = entry.name.trim().to_string();
            if store.insert_if_absent(entry.into_concept()) {
                outcome.added.push(name);
            } else {
                debug!(concept = %name, "concept already present, skipping");
                outcome.skipped.push(name);
            }
        }

        if !outcome.added.is_empty() {
            self.persist(&mut store)?;
            outcome.saved = true;
        }

        info!(
            added = outcome.added.len(),
            skipped = outcome.skipped.len(),
            rejected = outcome.rejected.len(),
            "loaded taxonomy"
        );
        Ok(outcome)
    }

    // =========================================================================
    // add
    // =========================================================================

    /// Attach one implementation to an existing concept
    pub fn add_mapping(&self, request: MappingRequest) -> Result<AddOutcome, MappingError> {
        let mut store = self.load_required()?;

        let key = normalize_key(&request.concept);
        if !store.concepts.contains_key(&key) {
            return Err(MappingError::ConceptNotFound {
                name: request.concept,
            });
        }

        let (span, source) = determine_lines(&request)?;

        let code_snippet = snippet::extract(Path::new(&request.file_path), span.start, Some(span.end))
            .filter(|text| !text.is_empty())
            .ok_or_else(|| MappingError::SnippetUnavailable {
                path: request.file_path.clone(),
                start: span.start,
                end: span.end,
            })?;

        let added_at = clock::timestamp(self.state.clock());
        let Some(concept) = store.concepts.get_mut(&key) else {
            return Err(MappingError::ConceptNotFound {
                name: request.concept,
            });
        };

        if concept.has_implementation_at(&request.file_path, span.start) {
            return Ok(AddOutcome::Duplicate {
                file_path: request.file_path,
                line_start: span.start,
            });
        }

        concept.implementations.push(Implementation {
            file_path: request.file_path,
            identifier: request.identifier,
            line_start: span.start,
            line_end: span.end,
            code_snippet,
            confidence: request.confidence,
            pattern_type: request.pattern_type,
            evidence: request.evidence,
            added_at,
        });

        self.persist(&mut store)?;
        info!(concept = %key, start = span.start, end = span.end, "mapped implementation");
        Ok(AddOutcome::Added { span, source })
    }

    // =========================================================================
    // status
    // =========================================================================

    pub fn status(&self) -> Result<StatusReport, MappingError> {
        let store = self.load_required()?;

        let concepts = store
            .sorted_by_display_name()
            .into_iter()
            .map(|(key, concept)| ConceptSummary {
                key: key.to_string(),
                display_name: concept.display_name.clone(),
                implementations: concept.implementations.len(),
            })
            .collect();

        Ok(StatusReport {
            project: store.metadata.project,
            last_updated: store.metadata.last_updated,
            concepts,
        })
    }
}

/// Identifier first, then the manual range
fn determine_lines(request: &MappingRequest) -> Result<(Span, LineSource), MappingError> {
    let mut fallback_reason = None;

    if let Some(identifier) = request.identifier.as_deref().filter(|i| !i.is_empty()) {
        match locator::locate(Path::new(&request.file_path), identifier) {
            Ok(Some(span)) => return Ok((span, LineSource::Identifier)),
            Ok(None) => {
                fallback_reason = Some(format!(
                    "identifier '{}' not found in {}",
                    identifier, request.file_path
                ));
            }
            Err(e) => {
                warn!(error = %e, "locator failed");
                fallback_reason = Some(e.to_string());
            }
        }
    }

    match request.lines.as_deref() {
        Some(lines) => {
            let span = parse_line_range(lines)?;
            Ok((span, LineSource::Manual { fallback_reason }))
        }
        None => Err(MappingError::LinesUnresolved {
            detail: fallback_reason,
        }),
    }
}

/// Parse `"start-end"` into an inclusive span
pub fn parse_line_range(input: &str) -> Result<Span, MappingError> {
    let invalid = |reason: &str| MappingError::InvalidLineRange {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = input.split('-').collect();
    let [start, end] = parts.as_slice() else {
        return Err(invalid("expected format: start-end"));
    };

    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| invalid("start is not a line number"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| invalid("end is not a line number"))?;

    if start == 0 {
        return Err(invalid("line numbers start at 1"));
    }
    if end < start {
        return Err(invalid("end line is before start line"));
    }

    Ok(Span { start, end })
}
