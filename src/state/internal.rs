//! Internal implementation for the state module
//!
//! Save sequence: backup the live file, stamp `last_updated`, write the temp
//! file and fsync it, then rename it over the live file. Any failure after
//! the backup removes the temp file and leaves the live file as it was.

use crate::clock::{Clock, SystemClock};
use crate::model::{ConceptStore, Metadata, SCHEMA_VERSION};
use crate::paths;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Backups kept per state file unless configured otherwise
pub const DEFAULT_MAX_BACKUPS: usize = 5;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum StateError {
    #[error(
        "CORRUPTION DETECTED: Invalid JSON in {} at line {line}, column {column}",
        path.display()
    )]
    Corrupt {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid schema in {}: {reason}", path.display())]
    InvalidSchema { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Save failed: {0}")]
    Save(String),
}

impl StateError {
    /// Load failures that must stop the process for manual inspection
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StateError::Corrupt { .. } | StateError::InvalidSchema { .. } | StateError::Read { .. }
        )
    }
}

// =============================================================================
// State Manager
// =============================================================================

/// Owns one state file and its sibling backup directory and temp file
#[derive(Clone)]
pub struct StateManager {
    state_file: PathBuf,
    backup_dir: PathBuf,
    temp_file: PathBuf,
    max_backups: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("state_file", &self.state_file)
            .field("backup_dir", &self.backup_dir)
            .field("max_backups", &self.max_backups)
            .finish()
    }
}

impl StateManager {
    pub fn new(state_file: impl Into<PathBuf>) -> Self {
        let state_file = state_file.into();
        Self {
            backup_dir: paths::backup_dir(&state_file),
            temp_file: paths::temp_file(&state_file),
            state_file,
            max_backups: DEFAULT_MAX_BACKUPS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Keep at most `max_backups` backups (at least one)
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups.max(1);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn temp_file(&self) -> &Path {
        &self.temp_file
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.state_file.exists()
    }

    /// Fresh, empty store stamped with the current schema version
    pub fn initialize(&self, project_name: &str) -> ConceptStore {
        ConceptStore::new(Metadata {
            project: project_name.to_string(),
            version: SCHEMA_VERSION.to_string(),
            created_at: Some(self.clock.now().to_rfc3339()),
            last_updated: None,
        })
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the store; `Ok(None)` when no state file exists yet.
    ///
    /// Syntax errors are [`StateError::Corrupt`], missing or mistyped
    /// top-level sections are [`StateError::InvalidSchema`]. Nothing is ever
    /// repaired here.
    pub fn load(&self) -> Result<Option<ConceptStore>, StateError> {
        if !self.state_file.exists() {
            debug!(path = %self.state_file.display(), "no state file");
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.state_file).map_err(|source| StateError::Read {
            path: self.state_file.clone(),
            source,
        })?;

        let store = parse_store(&self.state_file, &contents)?;
        debug!(
            path = %self.state_file.display(),
            concepts = store.concepts.len(),
            "loaded state"
        );
        Ok(Some(store))
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Persist the store. Never errors past this boundary.
    ///
    /// Returns false when the save failed; the live file is then exactly what
    /// it was before the call.
    pub fn save(&self, store: &mut ConceptStore) -> bool {
        match self.try_save(store) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.state_file.display(), error = %e, "save failed");
                eprintln!("❌ {}", e);
                false
            }
        }
    }

    /// Fallible core of [`StateManager::save`]
    pub fn try_save(&self, store: &mut ConceptStore) -> Result<(), StateError> {
        let now = self.clock.now();

        if let Some(backup) = self.create_backup(&paths::backup_file_name(&self.state_file, &now))? {
            debug!(backup = %backup.display(), "backed up state");
        }

        let previous = store.metadata.last_updated.replace(now.to_rfc3339());

        if let Err(e) = self.write_atomically(store) {
            store.metadata.last_updated = previous;
            if self.temp_file.is_file() {
                if let Err(cleanup) = fs::remove_file(&self.temp_file) {
                    warn!(path = %self.temp_file.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            return Err(StateError::Save(e.to_string()));
        }

        info!(
            path = %self.state_file.display(),
            concepts = store.concepts.len(),
            "saved state"
        );
        Ok(())
    }

    fn write_atomically(&self, store: &ConceptStore) -> io::Result<()> {
        if let Some(parent) = self.state_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.temp_file)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, store).map_err(io::Error::other)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.temp_file, &self.state_file)?;
        sync_parent_dir(&self.state_file);
        Ok(())
    }

    // =========================================================================
    // Backups
    // =========================================================================

    /// Copy the live file into the backup directory, then prune.
    ///
    /// `Ok(None)` when there is no live file to back up.
    fn create_backup(&self, name: &str) -> Result<Option<PathBuf>, StateError> {
        if !self.state_file.is_file() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            StateError::Save(format!(
                "failed to create backup directory {}: {}",
                self.backup_dir.display(),
                e
            ))
        })?;

        let backup_path = self.backup_dir.join(name);
        fs::copy(&self.state_file, &backup_path).map_err(|e| {
            StateError::Save(format!(
                "failed to back up {} to {}: {}",
                self.state_file.display(),
                backup_path.display(),
                e
            ))
        })?;

        self.prune_backups();
        Ok(Some(backup_path))
    }

    /// Backups of this state file, oldest first (by modification time)
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let stem = paths::backup_stem(&self.state_file);
        let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if !paths::is_backup_of(&stem, &name.to_string_lossy()) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((modified, entry.path()));
        }

        // Names embed the timestamp, so they break mtime ties in order
        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    fn prune_backups(&self) {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(dir = %self.backup_dir.display(), error = %e, "failed to list backups");
                return;
            }
        };

        let excess = backups.len().saturating_sub(self.max_backups);
        for old in backups.into_iter().take(excess) {
            match fs::remove_file(&old) {
                Ok(()) => debug!(backup = %old.display(), "evicted old backup"),
                Err(e) => warn!(backup = %old.display(), error = %e, "failed to evict backup"),
            }
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_store(path: &Path, contents: &str) -> Result<ConceptStore, StateError> {
    let value: Value = serde_json::from_str(contents).map_err(|e| StateError::Corrupt {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        message: classify_message(&e),
    })?;

    if value.get("metadata").is_none() || value.get("concepts").is_none() {
        return Err(StateError::InvalidSchema {
            path: path.to_path_buf(),
            reason: "missing metadata or concepts".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| StateError::InvalidSchema {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn classify_message(e: &serde_json::Error) -> String {
    // serde_json appends "at line X column Y"; we report those separately
    let full = e.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            debug!(dir = %parent.display(), error = %e, "directory fsync skipped");
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
