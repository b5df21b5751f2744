//! Single source of truth for the concept map filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic.
//!
//! # Project Layout
//!
//! ```text
//! project/
//! ├── concept-map.toml              # Optional project config
//! └── .concept-map/
//!     ├── concepts_map.json         # State file (default location)
//!     ├── concepts_map.json.tmp     # Transient, only during a save
//!     └── .mapper_backups/          # Rolling backups
//!         └── concepts_map_YYYYMMDD_HHMMSS.json
//! ```
//!
//! The temp file and backup directory always sit next to the state file,
//! wherever the state file is configured to live.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Name of the backup directory, created beside the state file
pub const BACKUP_DIR_NAME: &str = ".mapper_backups";

/// Suffix appended to the state file name for the in-flight write
pub const TEMP_SUFFIX: &str = ".tmp";

/// Timestamp format embedded in backup file names
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// =============================================================================
// Project Level
// =============================================================================

/// Project config file: `concept-map.toml`
pub fn config_path(root: &Path) -> PathBuf {
    root.join("concept-map.toml")
}

/// Default state directory: `.concept-map/`
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(".concept-map")
}

/// Default state file: `.concept-map/concepts_map.json`
pub fn default_state_file(root: &Path) -> PathBuf {
    state_dir(root).join("concepts_map.json")
}

// =============================================================================
// Relative to a state file
// =============================================================================

fn parent_of(state_file: &Path) -> PathBuf {
    state_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Backup directory: `<state dir>/.mapper_backups/`
pub fn backup_dir(state_file: &Path) -> PathBuf {
    parent_of(state_file).join(BACKUP_DIR_NAME)
}

/// Temp file: `<state dir>/<state file name>.tmp`
pub fn temp_file(state_file: &Path) -> PathBuf {
    let name = state_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "state".to_string());
    parent_of(state_file).join(format!("{}{}", name, TEMP_SUFFIX))
}

/// File stem used to group backups of one state file
pub fn backup_stem(state_file: &Path) -> String {
    state_file
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "state".to_string())
}

/// Backup file name: `<stem>_<YYYYMMDD_HHMMSS>.json`
pub fn backup_file_name<Tz>(state_file: &Path, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.json",
        backup_stem(state_file),
        at.format(BACKUP_TIMESTAMP_FORMAT)
    )
}

/// True when `name` is a backup file of the state file with this stem
pub fn is_backup_of(stem: &str, name: &str) -> bool {
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| rest.ends_with(".json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_project_paths() {
        let root = Path::new("/tmp/test-project");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/test-project/concept-map.toml")
        );
        assert_eq!(
            default_state_file(root),
            PathBuf::from("/tmp/test-project/.concept-map/concepts_map.json")
        );
    }

    #[test]
    fn test_sibling_paths() {
        let state = Path::new("/data/ground_truth/concepts_map.json");
        assert_eq!(
            backup_dir(state),
            PathBuf::from("/data/ground_truth/.mapper_backups")
        );
        assert_eq!(
            temp_file(state),
            PathBuf::from("/data/ground_truth/concepts_map.json.tmp")
        );
        assert_eq!(backup_stem(state), "concepts_map");
    }

    #[test]
    fn test_backup_file_name() {
        let at = NaiveDate::from_ymd_opt(2025, 12, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let name = backup_file_name::<Utc>(Path::new("concepts_map.json"), &at);
        assert_eq!(name, "concepts_map_20251205_120000.json");
    }

    #[test]
    fn test_is_backup_of() {
        assert!(is_backup_of("concepts_map", "concepts_map_20251205_120000.json"));
        assert!(!is_backup_of("concepts_map", "other_20251205_120000.json"));
        assert!(!is_backup_of("concepts_map", "concepts_map.json"));
        assert!(!is_backup_of("concepts_map", "concepts_map_20251205_120000.txt"));
    }
}
