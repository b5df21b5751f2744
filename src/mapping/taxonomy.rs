//! Taxonomy file parsing
//!
//! ```json
//! { "concepts": [ { "name": "Decorators", "description": "...",
//!                   "keywords": ["@"], "languages": ["python"], "category": "syntax" } ] }
//! ```

use super::MappingError;
use crate::model::Concept;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TaxonomyEntry {
    pub fn into_concept(self) -> Concept {
        Concept {
            display_name: self.name.trim().to_string(),
            definition: self.description,
            keywords: self.keywords,
            languages: self.languages,
            category: self.category,
            implementations: Vec::new(),
        }
    }
}

/// Parsed taxonomy: usable entries plus a reason for each rejected one
#[derive(Debug, Default)]
pub struct Taxonomy {
    pub entries: Vec<TaxonomyEntry>,
    pub rejected: Vec<String>,
}

/// Read and validate a taxonomy document.
///
/// Whole-file problems are errors; a malformed entry is only recorded in
/// [`Taxonomy::rejected`] so the rest of the file still loads.
pub fn read_taxonomy(path: &Path) -> Result<Taxonomy, MappingError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MappingError::TaxonomyMissing {
            path: path.to_path_buf(),
        },
        _ => MappingError::TaxonomyRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    parse_taxonomy(path, &contents)
}

pub fn parse_taxonomy(path: &Path, contents: &str) -> Result<Taxonomy, MappingError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|e| MappingError::TaxonomyInvalidJson {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let items = value
        .get("concepts")
        .and_then(Value::as_array)
        .ok_or_else(|| MappingError::TaxonomyMissingConcepts {
            path: path.to_path_buf(),
        })?;

    let mut taxonomy = Taxonomy::default();
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<TaxonomyEntry>(item.clone()) {
            Ok(entry) if !entry.name.trim().is_empty() => taxonomy.entries.push(entry),
            Ok(_) => {
                warn!(index, "skipping taxonomy entry with empty name");
                taxonomy
                    .rejected
                    .push(format!("concept #{}: empty name", index + 1));
            }
            Err(e) => {
                warn!(index, error = %e, "skipping malformed taxonomy entry");
                taxonomy.rejected.push(format!("concept #{}: {}", index + 1, e));
            }
        }
    }

    Ok(taxonomy)
}
