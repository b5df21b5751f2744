//! Domain types for the concept map
//!
//! These types are persistence-agnostic - they don't know about backups or
//! temp files. The state module handles reading and writing them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema version written into every freshly initialized store
pub const SCHEMA_VERSION: &str = "1.1";

/// Canonical lookup key for a concept display name.
///
/// Lower-cases, trims surrounding whitespace, and joins words with `_`
/// (spaces and hyphens both become underscores).
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Store-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub project: String,
    pub version: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Set by the state manager on every successful save
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// How sure the mapper is that a piece of code realizes the concept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(format!(
                "unknown confidence '{}' (expected high, medium or low)",
                other
            )),
        }
    }
}

/// One piece of evidence that a concept appears in code.
///
/// Never edited after creation; new evidence is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub file_path: String,
    pub identifier: Option<String>,
    /// 1-indexed, inclusive
    pub line_start: usize,
    /// 1-indexed, inclusive
    pub line_end: usize,
    pub code_snippet: String,
    pub confidence: Confidence,
    pub pattern_type: String,
    pub evidence: String,
    pub added_at: String,
}

/// A named programming idea and the evidence collected for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub display_name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Discovery order
    #[serde(default)]
    pub implementations: Vec<Implementation>,
}

impl Concept {
    pub fn new(display_name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            definition: definition.into(),
            keywords: Vec::new(),
            languages: Vec::new(),
            category: None,
            implementations: Vec::new(),
        }
    }

    /// True when evidence already exists at this file and start line
    pub fn has_implementation_at(&self, file_path: &str, line_start: usize) -> bool {
        self.implementations
            .iter()
            .any(|imp| imp.file_path == file_path && imp.line_start == line_start)
    }
}

/// The whole concept map: the unit of persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptStore {
    pub metadata: Metadata,
    /// Keyed by [`normalize_key`] of the display name
    pub concepts: BTreeMap<String, Concept>,
}

impl ConceptStore {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            concepts: BTreeMap::new(),
        }
    }

    /// Look up a concept by any spelling of its name
    pub fn get(&self, name: &str) -> Option<&Concept> {
        self.concepts.get(&normalize_key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Concept> {
        self.concepts.get_mut(&normalize_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.concepts.contains_key(&normalize_key(name))
    }

    /// Insert a concept under its normalized key unless one already exists.
    ///
    /// Returns false (and leaves the existing concept untouched) on a clash.
    pub fn insert_if_absent(&mut self, concept: Concept) -> bool {
        let key = normalize_key(&concept.display_name);
        if self.concepts.contains_key(&key) {
            return false;
        }
        self.concepts.insert(key, concept);
        true
    }

    /// Concepts in display order (sorted by display name)
    pub fn sorted_by_display_name(&self) -> Vec<(&str, &Concept)> {
        let mut entries: Vec<(&str, &Concept)> = self
            .concepts
            .iter()
            .map(|(key, concept)| (key.as_str(), concept))
            .collect();
        entries.sort_by(|a, b| a.1.display_name.cmp(&b.1.display_name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata {
            project: "test".to_string(),
            version: "1.0".to_string(),
            created_at: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_normalize_key_variants() {
        assert_eq!(normalize_key("Context Managers"), "context_managers");
        assert_eq!(normalize_key("context-managers"), "context_managers");
        assert_eq!(normalize_key(" Context_Managers "), "context_managers");
    }

    #[test]
    fn test_normalize_key_keeps_inner_runs() {
        // Each separator maps to one underscore; runs are not collapsed
        assert_eq!(normalize_key("a - b"), "a___b");
        assert_eq!(normalize_key("Decorators"), "decorators");
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let mut store = ConceptStore::new(metadata());
        assert!(store.insert_if_absent(Concept::new("Decorators", "original")));
        assert!(!store.insert_if_absent(Concept::new("decorators", "replacement")));

        assert_eq!(store.concepts.len(), 1);
        assert_eq!(store.get("DECORATORS").unwrap().definition, "original");
    }

    #[test]
    fn test_sorted_by_display_name() {
        let mut store = ConceptStore::new(metadata());
        store.insert_if_absent(Concept::new("Promises", ""));
        store.insert_if_absent(Concept::new("Closures", ""));
        store.insert_if_absent(Concept::new("Generators", ""));

        let names: Vec<&str> = store
            .sorted_by_display_name()
            .into_iter()
            .map(|(_, c)| c.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Closures", "Generators", "Promises"]);
    }

    #[test]
    fn test_confidence_serialization() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        assert_eq!("LOW".parse::<Confidence>().unwrap(), Confidence::Low);
        assert!("certain".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_concept_optional_fields_default() {
        let concept: Concept =
            serde_json::from_str(r#"{"display_name": "Decorators", "implementations": []}"#)
                .unwrap();
        assert!(concept.keywords.is_empty());
        assert!(concept.languages.is_empty());
        assert!(concept.category.is_none());
        assert_eq!(concept.definition, "");
    }

    #[test]
    fn test_empty_optional_fields_not_serialized() {
        let json = serde_json::to_string(&Concept::new("Decorators", "wraps")).unwrap();
        assert!(!json.contains("keywords"));
        assert!(!json.contains("category"));
        assert!(json.contains("\"implementations\":[]"));
    }
}
