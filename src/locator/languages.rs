//! Languages the locator can parse, picked by file extension

use std::path::Path;
use tree_sitter::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Python,
    Rust,
    JavaScript,
    Go,
}

impl SourceLanguage {
    /// Detect from the file extension; anything unrecognised is treated as Python
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("rs") => SourceLanguage::Rust,
            Some("js" | "jsx" | "mjs" | "cjs") => SourceLanguage::JavaScript,
            Some("go") => SourceLanguage::Go,
            _ => SourceLanguage::Python,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::Python => "python",
            SourceLanguage::Rust => "rust",
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::Go => "go",
        }
    }

    pub fn grammar(&self) -> Language {
        match self {
            SourceLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            SourceLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Node kinds that declare a named class-like or function-like entity.
    ///
    /// Async variants share the plain kind in every supported grammar
    /// (`async def` is a `function_definition` with an `async` token).
    pub fn declaration_kinds(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::Python => &["class_definition", "function_definition"],
            SourceLanguage::Rust => &["function_item", "struct_item", "enum_item", "trait_item"],
            SourceLanguage::JavaScript => &[
                "class_declaration",
                "function_declaration",
                "generator_function_declaration",
                "method_definition",
            ],
            SourceLanguage::Go => &["function_declaration", "method_declaration", "type_spec"],
        }
    }

    pub fn is_declaration(&self, kind: &str) -> bool {
        self.declaration_kinds().contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(SourceLanguage::from_path(Path::new("a/b.py")), SourceLanguage::Python);
        assert_eq!(SourceLanguage::from_path(Path::new("lib.rs")), SourceLanguage::Rust);
        assert_eq!(SourceLanguage::from_path(Path::new("app.JSX")), SourceLanguage::JavaScript);
        assert_eq!(SourceLanguage::from_path(Path::new("main.go")), SourceLanguage::Go);
        assert_eq!(SourceLanguage::from_path(Path::new("script")), SourceLanguage::Python);
    }

    #[test]
    fn test_declaration_kinds() {
        assert!(SourceLanguage::Python.is_declaration("class_definition"));
        assert!(!SourceLanguage::Python.is_declaration("decorated_definition"));
        assert!(SourceLanguage::Rust.is_declaration("trait_item"));
    }
}
