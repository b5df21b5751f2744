//! Source locator - find the line span of a named declaration
//!
//! Parses one file with tree-sitter and walks the tree depth-first, returning
//! the first class-like or function-like declaration whose name matches.
//!
//! "First" means earliest in pre-order traversal. When the same name is
//! declared in nested scopes the outer (earlier visited) one wins. That is a
//! best-effort heuristic, not a scoping-correct resolution.
//!
//! # Example
//!
//! ```no_run
//! use concept_map::locator;
//! use std::path::Path;
//!
//! match locator::locate(Path::new("src/app.py"), "MyClass")? {
//!     Some(span) => println!("lines {}-{}", span.start, span.end),
//!     None => println!("not declared here"),
//! }
//! # Ok::<(), concept_map::locator::LocateError>(())
//! ```

mod languages;

pub use languages::SourceLanguage;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Parser, TreeCursor};

/// Inclusive, 1-indexed line span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },
}

/// Locate `identifier` in the file at `path`.
///
/// `Ok(None)` when the file parses but declares no such entity.
pub fn locate(path: &Path, identifier: &str) -> Result<Option<Span>, LocateError> {
    let source = fs::read_to_string(path).map_err(|source| LocateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    locate_in_source(path, &source, SourceLanguage::from_path(path), identifier)
}

/// Locate `identifier` in already-loaded source text.
///
/// `path` is only used for error reporting.
pub fn locate_in_source(
    path: &Path,
    source: &str,
    language: SourceLanguage,
    identifier: &str,
) -> Result<Option<Span>, LocateError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| LocateError::Grammar {
            language: language.name(),
            message: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| LocateError::Parse {
        path: path.to_path_buf(),
        line: 1,
        message: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, message) = first_syntax_problem(root)
            .map(describe_problem)
            .unwrap_or((1, "invalid syntax".to_string()));
        return Err(LocateError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        });
    }

    let mut cursor = tree.walk();
    let found = find_declaration(&mut cursor, source.as_bytes(), language, identifier);

    let span = found.map(node_span);
    debug!(
        path = %path.display(),
        language = language.name(),
        identifier,
        ?span,
        "declaration lookup finished"
    );
    Ok(span)
}

/// Pre-order walk; the first matching declaration wins
fn find_declaration<'tree>(
    cursor: &mut TreeCursor<'tree>,
    source: &[u8],
    language: SourceLanguage,
    identifier: &str,
) -> Option<Node<'tree>> {
    let node = cursor.node();

    if language.is_declaration(node.kind()) && declared_name(node, source) == Some(identifier) {
        return Some(node);
    }

    let mut found = None;
    if cursor.goto_first_child() {
        loop {
            found = find_declaration(cursor, source, language, identifier);
            if found.is_some() || !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
    found
}

fn declared_name<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name("name")
        .and_then(|name| name.utf8_text(source).ok())
}

fn node_span(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();

    // A node ending at column 0 stops just after the previous line's newline
    let end_line = if end.column == 0 && end.row > start.row {
        end.row
    } else {
        end.row + 1
    };

    Span {
        start: start.row + 1,
        end: end_line,
    }
}

fn first_syntax_problem(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_syntax_problem)
}

fn describe_problem(node: Node<'_>) -> (usize, String) {
    let line = node.start_position().row + 1;
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        "invalid syntax".to_string()
    };
    (line, message)
}
