//! State module - crash-safe persistence of the concept map
//!
//! One JSON document holds the whole [`ConceptStore`](crate::model::ConceptStore).
//! Every save backs up the previous file, writes a temp sibling, fsyncs it,
//! and renames it into place. A reader sees either the old or the new
//! document, never a partial one.
//!
//! Corruption is never repaired. [`StateManager::load`] reports it as a fatal
//! [`StateError`] and the caller is expected to stop so an operator can
//! recover from `.mapper_backups/`.
//!
//! # Example
//!
//! ```no_run
//! use concept_map::state::StateManager;
//!
//! let manager = StateManager::new(".concept-map/concepts_map.json");
//! let mut store = match manager.load()? {
//!     Some(store) => store,
//!     None => manager.initialize("my-project"),
//! };
//! if !manager.save(&mut store) {
//!     eprintln!("save failed; previous state kept");
//! }
//! # Ok::<(), concept_map::state::StateError>(())
//! ```
//!
//! Concurrent writers are not coordinated: the last save wins.

mod internal;

pub use internal::{StateError, StateManager, DEFAULT_MAX_BACKUPS};
