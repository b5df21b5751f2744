pub mod clock;
pub mod config;
pub mod locator;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod paths;
pub mod snippet;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use mapping::ConceptMapper;
pub use model::{normalize_key, Concept, ConceptStore, Confidence, Implementation, Metadata};
pub use state::{StateError, StateManager};
