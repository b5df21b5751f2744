//! Diagnostic logging bootstrap
//!
//! User-facing reports are printed directly by the commands. This is the
//! debug channel: off by default apart from warnings, enabled with
//! `CONCEPT_MAP_LOG=debug` (any `EnvFilter` directive works).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive
pub const LOG_ENV_VAR: &str = "CONCEPT_MAP_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the stderr subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A second call (tests, embedding) finds a subscriber already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::debug!("still fine");
    }
}
