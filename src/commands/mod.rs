pub mod add;
pub mod init;
pub mod load_concepts;
pub mod status;

use anyhow::Result;
use concept_map::mapping::MappingError;

/// Print a recoverable failure and carry on; fatal state errors propagate
/// so `main` can exit non-zero.
pub fn report_failure(err: MappingError) -> Result<()> {
    if err.is_fatal() {
        return Err(err.into());
    }

    eprintln!("❌ {}", err);
    if let MappingError::LinesUnresolved {
        detail: Some(detail),
    } = &err
    {
        eprintln!("   {}", detail);
    }
    Ok(())
}
