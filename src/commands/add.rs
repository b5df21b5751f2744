use super::report_failure;
use anyhow::Result;
use concept_map::mapping::{AddOutcome, LineSource, MappingRequest};
use concept_map::Config;

pub fn execute(config: &Config, request: MappingRequest) -> Result<()> {
    let mapper = config.mapper();
    let concept = request.concept.clone();
    let file_path = request.file_path.clone();

    if let Some(identifier) = &request.identifier {
        println!("🔍 Scanning {} for identifier '{}'...", file_path, identifier);
    }

    match mapper.add_mapping(request) {
        Ok(AddOutcome::Added { span, source }) => {
            match source {
                LineSource::Identifier => {
                    println!("   ✓ Found at lines {}-{}", span.start, span.end);
                }
                LineSource::Manual { fallback_reason } => {
                    if let Some(reason) = fallback_reason {
                        println!("   ⚠️  {}. Falling back to --lines.", reason);
                    }
                    println!("   Using manual line range: {}-{}", span.start, span.end);
                }
            }
            println!(
                "✅ Mapped '{}' → {} ({}-{})",
                concept, file_path, span.start, span.end
            );
            Ok(())
        }
        Ok(AddOutcome::Duplicate {
            file_path,
            line_start,
        }) => {
            println!(
                "⚠️  Duplicate detected at {}:{}. Skipping.",
                file_path, line_start
            );
            Ok(())
        }
        Err(e) => report_failure(e),
    }
}
