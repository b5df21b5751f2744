use super::report_failure;
use anyhow::Result;
use concept_map::Config;
use std::path::Path;

pub fn execute(config: &Config, concepts_file: &Path) -> Result<()> {
    let mapper = config.mapper();

    let outcome = match mapper.load_concepts_from_file(concepts_file) {
        Ok(outcome) => outcome,
        Err(e) => return report_failure(e),
    };

    for reason in &outcome.rejected {
        eprintln!("⚠️  Skipping {}", reason);
    }
    for name in &outcome.added {
        println!("   + {}", name);
    }

    println!(
        "✅ Loaded {} new concepts from {}",
        outcome.added.len(),
        concepts_file.display()
    );
    if !outcome.skipped.is_empty() {
        println!("   Skipped {} duplicates", outcome.skipped.len());
    }
    if !outcome.rejected.is_empty() {
        println!("   Rejected {} invalid entries", outcome.rejected.len());
    }
    Ok(())
}
