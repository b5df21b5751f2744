use super::report_failure;
use anyhow::Result;
use colored::Colorize;
use concept_map::Config;

pub fn execute(config: &Config, json: bool) -> Result<()> {
    let mapper = config.mapper();

    let report = match mapper.status() {
        Ok(report) => report,
        Err(e) => return report_failure(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n📊 Project: {}", report.project.bold());
    println!(
        "   Last Updated: {}",
        report.last_updated.as_deref().unwrap_or("never")
    );
    println!("{}", "─".repeat(40));

    if report.concepts.is_empty() {
        println!("   No concepts defined yet. Use 'load-concepts' to add some.");
    } else {
        for concept in &report.concepts {
            let count = format!("[{}]", concept.implementations);
            let count = if concept.implementations == 0 {
                count.dimmed()
            } else {
                count.green()
            };
            println!("   • {:<20} {}", concept.display_name, count);
        }
    }
    println!("{}", "─".repeat(40));
    Ok(())
}
