use super::report_failure;
use anyhow::Result;
use concept_map::mapping::InitOutcome;
use concept_map::Config;

pub fn execute(config: &Config, project_name: &str, force: bool) -> Result<()> {
    let mapper = config.mapper();

    match mapper.init_project(project_name, force) {
        Ok(InitOutcome::Created) => {
            println!("✅ Initialized concept map for '{}'", project_name);
            println!("   State file: {}", config.state_file.display());
            Ok(())
        }
        Ok(InitOutcome::AlreadyExists) => {
            println!(
                "⚠️  State file '{}' already exists. Use --force to overwrite.",
                config.state_file.display()
            );
            Ok(())
        }
        Err(e) => report_failure(e),
    }
}
