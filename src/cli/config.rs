//! Configuration command

use clap::Subcommand;
use pro_workflow_core::{config::CONFIG_FILE, error::Result, ProjectContext, WorkflowConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print where the configuration file is looked up
    Path,

    /// Validate the configuration file without running any hook
    Check,
}

/// Handle configuration command
pub async fn handle(action: ConfigAction, config: WorkflowConfig, project: ProjectContext) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", project.root.join(CONFIG_FILE).display());
        }
        ConfigAction::Check => {
            let path = project.root.join(CONFIG_FILE);
            if path.exists() {
                WorkflowConfig::from_file(&path)?;
                println!("{} is valid", path.display());
            } else {
                println!("No config at {}, defaults apply", path.display());
            }
        }
    }
    Ok(())
}
