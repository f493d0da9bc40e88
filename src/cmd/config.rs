//! Configuration view and validation commands — `taskboard config`.

use anyhow::Result;
use console::style;

use taskboard::config::{TaskboardConfig, project_config_path};

use super::super::ConfigCommands;

pub fn cmd_config(
    project_dir: &std::path::Path,
    effective: &TaskboardConfig,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let config_path = project_config_path(project_dir);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskboard Configuration");
            println!("=======================");
            println!();

            match TaskboardConfig::locate(project_dir) {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("Config file: (none, using defaults)"),
            }
            println!();

            println!("[api]");
            println!("  base_url = \"{}\"", effective.api.base_url);
            println!(
                "  token = {}",
                if effective.api.token.is_some() {
                    "(set)"
                } else {
                    "(unset)"
                }
            );
            println!("  timeout_secs = {}", effective.api.timeout_secs);
            println!();

            println!("[board]");
            match &effective.board.group_id {
                Some(group) => println!("  group_id = \"{}\"", group),
                None => println!("  group_id = (unset)"),
            }
            if !effective.board.columns.is_empty() {
                println!("  columns = {:?}", effective.board.columns);
            }
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", effective.logging.level);
            println!("  json = {}", effective.logging.json);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = effective.validate();
            if warnings.is_empty() {
                println!("{} Configuration is valid.", style("✓").green());
            } else {
                println!("Configuration warnings:");
                for warning in &warnings {
                    println!("  {} {}", style("!").yellow(), warning);
                }
            }
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!(
                    "Config file already exists: {}",
                    config_path.display()
                );
                return Ok(());
            }
            TaskboardConfig::default().save(&config_path)?;
            println!("Created {}", config_path.display());
        }
    }

    Ok(())
}
