use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::ConfigCommands;
use parley_config::{ConfigOverrides, ParleyConfig};

/// Execute config subcommand
pub async fn execute(
    cmd: ConfigCommands,
    config_file: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => init(path.or(config_file), force),
        ConfigCommands::Show { format } => {
            let config = ParleyConfig::load(config_file, overrides)?;
            println!("{}", show(&config, &format)?);
            Ok(())
        }
    }
}

/// Initialize a new config file
fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => ParleyConfig::default_config_path()
            .context("Could not determine config file path")?,
    };

    if config_path.exists() && !force {
        println!(
            "{} Config file already exists at: {}",
            "Error:".red().bold(),
            config_path.display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    ParleyConfig::write_example(&config_path)?;

    println!(
        "{} Created config file at: {}",
        "Success:".green().bold(),
        config_path.display()
    );
    println!(
        "{}",
        "Default values will be used until you customize the config.".dimmed()
    );
    Ok(())
}

/// Render the effective configuration in `format`.
fn show(config: &ParleyConfig, format: &str) -> Result<String> {
    let rendered = match format {
        "json" => config.display_as_json()?,
        _ => config.display_as_toml()?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parley").join("config.toml");

        init(Some(path.clone()), false).unwrap();
        let config = ParleyConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        init(Some(path.clone()), false).unwrap();
        assert_eq!(ParleyConfig::from_file(&path).unwrap().server.port, 9000);

        init(Some(path.clone()), true).unwrap();
        assert_eq!(ParleyConfig::from_file(&path).unwrap().server.port, 3000);
    }

    #[test]
    fn test_show_formats() {
        let config = ParleyConfig::default();
        assert!(show(&config, "toml").unwrap().contains("[client]"));
        assert!(show(&config, "json").unwrap().starts_with('{'));
    }
}
