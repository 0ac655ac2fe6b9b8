//! Settings command implementation

use std::path::Path;

use anyhow::Result;
use ledgerlens_core::config::default_config_path;
use ledgerlens_core::prompts::default_prompts_dir;
use ledgerlens_core::Settings;

/// Print where settings came from and their effective values
pub fn cmd_config(settings: &Settings, explicit: Option<&Path>) -> Result<()> {
    let source = match explicit {
        Some(path) => path.display().to_string(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path.display().to_string(),
            None => "(built-in defaults)".to_string(),
        },
    };

    println!("# Source: {}", source);
    println!(
        "# Override file: {}",
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!(
        "# Prompt overrides: {}",
        default_prompts_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!();
    print!("{}", settings.to_toml()?);

    Ok(())
}
