//! Config commands

use formwork_core::FormsConfig;

use crate::ConfigCommands;

pub fn handle(action: ConfigCommands, current: &FormsConfig, profile: Option<&str>) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = FormsConfig::default().save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            // Start from the file, not from flag/env overrides
            let mut config = FormsConfig::load(profile)?;
            config.set(&key, &value)?;
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::List => {
            println!("default_title: {}", current.default_title);
            println!("storage_path: {}", current.storage_path.display());
            println!("export_dir: {}", current.export_dir.display());
            println!("share_base_url: {}", current.share_base_url);
            println!("autosave_interval_secs: {}", current.autosave_interval_secs);
            println!("log_level: {}", current.log_level);
        }
    }
    Ok(())
}
