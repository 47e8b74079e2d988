//! Config command handlers.

use anyhow::{Context, Result};

use turnkeep::config::Config;

use super::ConfigAction;

pub(crate) async fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load().with_context(|| "Failed to load configuration")?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        ConfigAction::Check => {
            let config_path = Config::path();
            println!("Config file: {}", config_path.display());

            if !config_path.exists() {
                println!("[OK] No config file found (using defaults)");
            }

            let config = match Config::load() {
                Ok(c) => c,
                Err(e) => {
                    println!("[ERROR] {}", e);
                    return Ok(());
                }
            };

            let mut problems = 0;
            if let Err(e) = config.validate() {
                println!("[ERROR] {}", e);
                problems += 1;
            }
            if let Err(e) = config.api_key() {
                println!("[WARN] {}", e);
                problems += 1;
            }

            if problems == 0 {
                println!("\nConfiguration looks good!");
            } else {
                println!("\nFound {} problem(s)", problems);
            }
        }
    }
    Ok(())
}
