//! Show the effective configuration

use lingocast_core::{error::Result, AppConfig};

/// Handle the config command
pub fn handle(config: &AppConfig) -> Result<()> {
    let masked = config.masked();
    println!("{}", serde_json::to_string_pretty(&masked)?);

    if let Err(e) = config.validate() {
        eprintln!("Warning: {}", e);
    }
    Ok(())
}
