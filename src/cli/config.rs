//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "routing.window_size")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => print!("{}", render_config(&config)),

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => return Err(unknown_key(key)),
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Validation(
                "Must specify a key to set a value".to_string(),
            ))
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {} (available: {})",
        key,
        Config::available_keys().join(", ")
    ))
}

/// Render all configuration values in TOML layout
fn render_config(config: &Config) -> String {
    let mut out = String::new();

    out.push_str("[geocoding]\n");
    out.push_str(&format!("base_url = \"{}\"\n", config.geocoding.base_url));
    out.push_str(&format!("user_agent = \"{}\"\n", config.geocoding.user_agent));
    out.push_str(&format!("zoom = {}\n\n", config.geocoding.zoom));

    out.push_str("[routing]\n");
    out.push_str(&format!("base_url = \"{}\"\n", config.routing.base_url));
    out.push_str(&format!("profile = \"{}\"\n", config.routing.profile));
    out.push_str(&format!("window_size = {}\n\n", config.routing.window_size));

    out.push_str("[device]\n");
    out.push_str(&format!("ip_api_url = \"{}\"\n", config.device.ip_api_url));
    out.push_str(&format!("cache_file = \"{}\"\n\n", config.device.cache_file));

    out.push_str("[ranking]\n");
    out.push_str(&format!("placeholder = \"{}\"\n", config.ranking.placeholder));
    out.push_str(&format!("format = \"{}\"\n", config.ranking.format));

    out
}
