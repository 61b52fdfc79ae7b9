//! CLI command implementations

pub mod config;
pub mod serve;
pub mod token;
pub mod users;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Password;
use roster_core::config::Config;
use roster_core::RosterContext;

/// Get the roster directory from environment or default
pub fn get_roster_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ROSTER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".roster"))
}

/// Load the effective configuration
///
/// When no password is configured and stdin is a terminal, prompt for it.
/// The prompted password lives only in memory for this process.
pub fn load_config() -> Result<Config> {
    let roster_dir = get_roster_dir()?;
    let mut config = Config::load(&roster_dir)
        .with_context(|| format!("Failed to load settings from {:?}", roster_dir))?;

    if config.password.is_none() && atty::is(atty::Stream::Stdin) {
        let prompt = match &config.username {
            Some(username) => format!("Password for {}", username),
            None => "Password".to_string(),
        };
        let password = Password::new().with_prompt(prompt).interact()?;
        config.password = Some(password);
    }

    Ok(config)
}

/// Build a roster context from the effective configuration
pub fn get_context() -> Result<RosterContext> {
    let config = load_config()?;
    RosterContext::new(config).context("Failed to initialize roster context")
}
