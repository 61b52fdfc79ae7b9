//! Config command - inspect and edit settings.json

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use roster_core::config::Config;

use super::get_roster_dir;
use crate::output::{create_table, success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file plus environment)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a value in settings.json
    Set {
        /// Setting key (authUrl, usersUrl, clientId, username, password, realm, requestTimeoutSecs, bind)
        key: String,
        /// New value
        value: String,
    },
    /// Print the settings file location
    Path,
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let roster_dir = get_roster_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&roster_dir)?;
            let rows = describe(&config);

            if json {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
                return Ok(());
            }

            println!("{}", "Roster Configuration".bold());
            println!();
            let mut table = create_table();
            for (key, value) in rows {
                table.add_row(vec![key.to_string(), value]);
            }
            println!("{}", table);
        }
        ConfigCommands::Set { key, value } => {
            std::fs::create_dir_all(&roster_dir)
                .with_context(|| format!("Failed to create roster directory: {:?}", roster_dir))?;

            let mut config = Config::load(&roster_dir)?;
            config.set(&key, &value)?;
            config.save(&roster_dir)?;
            success(&format!("Set {}", key));
        }
        ConfigCommands::Path => {
            println!("{}", roster_dir.join("settings.json").display());
        }
    }

    Ok(())
}

/// Key/value pairs for display, with the password masked
fn describe(config: &Config) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    vec![
        ("authUrl", text(&config.auth_url)),
        ("usersUrl", text(&config.users_url)),
        ("clientId", text(&config.client_id)),
        ("username", text(&config.username)),
        (
            "password",
            match &config.password {
                Some(_) => "********".to_string(),
                None => "(not set)".to_string(),
            },
        ),
        ("realm", text(&config.realm)),
        ("requestTimeoutSecs", config.request_timeout_secs.to_string()),
        ("bind", config.bind.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_masks_password() {
        let mut config = Config::default();
        config.set("password", "hunter2").unwrap();
        config.set("realm", "master").unwrap();

        let rows = describe(&config);
        let lookup = |key: &str| rows.iter().find(|(k, _)| *k == key).unwrap().1.clone();

        assert_eq!(lookup("password"), "********");
        assert_eq!(lookup("realm"), "master");
        assert_eq!(lookup("authUrl"), "(not set)");
    }
}
