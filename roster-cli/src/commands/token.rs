//! Token command - run only the credential exchange

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;

use super::get_context;
use crate::output::{create_table, success};

pub fn run(json: bool, raw: bool) -> Result<()> {
    let ctx = get_context()?;
    let token = ctx.obtain_access_token()?;

    if json {
        let mut value = serde_json::to_value(&token)?;
        value["expires_at"] = serde_json::json!(token.expires_at());
        value["refresh_expires_at"] = serde_json::json!(token.refresh_expires_at());
        if raw {
            value["access_token"] = serde_json::json!(token.secret());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    success("Successfully obtained access token");
    println!();

    let mut table = create_table();
    table.add_row(vec!["Token type".to_string(), token.token_type.clone()]);
    table.add_row(vec![
        "Expires in".to_string(),
        format!("{}s (at {})", token.expires_in, expiry(token.expires_at())),
    ]);
    table.add_row(vec![
        "Refresh expires in".to_string(),
        format!(
            "{}s (at {})",
            token.refresh_expires_in,
            expiry(token.refresh_expires_at())
        ),
    ]);
    println!("{}", table);

    if raw {
        println!();
        println!("{}", "Access token".bold());
        println!("{}", token.secret());
    }

    Ok(())
}

/// RFC 3339 expiry, or "unknown" when the lifetime is out of range
fn expiry(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string())
}
