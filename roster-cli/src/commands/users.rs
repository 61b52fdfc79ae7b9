//! Users command - list users with their groups

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use roster_core::UserWithGroups;

use super::get_context;
use crate::output::{create_table, or_na, success, warning};

/// Separator printed after each user block
pub const SEPARATOR: &str = "----------------------------------------";

pub fn run(json: bool, table: bool) -> Result<()> {
    let ctx = get_context()?;

    let spinner = (!json && atty::is(atty::Stream::Stderr)).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching users and groups...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = ctx.fetch_users_with_groups();
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let users = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    let [token_line, found_line] = report_header(users.len());
    if !table {
        success(&token_line);
    }
    println!("{}", found_line.bold());
    println!();

    if users.is_empty() {
        warning("No users returned by the directory.");
        return Ok(());
    }

    if table {
        print_table(&users);
    } else {
        for user in &users {
            for line in render_user(user) {
                println!("{}", line);
            }
            println!("{}", SEPARATOR);
        }
    }

    Ok(())
}

/// Lines printed ahead of the per-user blocks
pub fn report_header(user_count: usize) -> [String; 2] {
    [
        "Successfully obtained access token".to_string(),
        format!("Found {} users", user_count),
    ]
}

/// Per-user report block, one entry per output line
pub fn render_user(entry: &UserWithGroups) -> Vec<String> {
    let user = &entry.user;
    let mut lines = vec![
        format!("User ID: {}", user.id),
        format!("Username: {}", user.username),
        format!("First Name: {}", or_na(user.first_name.as_deref())),
        format!("Last Name: {}", or_na(user.last_name.as_deref())),
        format!("Email: {}", or_na(user.email.as_deref())),
        format!("Enabled: {}", user.enabled),
    ];

    if entry.has_groups() {
        lines.push("Groups:".to_string());
        lines.extend(entry.groups.iter().map(|group| {
            format!(
                "  - Group ID: {}, Name: {}, Path: {}",
                group.id, group.name, group.path
            )
        }));
    } else {
        lines.push("Groups: No groups assigned".to_string());
    }

    lines
}

fn print_table(users: &[UserWithGroups]) {
    let mut table = create_table();
    table.set_header(vec!["ID", "Username", "Name", "Email", "Enabled", "Groups"]);

    for entry in users {
        let user = &entry.user;
        let name = match (&user.first_name, &user.last_name) {
            (None, None) => "N/A".to_string(),
            (first, last) => format!(
                "{} {}",
                first.as_deref().unwrap_or(""),
                last.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
        };
        let groups = entry
            .groups
            .iter()
            .map(|g| g.path.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            user.id.clone(),
            user.username.clone(),
            name,
            or_na(user.email.as_deref()).to_string(),
            if user.enabled { "yes".to_string() } else { "no".to_string() },
            groups,
        ]);
    }

    println!("{}", table);
}
