//! Serve command - HTTP trigger for the users report
//!
//! `GET /users` runs the full token -> users -> groups flow on every request
//! and logs the report. The directory client is blocking, so each run happens
//! on the blocking pool with a freshly built context.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use roster_core::config::Config;
use roster_core::RosterContext;
use tracing::{error, info};

use super::load_config;
use super::users::{render_user, SEPARATOR};

/// Body returned when the report ran successfully
pub const ACKNOWLEDGEMENT: &str = "Check console for user information";

pub fn run(bind: Option<String>) -> Result<()> {
    let config = load_config()?;
    // Fail at startup rather than on the first request
    config.credentials()?;
    config.users_url()?;

    let bind = bind.unwrap_or_else(|| config.bind.clone());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(config, bind))
}

async fn serve(config: Config, bind: String) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}/users", listener.local_addr()?);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")
}

pub fn router(config: Config) -> Router {
    Router::new()
        .route("/users", get(get_users))
        .with_state(Arc::new(config))
}

async fn get_users(State(config): State<Arc<Config>>) -> (StatusCode, String) {
    let config = Config::clone(&config);
    let outcome = tokio::task::spawn_blocking(move || {
        RosterContext::new(config)?.fetch_users_with_groups()
    })
    .await;

    match outcome {
        Ok(Ok(users)) => {
            info!("Found {} users", users.len());
            for user in &users {
                for line in render_user(user) {
                    info!("{}", line);
                }
                info!("{}", SEPARATOR);
            }
            (StatusCode::OK, ACKNOWLEDGEMENT.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "users report failed");
            (StatusCode::BAD_GATEWAY, format!("Failed to fetch users: {}", e))
        }
        Err(e) => {
            error!(error = %e, "users report task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch users: internal error".to_string(),
            )
        }
    }
}
