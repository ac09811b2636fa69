/*
 * Responsibility
 * - Tracing / panic hook setup
 * - Config -> AppState (profile, signing key, stores, user directory)
 * - Router assembly + middleware, axum::serve()
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, HttpLimits};
use crate::middleware;
use crate::services::directory::UserDirectory;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,oidc_actions=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    info!(
        "starting OP {} in {:?} mode on {}",
        config.issuer, config.app_env, config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let signing = config.signing()?;
    let directory = match &config.user_directory {
        Some(path) => UserDirectory::from_json_file(path)
            .with_context(|| format!("failed to load user directory {}", path.display()))?,
        None => UserDirectory::new(),
    };

    Ok(AppState::new(config.profile(), signing, directory))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .merge(api::v1::well_known_routes())
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    middleware::http::apply(router, limits)
}
