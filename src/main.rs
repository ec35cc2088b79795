//! ping-board binary entrypoint wiring the poller, HTTP API, and display gateway.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod display;
mod dto;
mod error;
mod provider;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod testing;

use config::AppConfig;
use provider::{StatusClient, fetcher::Fetcher};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let fetcher = Fetcher::new().context("building HTTP client")?;
    let client = StatusClient::new(
        fetcher,
        &config.provider_api_url,
        &config.provider_page_url,
        &config.provider_game,
    );

    let app_state = AppState::initialise(config, Arc::new(client)).await;
    install_display(&app_state).await;

    // First draw of the display; the poller keeps it fresh afterwards.
    if let Err(err) = services::sync_service::reconcile(&app_state, None).await {
        warn!(error = %err, "initial display reconciliation failed");
    }
    tokio::spawn(services::poller::run(app_state.clone()));

    let port = app_state.config().port;
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the Discord display gateway when credentials are configured.
#[cfg(feature = "discord-display")]
async fn install_display(state: &SharedState) {
    use display::discord::{DiscordConfig, DiscordDisplay};
    use tracing::error;

    let display = &state.config().display;
    match (display.bot_token.clone(), display.channel_id.clone()) {
        (Some(bot_token), Some(channel_id)) => {
            match DiscordDisplay::new(DiscordConfig {
                bot_token,
                channel_id,
            }) {
                Ok(gateway) => {
                    state.install_display(Arc::new(gateway)).await;
                    info!("Discord display gateway installed");
                }
                Err(err) => {
                    error!(error = %err, "failed to build Discord display gateway; running degraded")
                }
            }
        }
        _ => warn!(
            "DISCORD_BOT_TOKEN / DISCORD_CHANNEL_ID not set; display updates disabled (degraded mode)"
        ),
    }
}

/// Without a display backend compiled in the service always runs degraded.
#[cfg(not(feature = "discord-display"))]
async fn install_display(_state: &SharedState) {
    warn!("built without a display backend; display updates disabled (degraded mode)");
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
