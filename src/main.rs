//! Galleria notification agent.
//!
//! Headless consumer of the realtime notification core: signs in as one
//! user, keeps the channel alive, and surfaces incoming notifications as
//! structured log lines. Useful for monitoring and for exercising the
//! stack end to end against a live server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use galleria_client::ApiClient;
use galleria_core::config::AppConfig;
use galleria_core::types::id::UserId;
use galleria_core::{AppError, AppResult};
use galleria_realtime::{ChannelEvent, EventKind, LogAlerts, NotificationSession};

#[tokio::main]
async fn main() {
    let env = std::env::var("GALLERIA_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Agent error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Galleria notification agent v{}", env!("CARGO_PKG_VERSION"));

    let user_id: UserId = std::env::var("GALLERIA_USER_ID")
        .map_err(|_| AppError::configuration("GALLERIA_USER_ID is not set"))?
        .parse()
        .map_err(|e| AppError::configuration(format!("Invalid GALLERIA_USER_ID: {e}")))?;
    let token = std::env::var("GALLERIA_TOKEN")
        .map_err(|_| AppError::configuration("GALLERIA_TOKEN is not set"))?;

    let api = Arc::new(ApiClient::new(&config.api)?);
    api.set_token(Some(token.clone()));

    let gateway: Arc<dyn galleria_realtime::NotificationGateway> = api.clone();
    let session = NotificationSession::new(config.channel, gateway, Arc::new(LogAlerts));

    session.bus().on(EventKind::Connected, |_| {
        tracing::info!("Channel up");
        Ok(())
    });
    session.bus().on(EventKind::Disconnected, |event| {
        if let ChannelEvent::Disconnected { code, reason } = event {
            tracing::warn!(code, reason = %reason, "Channel down");
        }
        Ok(())
    });
    session.bus().on(EventKind::Error, |event| {
        if let ChannelEvent::ChannelError { detail } = event {
            tracing::error!(detail = %detail, "Channel error");
        }
        Ok(())
    });

    session.sign_in(user_id, &token).await?;
    tracing::info!(
        unread = session.unread_count(),
        total = session.notifications().len(),
        "Initial notification state loaded"
    );

    wait_for_shutdown().await;

    tracing::info!("Shutting down");
    session.sign_out();
    Ok(())
}

/// Block until Ctrl-C or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
