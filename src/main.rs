// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;

use bearer_gate::{
    api::{policy_table, router},
    auth::CredentialDirectory,
    config::GatewayConfig,
    state::AppState,
    telemetry,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = GatewayConfig::from_env();
    telemetry::init(config.as_ref().map(|c| c.log_format).unwrap_or_default());
    let config = config?;

    let directory = match config.credentials.as_deref() {
        Some(entries) => CredentialDirectory::parse(entries)?,
        None => {
            warn!("GATE_CREDENTIALS not set, loading demo credential directory");
            CredentialDirectory::demo()?
        }
    };
    info!(logins = directory.len(), "credential directory loaded");

    let state = AppState::new(&config.security, directory, policy_table())?;
    info!(codec = ?state.codec, "token codec ready");
    let app = router(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Bearer Gate listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
    shutdown.cancel();
}
