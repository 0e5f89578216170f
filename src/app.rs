/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config -> authorization runtime -> Router
 * - Middleware (request id, trace, limits, timeout)
 * - axum::serve() with graceful shutdown; SIGHUP swaps in a reloaded runtime
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::authz::{PermissionProbe, SudoTestProbe};
use crate::services::factory;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,scitokens_authz=debug,tower_http=debug cargo run
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

        // Development: crash the whole process so it gets noticed.
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

    tracing::info!(
        "starting authorizer in {:?} mode on {} (config {})",
        config.app_env,
        config.addr,
        config.config_path.display()
    );

    let probe: Arc<dyn PermissionProbe> = Arc::new(SudoTestProbe::new());
    // Configuration must be complete before the listener accepts anything.
    let runtime = factory::build_runtime(&config, probe.clone()).await?;
    let state = AppState::new(runtime);

    #[cfg(unix)]
    spawn_reload_on_hangup(state.clone(), config.clone(), probe);

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("authorizer stopped");
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes().with_state(state);
    middleware::http::apply(router, config.request_timeout)
}

#[cfg(unix)]
fn spawn_reload_on_hangup(state: AppState, config: Config, probe: Arc<dyn PermissionProbe>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGHUP; reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received; reloading configuration");
            reload(&state, &config, probe.clone()).await;
        }
    });
}

/// Rebuild the runtime from `config` and swap it in. On failure the
/// snapshot already being served stays in place.
pub async fn reload(state: &AppState, config: &Config, probe: Arc<dyn PermissionProbe>) {
    match factory::build_runtime(config, probe).await {
        Ok(runtime) => {
            state.replace(runtime);
            tracing::info!("configuration reloaded");
        }
        Err(err) => {
            tracing::error!(error = %err, "reload failed; keeping previous configuration");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
