mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use secnews_digest::DigestPipeline;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = secnews_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        cron = %config.cron,
        fetch_mode = %config.fetch_mode,
        max_items = config.max_items,
        "starting secnews server"
    );

    let pipeline = Arc::new(DigestPipeline::from_config(&config)?);
    let mut scheduler = scheduler::build_scheduler(Arc::clone(&pipeline), &config.cron).await?;

    let auth = AuthState::from_config(
        &config.trigger_tokens,
        matches!(config.env, secnews_core::Environment::Development),
    )?;
    let app = build_app(AppState { pipeline }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
