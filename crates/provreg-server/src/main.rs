//! PROVREG server — application entry point.

use provreg_db::DbManager;
use provreg_server::config::ServerConfig;
use provreg_server::state::AppState;
use provreg_server::api;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("provreg=info".parse()?),
        )
        .json()
        .init();

    let config = ServerConfig::from_env();
    let manager = DbManager::connect(&config.db).await?;
    provreg_db::run_migrations(manager.client()).await?;

    let state = AppState::new(manager.client().clone(), config.auth_token.clone());
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "PROVREG server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
