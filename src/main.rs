use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sctracker_server::{
    config::Config,
    db,
    handlers::{self, AppState},
    services::AuthService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sctracker_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = db::init_db_pool(&config.database_url, config.max_pool_size)
        .await
        .context("failed to initialise database")?;

    let state = AppState::new(pool, AuthService::new(&config));
    let app = handlers::router(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
