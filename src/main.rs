//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível, `info` por padrão
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração ou o banco falharem, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let admin = config.admin.clone();

    let app_state = AppState::new(config).await?;

    if let Some(admin) = admin {
        app_state
            .user_service
            .ensure_admin(&admin.username, &admin.password)
            .await?;
    }

    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
