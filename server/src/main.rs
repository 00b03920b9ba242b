//! Master table CRUD server: reads settings from the environment, connects to
//! PostgreSQL with retries, builds the registry and serves the router.

use master_crud::{app, builtin_config, connect_with_retry, load_from_path, AppState, PgStore, Registry, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("master_crud=info,master_crud_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let registry_config = match &settings.registry_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading registry file");
            load_from_path(path).await?
        }
        None => builtin_config(),
    };
    let registry = Registry::from_config(&registry_config)?;
    let mut keys: Vec<_> = registry.keys().collect();
    keys.sort_unstable();
    tracing::info!(entities = ?keys, "registry ready");

    let pool = connect_with_retry(&settings).await?;
    let state = AppState::new(Arc::new(PgStore::new(pool)), registry);

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
