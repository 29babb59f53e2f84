//! Server binary: reads settings from the environment, picks the backend, and serves the API.

use seminar_breakfast::{
    app, ensure_database_exists, ensure_kv_tables, AppState, KvBackend, MemoryBackend, PostgresBackend, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("seminar_breakfast=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let backend: Arc<dyn KvBackend> = match &settings.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.db_max_connections)
                .connect(url)
                .await?;
            ensure_kv_tables(&pool, &settings.schema).await?;
            tracing::info!(schema = %settings.schema, "using postgres store");
            Arc::new(PostgresBackend::new(pool, &settings.schema))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; records are kept in memory only");
            Arc::new(MemoryBackend::new())
        }
    };

    let state = AppState::new(backend, settings.seed_data)?;
    let router = app(state, settings.max_body_bytes);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
