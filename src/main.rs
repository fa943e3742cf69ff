use std::sync::Arc;

use anyhow::Result;

use vetclinic_api::api::{app, AppState};
use vetclinic_api::config::config;
use vetclinic_api::database::manager::DatabaseManager;
use vetclinic_api::database::store::PgClinicStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vetclinic_api=info,tower_http=info".into()),
        )
        .init();

    let cfg = config();
    tracing::info!(environment = ?cfg.environment, "starting vetclinic-api");

    let pool = DatabaseManager::pool().await?;
    let state = AppState::new(Arc::new(PgClinicStore::new(pool)));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
