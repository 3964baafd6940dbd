use std::net::SocketAddr;
use std::sync::Arc;

use psychoeval_backend::{
    config::{get_config, init_config},
    routes,
    services::ai_grading::HttpProjectiveGrader,
    store::{memory::MemoryStore, seed::seed_demo_catalog},
    AppState,
};
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    init_config()?;
    let config = get_config();

    let store = Arc::new(MemoryStore::new());
    if config.seed_demo_data {
        let profile_id = seed_demo_catalog(store.as_ref())?;
        info!(%profile_id, "seeded demo catalog");
    }

    let http_client = Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    let grader = Arc::new(HttpProjectiveGrader::from_config(config, http_client));

    let app_state = AppState::new(store, grader);
    let app = routes::router(app_state, config.public_rps)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
