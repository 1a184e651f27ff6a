use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use reefmon_service::config::AppConfig;
use reefmon_service::predict::{ChatClient, TabularPredictor};
use reefmon_service::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load_default()?;

    // Artifacts load once, up front; a column mismatch must stop the
    // service here rather than produce silently wrong predictions later.
    let tabular = TabularPredictor::load(
        &config.artifacts.model_path,
        &config.artifacts.scaler_path,
    )?;
    let chat = ChatClient::new(&config.llm)?;

    let state = AppState {
        chat,
        tabular: Arc::new(tabular),
    };
    let app = server::build_router(&config, state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, model = %config.llm.model, "reefmon service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
