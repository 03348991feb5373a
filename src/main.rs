use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use food_review_reply::{
    config::Settings,
    dataset::Dataset,
    inference::ModelConnector,
    review::ReviewService,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    // -----------------------------
    // Shared state / Dependencies
    // -----------------------------
    let dataset = Arc::new(Dataset::load(&settings.reviews_csv));
    let connector =
        Arc::new(ModelConnector::initialize(|key| std::env::var(key).ok(), &settings.model).await);

    let status = match connector.active_model_id() {
        Some(model) => format!("✓ API configured ({model})"),
        None => "⚠ API not configured".to_string(),
    };
    info!("{status}");

    let state = AppState {
        reviews: Arc::new(ReviewService::new(connector, dataset)),
    };
    let app = web::router(state);

    let addr = settings.bind_addr;
    info!("🌐 HTTP listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
