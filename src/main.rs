use std::net::SocketAddr;

use soil_ai_rust::analyzer::SoilAnalyzer;
use soil_ai_rust::api;
use soil_ai_rust::config::Config;
use soil_ai_rust::error::Result;
use soil_ai_rust::gemini::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let client = GeminiClient::new(&config)?;
    let analyzer = SoilAnalyzer::new(client);
    let state = api::AppState::new(analyzer, &config);
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Soil AI Analysis API running on port {}", config.port);
    tracing::info!("📊 Health check: http://localhost:{}/api/health", config.port);
    tracing::info!("🔍 Analysis endpoint: http://localhost:{}/api/analyze", config.port);
    if config.api_key.is_none() {
        tracing::warn!("🔑 GOOGLE_GEMINI_API_KEY is not set; analysis requests will fail");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
