use tracing::info;

use tunescope::config::Config;
use tunescope::routes::{router, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunescope=info".into()),
        )
        .init();

    let config = Config::from_env();
    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState::new(config);
    let app = router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
