use job_board::{
    build_router, db, mail::SmtpMailer, AppConfig, AppState, LogMailer, Mailer, MemoryStore,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "job_board=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board server");

    let config = AppConfig::from_env()?;
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    let mailer: Arc<dyn Mailer + Send + Sync> = match config.email_host.as_deref() {
        Some(host) => Arc::new(SmtpMailer::new(host, &config)?),
        None => {
            warn!("EMAIL_HOST not set, invite emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // Easy to switch between implementations:
    let app_state = match config.database_url.clone() {
        Some(url) => {
            let pool = db::connect(&url, &config).await?;
            AppState::mysql(config, pool, mailer)
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            AppState::in_memory(config, Arc::new(MemoryStore::with_sample_catalog()), mailer)
        }
    };

    let port = app_state.config.port;
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
