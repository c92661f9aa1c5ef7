//! xaiboard web server
//!
//! Run with: cargo run -p xaiboard-web
//!
//! Log filter: `XAIBOARD_LOG`, then `RUST_LOG`, then `info`.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xaiboard_common::DashboardConfig;
use xaiboard_ranker::ScoringPolicy;
use xaiboard_session::{bootstrap, ExperimentSource, HttpExperimentSource, Session};

const LOG_ENV: &str = "XAIBOARD_LOG";

fn init_tracing() -> anyhow::Result<()> {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing()?;

    info!("Starting xaiboard web server...");

    let config = DashboardConfig::load()?;
    let policy = ScoringPolicy::from_config(&config.scoring)?;
    let source: Arc<dyn ExperimentSource> = Arc::new(HttpExperimentSource::from_config(&config.backend));
    info!(backend = %config.backend.base_url, "Explanation backend configured");

    let session = Arc::new(Session::new(Arc::clone(&source), policy, config.backend.request_timeout()));
    let state = xaiboard_web::state::AppState::new(session, bootstrap::global());

    // Bootstrap runs once, in the background; the shell is served meanwhile.
    {
        let state = state.clone();
        let timeout = config.backend.bootstrap_timeout();
        tokio::spawn(async move {
            state.run_bootstrap(source.as_ref(), timeout).await;
        });
    }

    let app = xaiboard_web::router::build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
