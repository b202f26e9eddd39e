use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunchbox_api::{app::build_app, app::serve, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::init().await?;
    db::run_migrations(&state.db).await?;
    tracing::info!("Database connected and migrations applied");

    let host = state.config.host.clone();
    let port = state.config.port;
    serve(build_app(state), &host, port).await
}
