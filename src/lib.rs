pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use config::Config;
use services::notifications::ChatNotifier;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub notifier: Arc<ChatNotifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(Config::from_env()?);
        let db = db::create_pool(&config.database_url).await?;
        let notifier = Arc::new(ChatNotifier::new(
            config.slack_bot_token.clone(),
            config.slack_channel_id.clone(),
        ));
        Ok(Self {
            db,
            config,
            notifier,
        })
    }

    /// State for router tests: a lazily connected pool that never dials out
    /// unless a handler actually runs a query.
    pub fn fake() -> Self {
        let config = Arc::new(Config::for_tests());
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let notifier = Arc::new(ChatNotifier::new(None, config.slack_channel_id.clone()));
        Self {
            db,
            config,
            notifier,
        }
    }
}
