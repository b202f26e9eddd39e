//! Seed (or repair) the administrator account.
//!
//! The account-creation form never grants the administrator flag, so the
//! first admin has to come from here.
//!
//! Usage:
//!   DATABASE_URL=... ADMIN_EMAIL=admin@example.com ADMIN_PASSWORD=... ./seed-admin

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::env;

use lunchbox_api::services::auth::AuthService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let email = env::var("ADMIN_EMAIL")
        .context("ADMIN_EMAIL required")?
        .trim()
        .to_lowercase();
    let password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD required")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let password_hash = AuthService::hash_password(&password)?;
    sqlx::query(
        "INSERT INTO accounts (email, password_hash, first_name, last_name, is_admin, is_active)
         VALUES ($1, $2, 'Admin', '', TRUE, TRUE)
         ON CONFLICT (email) DO UPDATE SET
             password_hash = EXCLUDED.password_hash,
             is_admin = TRUE,
             is_active = TRUE,
             updated_at = NOW()",
    )
    .bind(&email)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    println!("Admin account ready: {email}");
    Ok(())
}
