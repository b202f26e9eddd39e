use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::{require_admin_target, SessionAccount},
    models::user::{AccountSummary, CreateAccountForm},
    services::accounts::{AccountService, CreateAccountError},
    AppState,
};

/// GET /dashboard/admin/{id} — every account in the system.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    require_admin_target(&state, &account, target_id).await?;
    let accounts = AccountService::list(&state.db).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// GET /add_user/{id} — form descriptor with the allowed choice sets.
pub async fn add_user_page(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_admin_target(&state, &account, target_id).await?;
    Ok(Json(json!({
        "form": "add_user",
        "countries": ["Chile", "Brazil", "Canada", "Peru", "Mexico", "US"],
        "languages": ["en", "fr"],
        "roles": ["is_responsible", "is_employee"],
    })))
}

/// POST /add_user/{id} — create an account with its role side effects.
///
/// Accounts from the home country additionally get a channel invite; that
/// call is best effort and can only ever produce a log line.
pub async fn add_user(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
    Form(form): Form<CreateAccountForm>,
) -> Result<Response, AppError> {
    require_admin_target(&state, &account, target_id).await?;
    let back = format!("/add_user/{target_id}");

    if form.email.trim().is_empty() || !form.email.contains('@') || form.password.is_empty() {
        return Err(AppError::Conflict {
            back,
            notice: "invalid_form",
        });
    }

    let created = AccountService::create(&state.db, &form)
        .await
        .map_err(|e| match e {
            CreateAccountError::EmailTaken => AppError::Conflict {
                back: back.clone(),
                notice: "email_taken",
            },
            CreateAccountError::PhoneTaken => AppError::Conflict {
                back: back.clone(),
                notice: "phone_taken",
            },
            CreateAccountError::ResponsibleExists => AppError::Conflict {
                back: back.clone(),
                notice: "responsible_exists",
            },
            CreateAccountError::Other(e) => AppError::Internal(e),
        })?;

    if created.country == state.config.home_country {
        if let Err(e) = state.notifier.invite_by_email(&created.email).await {
            tracing::warn!(error = %e, email = %created.email, "channel invite failed");
        }
    }

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, format!("{back}?notice=user_created"))],
    )
        .into_response())
}
