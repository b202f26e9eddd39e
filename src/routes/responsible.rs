use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::{require_self, SessionAccount},
    models::preference::EmployeeSelection,
    models::user::Role,
    services::{
        accounts::AccountService,
        menu::{reminder_message, MenuService},
    },
    AppState,
};

/// The responsible marker must exist for the session account; the role flag
/// alone is not enough (mirrors the marker being a separate entity).
async fn require_marker(state: &AppState, account_id: Uuid) -> Result<(), AppError> {
    if !AccountService::is_marked_responsible(&state.db, account_id).await? {
        return Err(AppError::NotFound("responsible"));
    }
    Ok(())
}

/// GET /dashboard/responsible/{id} — all employees with their selections.
pub async fn dashboard(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Vec<EmployeeSelection>>, AppError> {
    require_self(&account, Role::Responsible, target_id)?;
    require_marker(&state, account.id).await?;
    let employees = AccountService::employees_with_selections(&state.db).await?;
    Ok(Json(employees))
}

/// POST /send_reminder/{id} — post today's menu link to the chat channel.
///
/// Delivery failure is reported in the redirect notice, never as an error:
/// the responsible always lands back on their dashboard.
pub async fn send_reminder(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_self(&account, Role::Responsible, target_id)?;
    require_marker(&state, account.id).await?;

    let today = Utc::now()
        .with_timezone(&state.config.operational_tz)
        .date_naive();
    let menu = MenuService::resolve_active(&state.db, today)
        .await?
        .ok_or(AppError::NotFound("menu"))?;

    let message = reminder_message(&state.config.app_base_url, menu.token);
    let notice = match state.notifier.post_message(&message).await {
        Ok(()) => "reminder_sent",
        Err(e) => {
            tracing::error!(error = %e, "reminder delivery failed");
            "reminder_failed"
        }
    };

    Ok((
        StatusCode::SEE_OTHER,
        [(
            header::LOCATION,
            format!("/dashboard/responsible/{target_id}?notice={notice}"),
        )],
    )
        .into_response())
}
