use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::{require_self, SessionAccount},
    models::preference::{CurrentSelection, SelectionForm},
    models::user::Role,
    services::{
        menu::MenuService,
        preferences::{normalize, past_cutoff, PreferenceService},
    },
    AppState,
};

/// GET /dashboard/employee/{id} — the active menu and the employee's own
/// selection, filtered to that menu.
pub async fn dashboard(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Json<CurrentSelection>, AppError> {
    require_self(&account, Role::Employee, target_id)?;
    let today = Utc::now()
        .with_timezone(&state.config.operational_tz)
        .date_naive();
    let selection = PreferenceService::current_selection(&state.db, account.id, today).await?;
    Ok(Json(selection))
}

/// POST /dashboard/employee/{id} — submit a selection before the cutoff.
///
/// Blank or absent fields leave the stored values untouched; at or after the
/// cutoff nothing is written and the employee is bounced back with a notice.
pub async fn submit(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
    Form(form): Form<SelectionForm>,
) -> Result<Response, AppError> {
    require_self(&account, Role::Employee, target_id)?;
    let back = format!("/dashboard/employee/{target_id}");

    let now_local = Utc::now()
        .with_timezone(&state.config.operational_tz)
        .time();
    if past_cutoff(now_local, state.config.cutoff_time) {
        tracing::info!(account_id = %account.id, "selection rejected: past cutoff");
        return Err(AppError::CutoffRejected { back });
    }

    let preferred_meal_id = match normalize(form.preferred_meal) {
        Some(raw) => {
            let id: Uuid = raw.parse().map_err(|_| AppError::NotFound("meal"))?;
            if !MenuService::meal_exists(&state.db, id).await? {
                return Err(AppError::NotFound("meal"));
            }
            Some(id)
        }
        None => None,
    };
    let customizations = normalize(form.customizations);

    PreferenceService::submit(&state.db, account.id, preferred_meal_id, customizations).await?;

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, format!("{back}?notice=saved"))],
    )
        .into_response())
}
