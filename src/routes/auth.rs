use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::user::LoginForm,
    services::auth::AuthService,
    AppState,
};

/// GET / — public landing payload.
pub async fn home() -> Json<Value> {
    Json(json!({
        "app": "lunchbox",
        "message": "Company lunch program. Sign in to continue.",
        "login": "/login",
    }))
}

/// GET /login — form descriptor for the presentation layer.
pub async fn login_page() -> Json<Value> {
    Json(json!({
        "form": "login",
        "fields": ["email", "password"],
    }))
}

/// POST /login — authenticate, set the session cookie and land the account on
/// its role dashboard.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let account = AuthService::authenticate(&state.db, &form.email, &form.password).await?;

    let token = AuthService::sign_session(
        account.id,
        &state.config.jwt_secret,
        state.config.session_ttl_seconds,
    )?;
    tracing::info!(account_id = %account.id, email = %account.email, "signed in");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (
                header::SET_COOKIE,
                AuthService::session_cookie(&token, state.config.session_ttl_seconds),
            ),
            (header::LOCATION, account.dashboard_path()),
        ],
    )
        .into_response())
}

/// GET /logout — clear the session cookie and bounce to login.
pub async fn logout() -> Response {
    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, AuthService::clear_session_cookie()),
            (header::LOCATION, "/login".to_string()),
        ],
    )
        .into_response()
}
