use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy at the HTTP boundary.
///
/// Browser-form flows mean most authorization failures are expressed as
/// redirects rather than 4xx bodies: the presentation layer picks the notice
/// out of the query string. Only the admin-target special case serves an
/// explicit 403, and unknown ids/tokens serve 404.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid credentials or inactive account")]
    AuthenticationFailed,

    #[error("authentication required")]
    RedirectLogin,

    #[error("not allowed for this account")]
    RedirectDashboard(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {notice}")]
    Conflict { back: String, notice: &'static str },

    #[error("past the daily cutoff")]
    CutoffRejected { back: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

/// 302 with a Location header. Gate denials use 302 (not 303) so a denied GET
/// lands on the right page without re-method semantics.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationFailed => found("/login?error=invalid_credentials"),
            AppError::RedirectLogin => found("/login"),
            AppError::RedirectDashboard(path) => found(&path),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Forbidden" })),
            )
                .into_response(),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            AppError::Conflict { back, notice } => {
                found(&format!("{back}?error={notice}"))
            }
            AppError::CutoffRejected { back } => {
                found(&format!("{back}?notice=cutoff_passed"))
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(res: &Response) -> String {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn authentication_failure_redirects_to_login() {
        let res = AppError::AuthenticationFailed.into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert!(location(&res).starts_with("/login"));
    }

    #[test]
    fn gate_denials_redirect_never_serve() {
        let res = AppError::RedirectLogin.into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");

        let res = AppError::RedirectDashboard("/dashboard/employee/abc".into()).into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/dashboard/employee/abc");
    }

    #[test]
    fn admin_target_mismatch_is_explicit_forbidden() {
        let res = AppError::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unknown_token_is_not_found() {
        let res = AppError::NotFound("menu").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cutoff_rejection_redirects_back_with_notice() {
        let res = AppError::CutoffRejected {
            back: "/dashboard/employee/abc".into(),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/dashboard/employee/abc?notice=cutoff_passed");
    }

    #[test]
    fn conflict_redirects_back_with_error() {
        let res = AppError::Conflict {
            back: "/add_user/abc".into(),
            notice: "email_taken",
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/add_user/abc?error=email_taken");
    }
}
