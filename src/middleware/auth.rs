use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{Account, Role};
use crate::services::{accounts::AccountService, auth::AuthService};
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Extract a named cookie value from request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|part| {
            let part = part.trim();
            part.strip_prefix(&prefix).map(|v| v.to_string())
        })
}

/// The authenticated account behind the `session` cookie.
///
/// The account row is re-loaded on every request and must still be active, so
/// deactivation takes effect immediately. Rejection is a redirect to the
/// login page, never a JSON 401 — these are browser flows.
pub struct SessionAccount(pub Account);

impl FromRequestParts<AppState> for SessionAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            cookie_value(&parts.headers, SESSION_COOKIE).ok_or(AppError::RedirectLogin)?;
        let account_id = AuthService::decode_session(&token, &state.config.jwt_secret)
            .map_err(|_| AppError::RedirectLogin)?;
        let account = AccountService::find_active(&state.db, account_id)
            .await?
            .ok_or(AppError::RedirectLogin)?;
        Ok(SessionAccount(account))
    }
}

/// Outcome of the access-control gate.
#[derive(Debug, PartialEq, Eq)]
pub enum Gate {
    Proceed,
    /// Wrong role: bounce to the login entry point (safe default).
    RedirectLogin,
    /// Right role, wrong identity: bounce to the account's own dashboard.
    RedirectDashboard,
    /// Admin route whose path-id target is not admin-flagged.
    Forbidden,
}

/// Gate for self-scoped routes: the account must hold `role` and the path id
/// must be its own. A valid session is not enough — authorization is both
/// role-based and identity-scoped.
pub fn decide_self_scoped(account: &Account, role: Role, path_id: Uuid) -> Gate {
    if !account.has_role(role) {
        return Gate::RedirectLogin;
    }
    if account.id != path_id {
        return Gate::RedirectDashboard;
    }
    Gate::Proceed
}

/// Gate for administrator routes. The path id names a target account; a
/// non-admin target gets an explicit 403 rather than a redirect.
pub fn decide_admin(account: &Account, target: &Account) -> Gate {
    if !account.is_admin {
        return Gate::RedirectLogin;
    }
    if !target.is_admin {
        return Gate::Forbidden;
    }
    Gate::Proceed
}

/// Enforce a self-scoped gate, mapping denials to responses.
pub fn require_self(account: &Account, role: Role, path_id: Uuid) -> Result<(), AppError> {
    match decide_self_scoped(account, role, path_id) {
        Gate::Proceed => Ok(()),
        Gate::RedirectLogin => {
            tracing::warn!(account_id = %account.id, required = %role, "role requirement not met");
            Err(AppError::RedirectLogin)
        }
        Gate::RedirectDashboard => Err(AppError::RedirectDashboard(account.dashboard_path())),
        Gate::Forbidden => Err(AppError::Forbidden),
    }
}

/// Enforce the administrator gate: loads the path-id target (404 when it does
/// not exist) and applies [`decide_admin`].
pub async fn require_admin_target(
    state: &AppState,
    account: &Account,
    path_id: Uuid,
) -> Result<Account, AppError> {
    if !account.is_admin {
        tracing::warn!(email = %account.email, "non-admin hit an admin route");
        return Err(AppError::RedirectLogin);
    }
    let target = AccountService::find(&state.db, path_id)
        .await?
        .ok_or(AppError::NotFound("account"))?;
    match decide_admin(account, &target) {
        Gate::Proceed => Ok(target),
        Gate::Forbidden => {
            tracing::warn!(email = %account.email, target = %path_id, "admin route with non-admin target");
            Err(AppError::Forbidden)
        }
        Gate::RedirectLogin => Err(AppError::RedirectLogin),
        Gate::RedirectDashboard => Err(AppError::RedirectDashboard(account.dashboard_path())),
    }
}
