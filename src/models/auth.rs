use serde::{Deserialize, Serialize};

/// Claims embedded in the session JWT. Deliberately minimal: the account (and
/// its role flags) is re-loaded from the database on every request so that
/// deactivation and role changes take effect immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // account UUID
    pub exp: usize,
    pub iat: usize,
}
