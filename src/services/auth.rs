use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::SESSION_COOKIE;
use crate::models::auth::SessionClaims;
use crate::models::user::Account;

const ACCOUNT_COLUMNS: &str = "id, email, phone, first_name, last_name, password_hash, \
     is_admin, is_responsible, is_employee, is_active, country, language, created_at, updated_at";

pub struct AuthService;

impl AuthService {
    /// Validate credentials. Inactive accounts and credential mismatches fail
    /// identically so nothing is leaked about which one it was.
    pub async fn authenticate(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let email = email.trim().to_lowercase();
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1 AND is_active = TRUE"
        ))
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::AuthenticationFailed)?;

        let valid = bcrypt::verify(password, &account.password_hash)
            .map_err(|_| AppError::AuthenticationFailed)?;
        if !valid {
            tracing::warn!(email = %email, "login with invalid password");
            return Err(AppError::AuthenticationFailed);
        }
        Ok(account)
    }

    pub fn hash_password(plain: &str) -> anyhow::Result<String> {
        Ok(bcrypt::hash(plain, 12)?)
    }

    /// Sign a session JWT for the account.
    pub fn sign_session(
        account_id: Uuid,
        secret: &str,
        ttl_seconds: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: account_id.to_string(),
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn decode_session(token: &str, secret: &str) -> anyhow::Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims.sub.parse()?)
    }

    pub fn session_cookie(token: &str, ttl_seconds: u64) -> String {
        format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={ttl_seconds}")
    }

    pub fn clear_session_cookie() -> String {
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_sign_and_decode_roundtrip() {
        let id = Uuid::new_v4();
        let token = AuthService::sign_session(id, "secret", 300).expect("sign");
        let decoded = AuthService::decode_session(&token, "secret").expect("decode");
        assert_eq!(decoded, id);
    }

    #[test]
    fn session_rejects_wrong_secret() {
        let token = AuthService::sign_session(Uuid::new_v4(), "secret", 300).expect("sign");
        assert!(AuthService::decode_session(&token, "other-secret").is_err());
    }

    #[test]
    fn session_rejects_expired_token() {
        // exp far enough in the past to clear the default decode leeway
        let now = Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(AuthService::decode_session(&token, "secret").is_err());
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = bcrypt::hash("hunter2!", 4).unwrap();
        assert!(bcrypt::verify("hunter2!", &hash).unwrap());
        assert!(!bcrypt::verify("wrong", &hash).unwrap());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(AuthService::clear_session_cookie().contains("Max-Age=0"));
    }
}
