use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::preference::EmployeeSelection;
use crate::models::user::{Account, CreateAccountForm};
use crate::services::auth::AuthService;

const ACCOUNT_COLUMNS: &str = "id, email, phone, first_name, last_name, password_hash, \
     is_admin, is_responsible, is_employee, is_active, country, language, created_at, updated_at";

#[derive(Debug, Error)]
pub enum CreateAccountError {
    #[error("email already registered")]
    EmailTaken,
    #[error("phone already registered")]
    PhoneTaken,
    #[error("a responsible already exists")]
    ResponsibleExists,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Map a unique violation (SQLSTATE 23505) to the account-creation error its
/// constraint stands for. Anything else is not a user-facing conflict.
pub fn map_unique_violation(
    code: Option<&str>,
    constraint: Option<&str>,
) -> Option<CreateAccountError> {
    if code != Some("23505") {
        return None;
    }
    match constraint? {
        c if c.contains("responsibles_singleton") => Some(CreateAccountError::ResponsibleExists),
        c if c.contains("email") => Some(CreateAccountError::EmailTaken),
        c if c.contains("phone") => Some(CreateAccountError::PhoneTaken),
        _ => None,
    }
}

fn creation_error(e: sqlx::Error) -> CreateAccountError {
    if let sqlx::Error::Database(db) = &e {
        if let Some(mapped) = map_unique_violation(db.code().as_deref(), db.constraint()) {
            return mapped;
        }
    }
    CreateAccountError::Other(e.into())
}

pub struct AccountService;

impl AccountService {
    pub async fn find(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(account)
    }

    pub async fn find_active(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(account)
    }

    /// All accounts, for the admin dashboard.
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY last_name, first_name, email"
        ))
        .fetch_all(pool)
        .await?;
        Ok(accounts)
    }

    /// Whether this account holds the responsible marker.
    pub async fn is_marked_responsible(pool: &PgPool, account_id: Uuid) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM responsibles WHERE account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Create an account with its role-dependent side rows in one transaction:
    /// an employee gets an empty preference row, a responsible gets the
    /// singleton marker. Nothing is persisted on any failure.
    ///
    /// The "one responsible" and "unique email" rules are both backed by
    /// unique indexes; the early checks here only exist to produce the right
    /// user-facing notice without surfacing a database error.
    pub async fn create(
        pool: &PgPool,
        form: &CreateAccountForm,
    ) -> Result<Account, CreateAccountError> {
        let email = form.email.trim().to_lowercase();

        if form.is_responsible {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM responsibles)")
                    .fetch_one(pool)
                    .await
                    .map_err(anyhow::Error::from)?;
            if taken {
                return Err(CreateAccountError::ResponsibleExists);
            }
        }

        let password_hash =
            AuthService::hash_password(&form.password).map_err(CreateAccountError::Other)?;

        let mut tx = pool.begin().await.map_err(anyhow::Error::from)?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts
                 (email, phone, first_name, last_name, password_hash,
                  is_responsible, is_employee, is_active, country, language)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&email)
        .bind(form.phone.as_deref().filter(|p| !p.trim().is_empty()))
        .bind(form.first_name.as_deref().unwrap_or(""))
        .bind(form.last_name.as_deref().unwrap_or(""))
        .bind(&password_hash)
        .bind(form.is_responsible)
        .bind(form.is_employee)
        .bind(form.is_active)
        .bind(form.country.as_deref().unwrap_or("Chile"))
        .bind(form.language.as_deref().unwrap_or("en"))
        .fetch_one(&mut *tx)
        .await
        .map_err(creation_error)?;

        if form.is_responsible {
            sqlx::query("INSERT INTO responsibles (account_id) VALUES ($1)")
                .bind(account.id)
                .execute(&mut *tx)
                .await
                .map_err(creation_error)?;
        }

        if form.is_employee {
            sqlx::query("INSERT INTO preferences (account_id) VALUES ($1)")
                .bind(account.id)
                .execute(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;
        }

        tx.commit().await.map_err(anyhow::Error::from)?;
        tracing::info!(account_id = %account.id, email = %account.email, "account created");
        Ok(account)
    }

    /// Every employee with their current selection, for the responsible
    /// dashboard.
    pub async fn employees_with_selections(
        pool: &PgPool,
    ) -> anyhow::Result<Vec<EmployeeSelection>> {
        let rows = sqlx::query_as::<_, EmployeeSelection>(
            "SELECT a.id AS account_id, a.email, a.first_name, a.last_name,
                    p.preferred_meal_id, p.customizations
             FROM accounts a
             LEFT JOIN preferences p ON p.account_id = a.id
             WHERE a.is_employee = TRUE AND a.is_active = TRUE
             ORDER BY a.last_name, a.first_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_maps_to_email_taken() {
        assert!(matches!(
            map_unique_violation(Some("23505"), Some("accounts_email_key")),
            Some(CreateAccountError::EmailTaken)
        ));
    }

    #[test]
    fn duplicate_phone_maps_to_phone_taken() {
        assert!(matches!(
            map_unique_violation(Some("23505"), Some("accounts_phone_key")),
            Some(CreateAccountError::PhoneTaken)
        ));
    }

    #[test]
    fn second_responsible_maps_to_responsible_exists() {
        assert!(matches!(
            map_unique_violation(Some("23505"), Some("responsibles_singleton")),
            Some(CreateAccountError::ResponsibleExists)
        ));
    }

    #[test]
    fn other_database_errors_are_not_conflicts() {
        // foreign-key violation on the same column name
        assert!(map_unique_violation(Some("23503"), Some("accounts_email_key")).is_none());
        // unique violation on an unrelated index
        assert!(map_unique_violation(Some("23505"), Some("meals_pkey")).is_none());
        assert!(map_unique_violation(Some("23505"), None).is_none());
        assert!(map_unique_violation(None, Some("accounts_email_key")).is_none());
    }
}
