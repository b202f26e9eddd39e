use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role an operation requires. Accounts carry independent capability flags —
/// an account may legitimately be both responsible and employee — so this is
/// a requirement tag, not an exclusive account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Responsible,
    Employee,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Administrator => "administrator",
            Role::Responsible => "responsible",
            Role::Employee => "employee",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_responsible: bool,
    pub is_employee: bool,
    pub is_active: bool,
    pub country: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Administrator => self.is_admin,
            Role::Responsible => self.is_responsible,
            Role::Employee => self.is_employee,
        }
    }

    /// Where a freshly authenticated account lands; also the safe default for
    /// authorization denials. Priority mirrors the login redirect order.
    pub fn dashboard_path(&self) -> String {
        if self.is_admin {
            format!("/dashboard/admin/{}", self.id)
        } else if self.is_responsible {
            format!("/dashboard/responsible/{}", self.id)
        } else {
            format!("/dashboard/employee/{}", self.id)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Account-creation form submitted by an administrator. The admin flag is
/// deliberately absent: admin accounts are seeded, never created here.
#[derive(Debug, Deserialize)]
pub struct CreateAccountForm {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_responsible: bool,
    #[serde(default)]
    pub is_employee: bool,
}

/// Row for the admin dashboard listing.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub is_admin: bool,
    pub is_responsible: bool,
    pub is_employee: bool,
    pub is_active: bool,
}

impl From<Account> for AccountSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            first_name: a.first_name,
            last_name: a.last_name,
            country: a.country,
            is_admin: a.is_admin,
            is_responsible: a.is_responsible,
            is_employee: a.is_employee,
            is_active: a.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(admin: bool, responsible: bool, employee: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "a@b.cl".into(),
            phone: None,
            first_name: "A".into(),
            last_name: "B".into(),
            password_hash: String::new(),
            is_admin: admin,
            is_responsible: responsible,
            is_employee: employee,
            is_active: true,
            country: "Chile".into(),
            language: "en".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn dashboard_priority_is_admin_then_responsible_then_employee() {
        let a = account(true, true, true);
        assert!(a.dashboard_path().starts_with("/dashboard/admin/"));

        let r = account(false, true, true);
        assert!(r.dashboard_path().starts_with("/dashboard/responsible/"));

        let e = account(false, false, true);
        assert!(e.dashboard_path().starts_with("/dashboard/employee/"));
    }

    #[test]
    fn role_flags_are_independent() {
        let both = account(false, true, true);
        assert!(both.has_role(Role::Responsible));
        assert!(both.has_role(Role::Employee));
        assert!(!both.has_role(Role::Administrator));
    }
}
