use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per employee, created empty when the account is provisioned and
/// mutated (never deleted) by the employee until the daily cutoff.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Preference {
    pub id: Uuid,
    pub account_id: Uuid,
    pub preferred_meal_id: Option<Uuid>,
    pub customizations: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Employee selection form. Absent or blank fields leave the stored value
/// untouched (partial update, not overwrite).
#[derive(Debug, Default, Deserialize)]
pub struct SelectionForm {
    pub preferred_meal: Option<String>,
    pub customizations: Option<String>,
}

/// What the employee dashboard shows: the resolved menu plus the employee's
/// selection filtered to that menu.
#[derive(Debug, Serialize)]
pub struct CurrentSelection {
    pub menu: Option<crate::models::menu::MenuWithMeals>,
    pub preferred_meal_id: Option<Uuid>,
    pub customizations: Option<String>,
}

/// Row for the responsible dashboard: every employee with their selection.
#[derive(Debug, Serialize, FromRow)]
pub struct EmployeeSelection {
    pub account_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_meal_id: Option<Uuid>,
    pub customizations: Option<String>,
}
