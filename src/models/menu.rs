use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A reusable catalog meal. Immutable once created; duplicates permitted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub main_dish: String,
    pub side_dish: String,
    pub dessert: String,
    pub created_at: DateTime<Utc>,
}

/// A date's menu. `token` is the only identifier ever exposed in share links.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlannedMenu {
    pub id: Uuid,
    pub planned_date: NaiveDate,
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MenuWithMeals {
    pub planned_date: NaiveDate,
    pub token: Uuid,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Deserialize)]
pub struct AddMealForm {
    pub main_dish: String,
    pub side_dish: String,
    pub dessert: String,
}

/// Plan (or extend) a date's menu. Browser forms post `meal_ids` as a
/// comma-separated list of meal UUIDs.
#[derive(Debug, Deserialize)]
pub struct PlanMenuForm {
    pub planned_date: NaiveDate,
    pub meal_ids: String,
}

impl PlanMenuForm {
    pub fn parsed_meal_ids(&self) -> Result<Vec<Uuid>, uuid::Error> {
        self.meal_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Uuid::parse_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_ids_parse_and_skip_blanks() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let form = PlanMenuForm {
            planned_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            meal_ids: format!(" {a}, {b} ,,"),
        };
        assert_eq!(form.parsed_meal_ids().unwrap(), vec![a, b]);
    }

    #[test]
    fn malformed_meal_id_is_an_error() {
        let form = PlanMenuForm {
            planned_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            meal_ids: "not-a-uuid".into(),
        };
        assert!(form.parsed_meal_ids().is_err());
    }
}
