use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::menu::{Meal, MenuWithMeals};
use crate::models::preference::{CurrentSelection, Preference};
use crate::services::menu::MenuService;

/// The cutoff gate: submissions at or after the cutoff are rejected.
pub fn past_cutoff(now: NaiveTime, cutoff: NaiveTime) -> bool {
    now >= cutoff
}

/// Browser forms post empty strings for untouched fields; treat blank as
/// absent so partial-update semantics hold.
pub fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The stored preferred meal is only reported while it belongs to the active
/// menu. Stale selections from an earlier menu are hidden, never deleted.
pub fn visible_meal(preferred: Option<Uuid>, menu_meals: &[Meal]) -> Option<Uuid> {
    preferred.filter(|id| menu_meals.iter().any(|m| m.id == *id))
}

pub struct PreferenceService;

impl PreferenceService {
    pub async fn find(pool: &PgPool, account_id: Uuid) -> anyhow::Result<Option<Preference>> {
        let pref = sqlx::query_as::<_, Preference>(
            "SELECT id, account_id, preferred_meal_id, customizations, updated_at
             FROM preferences WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
        Ok(pref)
    }

    /// What the employee dashboard shows: the active menu (same fallback
    /// policy as the reminder) and the selection filtered to it.
    pub async fn current_selection(
        pool: &PgPool,
        account_id: Uuid,
        today: NaiveDate,
    ) -> anyhow::Result<CurrentSelection> {
        let pref = Self::find(pool, account_id).await?;

        let menu = match MenuService::resolve_active(pool, today).await? {
            Some(menu) => {
                let meals = MenuService::menu_meals(pool, menu.id).await?;
                Some(MenuWithMeals {
                    planned_date: menu.planned_date,
                    token: menu.token,
                    meals,
                })
            }
            None => None,
        };

        let (preferred_meal_id, customizations) = match (&pref, &menu) {
            (Some(p), Some(m)) => (
                visible_meal(p.preferred_meal_id, &m.meals),
                p.customizations.clone(),
            ),
            _ => (None, None),
        };

        Ok(CurrentSelection {
            menu,
            preferred_meal_id,
            customizations,
        })
    }

    /// Partial update: a NULL bind leaves the stored column untouched.
    pub async fn submit(
        pool: &PgPool,
        account_id: Uuid,
        preferred_meal_id: Option<Uuid>,
        customizations: Option<String>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO preferences (account_id, preferred_meal_id, customizations)
             VALUES ($1, $2, $3)
             ON CONFLICT (account_id) DO UPDATE SET
                 preferred_meal_id = COALESCE(EXCLUDED.preferred_meal_id, preferences.preferred_meal_id),
                 customizations = COALESCE(EXCLUDED.customizations, preferences.customizations),
                 updated_at = NOW()",
        )
        .bind(account_id)
        .bind(preferred_meal_id)
        .bind(customizations)
        .execute(pool)
        .await?;
        tracing::info!(account_id = %account_id, "preference saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn cutoff_is_inclusive_at_eleven() {
        let cutoff = t(11, 0);
        assert!(!past_cutoff(t(10, 59), cutoff));
        assert!(past_cutoff(t(11, 0), cutoff));
        assert!(past_cutoff(t(11, 1), cutoff));
    }

    #[test]
    fn blank_form_fields_are_absent() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("".into())), None);
        assert_eq!(normalize(Some("   ".into())), None);
        assert_eq!(normalize(Some(" no onions ".into())), Some("no onions".into()));
    }

    fn meal(id: Uuid) -> Meal {
        Meal {
            id,
            main_dish: "Chicken".into(),
            side_dish: "Green salad".into(),
            dessert: "Lemon pie".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stale_selection_is_hidden_not_deleted() {
        let in_menu = Uuid::new_v4();
        let stale = Uuid::new_v4();
        let meals = vec![meal(in_menu)];

        assert_eq!(visible_meal(Some(in_menu), &meals), Some(in_menu));
        assert_eq!(visible_meal(Some(stale), &meals), None);
        assert_eq!(visible_meal(None, &meals), None);
    }
}
