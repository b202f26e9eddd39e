use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::menu::{Meal, MenuWithMeals, PlannedMenu};

#[derive(Debug, Error)]
pub enum PlanMenuError {
    #[error("a menu needs at least one meal")]
    NoMeals,
    #[error("unknown meal id")]
    UnknownMeal,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Active-menu policy: the menu planned for `today` (earliest created when
/// several exist), otherwise the first menu ever created. The fallback is
/// deliberate — a missing plan serves the oldest menu rather than nothing —
/// and callers that cannot tolerate stale data handle `None` themselves.
pub fn pick_active(menus: &[PlannedMenu], today: NaiveDate) -> Option<&PlannedMenu> {
    menus
        .iter()
        .filter(|m| m.planned_date == today)
        .min_by_key(|m| m.created_at)
        .or_else(|| menus.iter().min_by_key(|m| m.created_at))
}

/// Text posted to the chat channel; the token is the only identifier shared.
pub fn reminder_message(base_url: &str, token: Uuid) -> String {
    format!("Today's lunch menu is ready! Pick your meal here:\n{base_url}/menu/{token}")
}

/// Positions for meals appended to a menu: submission order, continuing the
/// existing sequence. Ids already on the menu, or repeated within one
/// submission, are skipped and consume no position.
pub fn position_assignments(
    placed: &[Uuid],
    submitted: &[Uuid],
    next_position: i32,
) -> Vec<(Uuid, i32)> {
    let mut seen: HashSet<Uuid> = placed.iter().copied().collect();
    let mut next = next_position;
    let mut assignments = Vec::new();
    for id in submitted {
        if seen.insert(*id) {
            assignments.push((*id, next));
            next += 1;
        }
    }
    assignments
}

pub struct MenuService;

impl MenuService {
    pub async fn add_meal(
        pool: &PgPool,
        main_dish: &str,
        side_dish: &str,
        dessert: &str,
    ) -> anyhow::Result<Meal> {
        let meal = sqlx::query_as::<_, Meal>(
            "INSERT INTO meals (main_dish, side_dish, dessert)
             VALUES ($1, $2, $3)
             RETURNING id, main_dish, side_dish, dessert, created_at",
        )
        .bind(main_dish)
        .bind(side_dish)
        .bind(dessert)
        .fetch_one(pool)
        .await?;
        tracing::info!(meal_id = %meal.id, "meal added to catalog");
        Ok(meal)
    }

    pub async fn list_meals(pool: &PgPool) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(
            "SELECT id, main_dish, side_dish, dessert, created_at
             FROM meals ORDER BY created_at",
        )
        .fetch_all(pool)
        .await?;
        Ok(meals)
    }

    pub async fn meal_exists(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM meals WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// Plan a date's menu, or extend it when one already exists.
    ///
    /// A fresh menu gets a random v4 token; appended meals continue the
    /// position sequence so listing order stays the order of submission.
    /// Every referenced meal must exist; nothing is persisted otherwise.
    pub async fn plan_or_extend(
        pool: &PgPool,
        date: NaiveDate,
        meal_ids: &[Uuid],
    ) -> Result<PlannedMenu, PlanMenuError> {
        if meal_ids.is_empty() {
            return Err(PlanMenuError::NoMeals);
        }

        let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meals WHERE id = ANY($1)")
            .bind(meal_ids)
            .fetch_one(pool)
            .await
            .map_err(anyhow::Error::from)?;
        let distinct: HashSet<_> = meal_ids.iter().collect();
        if known != distinct.len() as i64 {
            return Err(PlanMenuError::UnknownMeal);
        }

        let mut tx = pool.begin().await.map_err(anyhow::Error::from)?;

        let existing = sqlx::query_as::<_, PlannedMenu>(
            "SELECT id, planned_date, token, created_at
             FROM planned_menus WHERE planned_date = $1
             ORDER BY created_at LIMIT 1",
        )
        .bind(date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(anyhow::Error::from)?;

        let menu = match existing {
            Some(menu) => menu,
            None => sqlx::query_as::<_, PlannedMenu>(
                "INSERT INTO planned_menus (planned_date, token)
                 VALUES ($1, $2)
                 RETURNING id, planned_date, token, created_at",
            )
            .bind(date)
            .bind(Uuid::new_v4())
            .fetch_one(&mut *tx)
            .await
            .map_err(anyhow::Error::from)?,
        };

        let placed: Vec<Uuid> =
            sqlx::query_scalar("SELECT meal_id FROM planned_menu_meals WHERE menu_id = $1")
                .bind(menu.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;
        let next_position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM planned_menu_meals WHERE menu_id = $1",
        )
        .bind(menu.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(anyhow::Error::from)?;

        for (meal_id, position) in position_assignments(&placed, meal_ids, next_position) {
            sqlx::query(
                "INSERT INTO planned_menu_meals (menu_id, meal_id, position)
                 VALUES ($1, $2, $3)",
            )
            .bind(menu.id)
            .bind(meal_id)
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(anyhow::Error::from)?;
        }

        tx.commit().await.map_err(anyhow::Error::from)?;
        tracing::info!(menu_id = %menu.id, date = %date, meals = meal_ids.len(), "menu planned");
        Ok(menu)
    }

    /// Public read: menu + meals by share token, meals in submission order.
    pub async fn menu_by_token(
        pool: &PgPool,
        token: Uuid,
    ) -> anyhow::Result<Option<MenuWithMeals>> {
        let menu = sqlx::query_as::<_, PlannedMenu>(
            "SELECT id, planned_date, token, created_at
             FROM planned_menus WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        match menu {
            Some(menu) => {
                let meals = Self::menu_meals(pool, menu.id).await?;
                Ok(Some(MenuWithMeals {
                    planned_date: menu.planned_date,
                    token: menu.token,
                    meals,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn menu_meals(pool: &PgPool, menu_id: Uuid) -> anyhow::Result<Vec<Meal>> {
        let meals = sqlx::query_as::<_, Meal>(
            "SELECT m.id, m.main_dish, m.side_dish, m.dessert, m.created_at
             FROM planned_menu_meals pm
             JOIN meals m ON m.id = pm.meal_id
             WHERE pm.menu_id = $1
             ORDER BY pm.position",
        )
        .bind(menu_id)
        .fetch_all(pool)
        .await?;
        Ok(meals)
    }

    /// Resolve the menu the rest of the system treats as "today's".
    pub async fn resolve_active(
        pool: &PgPool,
        today: NaiveDate,
    ) -> anyhow::Result<Option<PlannedMenu>> {
        let menus = sqlx::query_as::<_, PlannedMenu>(
            "SELECT id, planned_date, token, created_at FROM planned_menus",
        )
        .fetch_all(pool)
        .await?;
        Ok(pick_active(&menus, today).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn menu(date: NaiveDate, created_offset_secs: i64) -> PlannedMenu {
        PlannedMenu {
            id: Uuid::new_v4(),
            planned_date: date,
            token: Uuid::new_v4(),
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn exact_date_match_wins() {
        let today = date(2024, 5, 6);
        let menus = vec![menu(date(2024, 5, 1), 0), menu(today, 10)];
        let picked = pick_active(&menus, today).unwrap();
        assert_eq!(picked.planned_date, today);
    }

    #[test]
    fn no_match_falls_back_to_first_created() {
        let menus = vec![menu(date(2024, 5, 3), 20), menu(date(2024, 5, 1), 0)];
        let picked = pick_active(&menus, date(2024, 5, 6)).unwrap();
        assert_eq!(picked.planned_date, date(2024, 5, 1));
    }

    #[test]
    fn several_menus_for_today_earliest_created_wins() {
        let today = date(2024, 5, 6);
        let first = menu(today, 0);
        let menus = vec![menu(today, 30), first.clone()];
        assert_eq!(pick_active(&menus, today).unwrap().id, first.id);
    }

    #[test]
    fn no_menus_resolves_to_none() {
        assert!(pick_active(&[], date(2024, 5, 6)).is_none());
    }

    #[test]
    fn reminder_message_embeds_share_link() {
        let token = Uuid::new_v4();
        let msg = reminder_message("http://lunch.example.com", token);
        assert!(msg.contains(&format!("http://lunch.example.com/menu/{token}")));
    }

    #[test]
    fn fresh_menu_positions_follow_submission_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            position_assignments(&[], &[b, a, c], 0),
            vec![(b, 0), (a, 1), (c, 2)]
        );
    }

    #[test]
    fn extending_a_menu_continues_the_sequence() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            position_assignments(&[a, b], &[c], 2),
            vec![(c, 2)]
        );
    }

    #[test]
    fn meals_already_on_the_menu_are_skipped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(position_assignments(&[a], &[a, b], 1), vec![(b, 1)]);
    }

    #[test]
    fn repeated_ids_in_one_submission_count_once() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            position_assignments(&[], &[a, a, b], 0),
            vec![(a, 0), (b, 1)]
        );
    }
}
