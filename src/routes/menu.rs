use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::{require_self, SessionAccount},
    models::menu::{AddMealForm, MenuWithMeals, PlanMenuForm},
    models::user::Role,
    services::menu::{MenuService, PlanMenuError},
    AppState,
};

/// GET /add_menu/{id} — the catalog to plan from.
pub async fn add_menu_page(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_self(&account, Role::Responsible, target_id)?;
    let meals = MenuService::list_meals(&state.db).await?;
    Ok(Json(json!({ "form": "add_menu", "meals": meals })))
}

/// POST /add_menu/{id} — plan a date's menu (or extend an already planned
/// date), then land on the public share page.
pub async fn add_menu(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
    Form(form): Form<PlanMenuForm>,
) -> Result<Response, AppError> {
    require_self(&account, Role::Responsible, target_id)?;
    let back = format!("/add_menu/{target_id}");

    let meal_ids = form
        .parsed_meal_ids()
        .map_err(|_| AppError::NotFound("meal"))?;

    let menu = MenuService::plan_or_extend(&state.db, form.planned_date, &meal_ids)
        .await
        .map_err(|e| match e {
            PlanMenuError::NoMeals => AppError::Conflict {
                back: back.clone(),
                notice: "no_meals",
            },
            PlanMenuError::UnknownMeal => AppError::NotFound("meal"),
            PlanMenuError::Other(e) => AppError::Internal(e),
        })?;

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, format!("/menu/{}", menu.token))],
    )
        .into_response())
}

/// POST /add_meal/{id} — add a catalog meal. Duplicates are allowed; blank
/// fields are not.
pub async fn add_meal(
    State(state): State<AppState>,
    SessionAccount(account): SessionAccount,
    Path(target_id): Path<Uuid>,
    Form(form): Form<AddMealForm>,
) -> Result<Response, AppError> {
    require_self(&account, Role::Responsible, target_id)?;
    let back = format!("/add_menu/{target_id}");

    let (main_dish, side_dish, dessert) = (
        form.main_dish.trim(),
        form.side_dish.trim(),
        form.dessert.trim(),
    );
    if main_dish.is_empty() || side_dish.is_empty() || dessert.is_empty() {
        return Err(AppError::Conflict {
            back,
            notice: "missing_fields",
        });
    }

    MenuService::add_meal(&state.db, main_dish, side_dish, dessert).await?;

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, format!("{back}?notice=meal_created"))],
    )
        .into_response())
}

/// GET /menu/{token} — public menu view by share token. The token is the only
/// identifier ever exposed; unknown or malformed tokens are a plain 404.
pub async fn menu_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MenuWithMeals>, AppError> {
    let token: Uuid = token.parse().map_err(|_| AppError::NotFound("menu"))?;
    let menu = MenuService::menu_by_token(&state.db, token)
        .await?
        .ok_or(AppError::NotFound("menu"))?;
    Ok(Json(menu))
}
