use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::repo::{Meal, MealFilter};

pub fn meal_routes() -> Router<AppState> {
    Router::new().route("/meals", get(list_meals))
}

#[derive(Debug, Deserialize)]
pub struct MealQuery {
    pub preferences: Option<String>,
    pub calories: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MealItem {
    pub id: i64,
    pub name: String,
    pub calories: i32,
    pub nutrients: serde_json::Value,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<MealItem>,
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<MealQuery>,
) -> ApiResult<Json<MealListResponse>> {
    let filter = MealFilter::new(q.preferences.as_deref(), q.calories);
    let meals = Meal::list_filtered(&state.db, &filter)
        .await
        .map_err(ApiError::Internal)?;

    let meals = meals
        .into_iter()
        .map(|m| MealItem {
            id: m.id,
            name: m.name,
            calories: m.calories,
            nutrients: m.nutrients.unwrap_or_else(|| serde_json::json!({})),
            category: m.category,
            description: m.description,
        })
        .collect();

    Ok(Json(MealListResponse { meals }))
}
