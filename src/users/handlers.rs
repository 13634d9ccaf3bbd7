use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
    users::store::ProfilePatch,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(update_profile))
}

#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub dietary_goals: Option<String>,
    pub allergies: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

/// Raw JSON values so each field can be validated on its own; a bad age must
/// not take down a valid weight sent in the same request.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub age: Option<serde_json::Value>,
    pub weight: Option<serde_json::Value>,
    pub dietary_goals: Option<serde_json::Value>,
    pub allergies: Option<serde_json::Value>,
}

/// Checks every supplied field independently. Returns the patch of accepted
/// fields plus the names of rejected ones.
pub fn validate_patch(req: &ProfileUpdateRequest) -> (ProfilePatch, Vec<&'static str>) {
    let mut patch = ProfilePatch::default();
    let mut rejected = Vec::new();

    if let Some(age) = &req.age {
        match age.as_i64() {
            Some(v) if (0..=150).contains(&v) => patch.age = Some(v as i32),
            _ => rejected.push("age"),
        }
    }
    if let Some(weight) = &req.weight {
        match weight.as_f64() {
            Some(v) if v > 0.0 => patch.weight = Some(v),
            _ => rejected.push("weight"),
        }
    }
    if let Some(goals) = &req.dietary_goals {
        match goals.as_str() {
            Some(s) if s.chars().count() <= 1000 => patch.dietary_goals = Some(s.to_string()),
            _ => rejected.push("dietary goals"),
        }
    }
    if let Some(allergies) = &req.allergies {
        match allergies.as_str() {
            Some(s) if s.chars().count() <= 1000 => patch.allergies = Some(s.to_string()),
            _ => rejected.push("allergies"),
        }
    }

    (patch, rejected)
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        user: ProfileUser {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
            weight: user.weight,
            dietary_goals: user.dietary_goals,
            allergies: user.allergies,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (patch, rejected) = validate_patch(&payload);

    // Valid fields are applied even when others in the same request fail
    // validation.
    if !patch.is_empty() {
        let found = state
            .users
            .update_profile(user_id, &patch)
            .await
            .map_err(ApiError::Internal)?;
        if !found {
            return Err(ApiError::NotFound("User not found".into()));
        }
    } else if state
        .users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::Internal)?
        .is_none()
    {
        return Err(ApiError::NotFound("User not found".into()));
    }

    if let Some(field) = rejected.first() {
        return Err(ApiError::Validation(format!("Invalid {field}")));
    }
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
