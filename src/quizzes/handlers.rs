use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::repo::Quiz;

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_quizzes))
        .route("/quizzes/:id/questions", get(get_quiz_questions))
}

#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Serialize)]
pub struct QuizQuestionsResponse {
    pub questions: serde_json::Value,
}

#[instrument(skip(state))]
pub async fn list_quizzes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> ApiResult<Json<QuizListResponse>> {
    let quizzes = Quiz::list(&state.db).await.map_err(ApiError::Internal)?;
    let quizzes = quizzes
        .into_iter()
        .map(|q| QuizSummary {
            id: q.id,
            title: q.title,
            description: q.description,
        })
        .collect();
    Ok(Json(QuizListResponse { quizzes }))
}

#[instrument(skip(state))]
pub async fn get_quiz_questions(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<QuizQuestionsResponse>> {
    let quiz = Quiz::find(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".into()))?;

    Ok(Json(QuizQuestionsResponse {
        questions: quiz.questions,
    }))
}
