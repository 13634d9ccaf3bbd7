use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, MessageResponse, RegisterRequest, ResetPasswordRequest,
            ResetRequest,
        },
        jwt::AuthUser,
        service::AuthService,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
}

fn origin(info: Option<ConnectInfo<SocketAddr>>) -> Option<std::net::IpAddr> {
    info.map(|ConnectInfo(addr)| addr.ip())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    AuthService::from_state(&state)
        .register(payload, origin(info))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = AuthService::from_state(&state)
        .login(payload, origin(info))
        .await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    AuthService::from_state(&state)
        .request_password_reset(payload.email, origin(info))
        .await?;
    Ok(Json(MessageResponse::new(
        "If the email exists, a reset link has been sent",
    )))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    AuthService::from_state(&state)
        .reset_password(payload, origin(info))
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// Sessions are stateless; the token stays valid until it expires and the
/// client just drops it.
#[instrument(skip_all)]
pub async fn logout(AuthUser(_user_id): AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}
