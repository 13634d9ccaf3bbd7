use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod reset;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
