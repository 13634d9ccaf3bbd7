use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod memory;
pub mod store;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
