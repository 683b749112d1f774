use crate::state::AppState;
use axum::Router;

pub mod dates;
pub mod dto;
pub mod handlers;
pub mod policy;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::reservation_routes())
        .merge(handlers::admin_routes())
}
