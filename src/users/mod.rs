mod dto;
pub mod handlers;
pub mod repo;
mod services;
mod validation;

use crate::state::AppState;
use axum::Router;

pub use dto::User;
pub use repo::{StoreUserRepository, UserRepository};

pub fn router() -> Router<AppState> {
    handlers::users_routes()
}
