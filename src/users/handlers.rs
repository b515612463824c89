use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{
    dto::{NewUser, User},
    services::{create_from, find_index, merge_into},
    validation::validate,
};
use crate::{error::ApiError, state::AppState};

pub const USER_NOT_FOUND: &str = "The user with the given ID was not found.";

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(read_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

fn validated(payload: Result<Json<Value>, JsonRejection>) -> Result<NewUser, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "unreadable request body");
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    validate(&body).map_err(|errors| {
        warn!(%errors, "user payload rejected");
        errors.into()
    })
}

fn not_found(id: &str) -> ApiError {
    warn!(%id, "user not found");
    ApiError::NotFound(USER_NOT_FOUND.into())
}

/// POST /users: responds with the whole collection, new user last.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let new_user = validated(payload)?;

    let mut users = state.users.load_all().await?;
    let user = create_from(new_user);
    let user_id = user.id.clone();
    users.push(user);
    state.users.save_all(&users).await?;

    info!(%user_id, "user created");
    Ok(Json(users))
}

/// GET /users: the collection as decoded into [`User`], not the stored bytes.
///
/// Keys outside the user shape are dropped and timestamps come back as UTC
/// with millisecond precision, whatever offset or precision was stored.
#[instrument(skip(state))]
pub async fn read_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.load_all().await?))
}

/// PUT /users/:id: a miss returns 404 before anything is written.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let new_user = validated(payload)?;

    let mut users = state.users.load_all().await?;
    let Some(index) = find_index(&users, &id) else {
        return Err(not_found(&id));
    };
    let updated = merge_into(&users[index], new_user);
    users[index] = updated.clone();
    state.users.save_all(&users).await?;

    info!(user_id = %updated.id, "user updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let mut users = state.users.load_all().await?;
    let Some(index) = find_index(&users, &id) else {
        return Err(not_found(&id));
    };
    let removed = users.remove(index);
    state.users.save_all(&users).await?;

    info!(user_id = %removed.id, "user deleted");
    Ok(Json(removed))
}
