//! Defines the endpoints for listing, creating and updating users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    user::{
        NewUser, User, UserId, UserPatch,
        core::{create_user, list_users, update_user},
    },
};

/// A route handler that returns every user as JSON.
pub async fn list_users_endpoint(State(state): State<AppState>) -> Result<Json<Vec<User>>, Error> {
    let connection = state.lock_connection()?;

    list_users(&connection).map(Json).inspect_err(|error| {
        tracing::error!("could not list users: {error}");
    })
}

/// A route handler for registering a new user.
///
/// Responds with `201 Created` and the stored user, including its new ID.
pub async fn create_user_endpoint(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Response {
    let connection = match state.lock_connection() {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    match create_user(&new_user, &connection) {
        Ok(user) => {
            tracing::info!("Created user {} with income {}", user.id, user.income);
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(error) => {
            tracing::error!("could not create user: {error}");
            error.into_response()
        }
    }
}

/// A route handler for partially updating a user.
///
/// Responds with `404 Not Found` if `user_id` does not refer to a user.
pub async fn update_user_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, Error> {
    let connection = state.lock_connection()?;

    update_user(UserId::new(user_id), &patch, &connection)
        .map(Json)
        .inspect_err(|error| {
            tracing::error!("could not update user {user_id}: {error}");
        })
}
