use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    audit::{record_best_effort, AuditAction},
    auth::password::{hash_password_blocking, MIN_PASSWORD_LEN},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest, UserResponse},
        repo_types::{NewUser, UserChanges},
        validate,
    },
};

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".into())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let name = validate::name(validate::required(payload.name, "name")?)?;
    let email = validate::email(&validate::required(payload.email, "email")?)?;
    let password = validate::required(payload.password, "password")?;

    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    // Ensure email is not taken; the unique constraint still catches races
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password_blocking(password)
        .await
        .map_err(ApiError::internal)?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    record_best_effort(state.audit.as_ref(), AuditAction::Registration).await;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(UserResponse::from(user)),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get(user_id).await?.ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(payload) = payload?;

    let changes = UserChanges {
        name: validate::optional(payload.name)
            .map(validate::name)
            .transpose()?,
        email: validate::optional(payload.email)
            .map(|e| validate::email(&e))
            .transpose()?,
    };
    if changes.is_empty() {
        debug!(user_id, "edit without changes");
    }

    let user = state
        .users
        .update(user_id, changes)
        .await?
        .ok_or_else(not_found)?;

    record_best_effort(state.audit.as_ref(), AuditAction::EditUser).await;

    info!(user_id, "user edited");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !state.users.delete(user_id).await? {
        return Err(not_found());
    }

    record_best_effort(state.audit.as_ref(), AuditAction::DeleteUser).await;

    info!(user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
